//! Quiz grading and attempt gating.
//!
//! A submission is graded against the quiz's full question set: every
//! question contributes its point weight to the total whether or not it was
//! answered, and only a submitted answer whose stored `is_correct` flag is
//! set earns its question's points. Membership of every submitted pair in
//! the quiz is validated here so a stray identifier rejects the whole
//! submission before anything is persisted.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use uuid::Uuid;

use crate::round2;

/// Pass threshold for the legacy checklist quiz-completion path.
///
/// Distinct from a quiz's own configurable `passing_score`; the two scoring
/// policies are deliberately kept as separate named operations.
pub const LEGACY_PASSING_SCORE: f64 = 70.0;

/// Number of non-passing attempts after which further submissions are
/// rejected.
pub const MAX_FAILED_ATTEMPTS: i64 = 3;

/// A quiz question as the grader sees it: identity and point weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizQuestion {
    /// Question identifier.
    pub id: Uuid,
    /// Positive point weight.
    pub points: f64,
}

/// One row of the quiz's answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerKey {
    /// Answer identifier.
    pub id: Uuid,
    /// Question this answer belongs to.
    pub question_id: Uuid,
    /// Whether selecting this answer earns the question's points.
    pub is_correct: bool,
}

/// One (question, chosen answer) pair from the learner's submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedAnswer {
    /// Question being answered.
    pub question_id: Uuid,
    /// Answer the learner selected.
    pub answer_id: Uuid,
}

/// Graded verdict for one submitted pair, ready to be denormalized onto the
/// stored answer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerVerdict {
    /// Question that was answered.
    pub question_id: Uuid,
    /// Answer that was selected.
    pub answer_id: Uuid,
    /// Whether the selected answer was the correct one.
    pub is_correct: bool,
}

/// Result of grading a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    /// Points earned by correct answers.
    pub earned_points: f64,
    /// Sum of point weights over all of the quiz's questions.
    pub total_points: f64,
    /// `100 * earned / total`, two decimals, 0 when the quiz has no points.
    pub score: f64,
    /// Whether `score` met the quiz's passing score.
    pub is_passed: bool,
    /// Per-pair verdicts in submission order.
    pub verdicts: Vec<AnswerVerdict>,
}

/// Rejection reasons for a malformed submission.
///
/// Any of these rejects the whole submission; there is no partial grading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GradeError {
    /// A submitted question id does not belong to the quiz.
    #[error("question {0} does not belong to this quiz")]
    UnknownQuestion(Uuid),
    /// A submitted answer id does not belong to the question it was paired
    /// with.
    #[error("answer {answer_id} does not belong to question {question_id}")]
    ForeignAnswer {
        /// Question the pair named.
        question_id: Uuid,
        /// Answer the pair named.
        answer_id: Uuid,
    },
    /// The same question was answered more than once.
    #[error("question {0} was answered more than once")]
    DuplicateAnswer(Uuid),
}

/// Grade a submission against the quiz's questions and answer key.
///
/// Questions omitted from the submission still count toward the total, so
/// an incomplete submission simply forfeits their points. `passing_score`
/// is the quiz's configured threshold in percent.
pub fn grade_submission(
    questions: &[QuizQuestion],
    answer_key: &[AnswerKey],
    submission: &[SubmittedAnswer],
    passing_score: f64,
) -> Result<GradeOutcome, GradeError> {
    let points_by_question: HashMap<Uuid, f64> =
        questions.iter().map(|q| (q.id, q.points)).collect();
    let key_by_answer: HashMap<Uuid, &AnswerKey> =
        answer_key.iter().map(|a| (a.id, a)).collect();

    let mut answered: HashSet<Uuid> = HashSet::with_capacity(submission.len());
    let mut verdicts = Vec::with_capacity(submission.len());
    let mut earned_points = 0.0;

    for pair in submission {
        let points = *points_by_question
            .get(&pair.question_id)
            .ok_or(GradeError::UnknownQuestion(pair.question_id))?;
        let key = key_by_answer
            .get(&pair.answer_id)
            .filter(|a| a.question_id == pair.question_id)
            .ok_or(GradeError::ForeignAnswer {
                question_id: pair.question_id,
                answer_id: pair.answer_id,
            })?;
        if !answered.insert(pair.question_id) {
            return Err(GradeError::DuplicateAnswer(pair.question_id));
        }

        if key.is_correct {
            earned_points += points;
        }
        verdicts.push(AnswerVerdict {
            question_id: pair.question_id,
            answer_id: pair.answer_id,
            is_correct: key.is_correct,
        });
    }

    let total_points: f64 = questions.iter().map(|q| q.points).sum();
    let score = if total_points > 0.0 {
        round2(100.0 * earned_points / total_points)
    } else {
        0.0
    };

    Ok(GradeOutcome {
        earned_points,
        total_points,
        score,
        is_passed: score >= passing_score,
        verdicts,
    })
}

/// Whether a new attempt may be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptGate {
    /// No prior pass and attempts remain.
    Allowed,
    /// A prior attempt already passed; takes priority over the attempt cap
    /// in the rejection message.
    AlreadyPassed,
    /// The non-passing attempt cap has been reached.
    AttemptsExhausted,
}

/// Gate a new submission on the learner's prior attempts for the quiz.
pub const fn attempt_gate(already_passed: bool, failed_attempts: i64) -> AttemptGate {
    if already_passed {
        AttemptGate::AlreadyPassed
    } else if failed_attempts >= MAX_FAILED_ATTEMPTS {
        AttemptGate::AttemptsExhausted
    } else {
        AttemptGate::Allowed
    }
}

/// Legacy fixed-threshold pass check for checklist quiz completion.
pub fn legacy_quiz_passed(score: f64) -> bool {
    score >= LEGACY_PASSING_SCORE
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        questions: Vec<QuizQuestion>,
        key: Vec<AnswerKey>,
    }

    /// Two questions worth 50 points each, one correct answer per question.
    fn two_question_quiz() -> Fixture {
        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let questions = vec![
            QuizQuestion { id: q1, points: 50.0 },
            QuizQuestion { id: q2, points: 50.0 },
        ];
        let key = vec![
            AnswerKey {
                id: Uuid::new_v4(),
                question_id: q1,
                is_correct: true,
            },
            AnswerKey {
                id: Uuid::new_v4(),
                question_id: q1,
                is_correct: false,
            },
            AnswerKey {
                id: Uuid::new_v4(),
                question_id: q2,
                is_correct: true,
            },
            AnswerKey {
                id: Uuid::new_v4(),
                question_id: q2,
                is_correct: false,
            },
        ];
        Fixture { questions, key }
    }

    fn correct_answer(f: &Fixture, question_id: Uuid) -> Uuid {
        f.key
            .iter()
            .find(|a| a.question_id == question_id && a.is_correct)
            .unwrap()
            .id
    }

    fn wrong_answer(f: &Fixture, question_id: Uuid) -> Uuid {
        f.key
            .iter()
            .find(|a| a.question_id == question_id && !a.is_correct)
            .unwrap()
            .id
    }

    #[test]
    fn test_all_correct_scores_100() {
        let f = two_question_quiz();
        let submission: Vec<SubmittedAnswer> = f
            .questions
            .iter()
            .map(|q| SubmittedAnswer {
                question_id: q.id,
                answer_id: correct_answer(&f, q.id),
            })
            .collect();

        let outcome = grade_submission(&f.questions, &f.key, &submission, 100.0).unwrap();
        assert_eq!(outcome.score, 100.0);
        assert!(outcome.is_passed);
        assert_eq!(outcome.earned_points, 100.0);
        assert!(outcome.verdicts.iter().all(|v| v.is_correct));
    }

    #[test]
    fn test_half_correct_scores_50() {
        let f = two_question_quiz();
        let submission = vec![
            SubmittedAnswer {
                question_id: f.questions[0].id,
                answer_id: correct_answer(&f, f.questions[0].id),
            },
            SubmittedAnswer {
                question_id: f.questions[1].id,
                answer_id: wrong_answer(&f, f.questions[1].id),
            },
        ];

        let outcome = grade_submission(&f.questions, &f.key, &submission, 70.0).unwrap();
        assert_eq!(outcome.score, 50.0);
        assert!(!outcome.is_passed);
    }

    #[test]
    fn test_omitted_question_still_counts_toward_total() {
        let f = two_question_quiz();
        let submission = vec![SubmittedAnswer {
            question_id: f.questions[0].id,
            answer_id: correct_answer(&f, f.questions[0].id),
        }];

        let outcome = grade_submission(&f.questions, &f.key, &submission, 50.0).unwrap();
        assert_eq!(outcome.total_points, 100.0);
        assert_eq!(outcome.score, 50.0);
        assert!(outcome.is_passed);
    }

    #[test]
    fn test_unknown_question_rejects_submission() {
        let f = two_question_quiz();
        let submission = vec![SubmittedAnswer {
            question_id: Uuid::new_v4(),
            answer_id: correct_answer(&f, f.questions[0].id),
        }];

        let err = grade_submission(&f.questions, &f.key, &submission, 70.0).unwrap_err();
        assert!(matches!(err, GradeError::UnknownQuestion(_)));
    }

    #[test]
    fn test_answer_from_other_question_rejects_submission() {
        let f = two_question_quiz();
        let submission = vec![SubmittedAnswer {
            question_id: f.questions[0].id,
            answer_id: correct_answer(&f, f.questions[1].id),
        }];

        let err = grade_submission(&f.questions, &f.key, &submission, 70.0).unwrap_err();
        assert!(matches!(err, GradeError::ForeignAnswer { .. }));
    }

    #[test]
    fn test_duplicate_answer_rejects_submission() {
        let f = two_question_quiz();
        let q = f.questions[0].id;
        let submission = vec![
            SubmittedAnswer {
                question_id: q,
                answer_id: correct_answer(&f, q),
            },
            SubmittedAnswer {
                question_id: q,
                answer_id: wrong_answer(&f, q),
            },
        ];

        let err = grade_submission(&f.questions, &f.key, &submission, 70.0).unwrap_err();
        assert_eq!(err, GradeError::DuplicateAnswer(q));
    }

    #[test]
    fn test_zero_point_quiz_scores_zero() {
        let outcome = grade_submission(&[], &[], &[], 70.0).unwrap();
        assert_eq!(outcome.total_points, 0.0);
        assert_eq!(outcome.score, 0.0);
        assert!(!outcome.is_passed);
    }

    #[test]
    fn test_uneven_weights_round_to_two_decimals() {
        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let questions = vec![
            QuizQuestion { id: q1, points: 1.0 },
            QuizQuestion { id: q2, points: 2.0 },
        ];
        let a1 = Uuid::new_v4();
        let key = vec![
            AnswerKey {
                id: a1,
                question_id: q1,
                is_correct: true,
            },
            AnswerKey {
                id: Uuid::new_v4(),
                question_id: q2,
                is_correct: true,
            },
        ];
        let submission = vec![SubmittedAnswer {
            question_id: q1,
            answer_id: a1,
        }];

        let outcome = grade_submission(&questions, &key, &submission, 70.0).unwrap();
        assert_eq!(outcome.score, 33.33);
    }

    #[test]
    fn test_attempt_gate() {
        assert_eq!(attempt_gate(false, 0), AttemptGate::Allowed);
        assert_eq!(attempt_gate(false, 2), AttemptGate::Allowed);
        assert_eq!(attempt_gate(false, 3), AttemptGate::AttemptsExhausted);
        assert_eq!(attempt_gate(false, 7), AttemptGate::AttemptsExhausted);
        // A prior pass blocks regardless of count and wins the messaging.
        assert_eq!(attempt_gate(true, 0), AttemptGate::AlreadyPassed);
        assert_eq!(attempt_gate(true, 3), AttemptGate::AlreadyPassed);
    }

    #[test]
    fn test_legacy_threshold() {
        assert!(legacy_quiz_passed(70.0));
        assert!(legacy_quiz_passed(92.5));
        assert!(!legacy_quiz_passed(69.99));
        assert!(!legacy_quiz_passed(0.0));
    }
}
