use crate::error::ApiError;

/// Validate a course rating value.
///
/// # Examples
/// ```
/// use lms_api::validation::validate_rating;
///
/// assert!(validate_rating(4).is_ok());
/// assert!(validate_rating(6).is_err());
/// ```
pub fn validate_rating(rating: i32) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::Validation(format!(
            "rating must be between 1 and 5, got {rating}"
        )));
    }
    Ok(())
}

/// Validate the shape of a question's answer set: 2-4 answers with exactly
/// one marked correct.
pub fn validate_answer_set(answer_count: usize, correct_count: usize) -> Result<(), ApiError> {
    if !(2..=4).contains(&answer_count) {
        return Err(ApiError::Validation(format!(
            "a question needs between 2 and 4 answers, got {answer_count}"
        )));
    }
    if correct_count != 1 {
        return Err(ApiError::Validation(format!(
            "a question needs exactly one correct answer, got {correct_count}"
        )));
    }
    Ok(())
}

/// Validate a percentage score or threshold.
pub fn validate_percentage(label: &str, value: f64) -> Result<(), ApiError> {
    if !(0.0..=100.0).contains(&value) || !value.is_finite() {
        return Err(ApiError::Validation(format!(
            "{label} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validate an ordering position within a course or module.
pub fn validate_order_sequence(order_sequence: i32) -> Result<(), ApiError> {
    if order_sequence < 1 {
        return Err(ApiError::Validation(format!(
            "order_sequence must be positive, got {order_sequence}"
        )));
    }
    Ok(())
}

/// Validate a question's point weight.
pub fn validate_point(point: f64) -> Result<(), ApiError> {
    if point <= 0.0 || !point.is_finite() {
        return Err(ApiError::Validation(format!(
            "question point weight must be positive, got {point}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());

        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-3).is_err());
    }

    #[test]
    fn test_validate_answer_set() {
        assert!(validate_answer_set(2, 1).is_ok());
        assert!(validate_answer_set(4, 1).is_ok());

        // Too few / too many answers.
        assert!(validate_answer_set(1, 1).is_err());
        assert!(validate_answer_set(5, 1).is_err());
        // No correct answer, or more than one.
        assert!(validate_answer_set(3, 0).is_err());
        assert!(validate_answer_set(3, 2).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage("score", 0.0).is_ok());
        assert!(validate_percentage("score", 70.0).is_ok());
        assert!(validate_percentage("score", 100.0).is_ok());

        assert!(validate_percentage("score", -0.1).is_err());
        assert!(validate_percentage("score", 100.1).is_err());
        assert!(validate_percentage("score", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_order_sequence() {
        assert!(validate_order_sequence(1).is_ok());
        assert!(validate_order_sequence(0).is_err());
        assert!(validate_order_sequence(-1).is_err());
    }

    #[test]
    fn test_validate_point() {
        assert!(validate_point(0.5).is_ok());
        assert!(validate_point(0.0).is_err());
        assert!(validate_point(-2.0).is_err());
        assert!(validate_point(f64::INFINITY).is_err());
    }
}
