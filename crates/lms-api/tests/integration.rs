mod common;

mod course_tests;
mod quiz_tests;
