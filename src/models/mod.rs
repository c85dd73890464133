pub mod course;
pub mod lesson;

pub use course::{Category, Course, NewCourse, ParseEnumError, Status};
pub use lesson::Lesson;
