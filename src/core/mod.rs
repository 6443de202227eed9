pub mod model;
pub mod verdict;

pub use model::{Example, Problem, Submission, SubmissionRequest, TestCase};
pub use verdict::SubmissionStatus;
