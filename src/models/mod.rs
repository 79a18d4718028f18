pub mod submission;

pub use submission::{RawSubmission, Submission, SubmissionId};
