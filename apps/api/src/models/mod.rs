pub mod candidate;
pub mod interview;
pub mod job;

pub use candidate::CandidateRow;
pub use interview::InterviewRow;
pub use job::JobRow;
