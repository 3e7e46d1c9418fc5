pub mod policy;
pub mod report;
pub mod scheduler;
