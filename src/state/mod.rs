pub mod balance;
pub mod flow;
pub mod snapshot;
