pub mod error;
pub mod link;
pub mod network;
pub mod node;
