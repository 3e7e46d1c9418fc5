pub mod basic;
pub mod bottleneck;
pub mod random;
pub mod scenario;
