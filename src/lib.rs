pub mod analysis;
pub mod graph;
pub mod rescue;
pub mod scenario;
pub mod state;
pub mod tui;
