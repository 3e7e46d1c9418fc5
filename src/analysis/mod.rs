pub mod netting;
pub mod utilization;
