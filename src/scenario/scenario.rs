use crate::analysis::netting::Observation;
use crate::graph::error::NetworkError;
use crate::graph::network::Network;

pub trait Scenario {
    fn name(&self) -> &str;
    fn build(&self) -> Result<(Network, Vec<Observation>), NetworkError>;
}
