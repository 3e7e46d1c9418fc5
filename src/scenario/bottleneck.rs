use crate::analysis::netting::Observation;
use crate::graph::error::NetworkError;
use crate::graph::network::{Network, NetworkBuilder};
use crate::scenario::scenario::Scenario;

/// A large plant feeding a town through a narrow substation link and a
/// thin ring bypass. Supply exceeds demand overall, yet the links cannot
/// carry enough of it.
pub struct BottleneckScenario;

impl Scenario for BottleneckScenario {
    fn name(&self) -> &str {
        "bottleneck"
    }

    fn build(&self) -> Result<(Network, Vec<Observation>), NetworkError> {
        let network = NetworkBuilder::new()
            .node("plant", 30.0, 2.0)
            .node("sub-north", 0.0, 3.0)
            .node("sub-south", 0.0, 4.0)
            .node("town", 2.0, 18.0)
            .node("ring-1", 0.0, 0.0)
            .node("ring-2", 1.0, 0.0)
            .node("wind", 6.0, 0.0)
            .node("mill", 0.0, 5.0)
            .link("plant", "sub-north", 12.0)
            .link("sub-north", "sub-south", 6.0)
            .link("sub-south", "town", 10.0)
            .link("plant", "ring-1", 5.0)
            .link("ring-1", "ring-2", 5.0)
            .link("ring-2", "town", 4.0)
            .link("wind", "mill", 6.0)
            .link("mill", "town", 2.0)
            .build()?;

        let observations = [
            ("plant", "sub-north", 5.0),
            ("sub-north", "sub-south", 2.0),
            ("sub-south", "town", 1.0),
            ("town", "sub-south", 1.0),
            ("wind", "mill", 3.0),
        ]
        .iter()
        .map(|(from, to, amount)| network.observation(from, to, *amount))
        .collect::<Result<Vec<Observation>, NetworkError>>()?;

        Ok((network, observations))
    }
}
