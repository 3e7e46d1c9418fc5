use crate::analysis::netting::Observation;
use crate::graph::error::NetworkError;
use crate::graph::network::{Network, NetworkBuilder};
use crate::scenario::scenario::Scenario;

/// Four systems exchanging power in both directions on some links.
pub struct BasicScenario;

impl Scenario for BasicScenario {
    fn name(&self) -> &str {
        "basic"
    }

    fn build(&self) -> Result<(Network, Vec<Observation>), NetworkError> {
        let network = NetworkBuilder::new()
            .node("A", 5.0, 3.0)
            .node("B", 2.0, 4.0)
            .node("C", 0.0, 2.0)
            .node("D", 4.0, 3.0)
            .link("A", "B", 10.0)
            .link("B", "C", 5.0)
            .link("A", "D", 5.0)
            .link("C", "D", 4.0)
            .build()?;

        let observations = [
            ("A", "B", 3.0),
            ("B", "A", 1.0),
            ("B", "C", 2.0),
            ("C", "B", 0.0),
            ("A", "D", 1.0),
            ("D", "A", 0.0),
        ]
        .iter()
        .map(|(from, to, amount)| network.observation(from, to, *amount))
        .collect::<Result<Vec<Observation>, NetworkError>>()?;

        Ok((network, observations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::NodeId;
    use crate::rescue::policy::FirstFeasiblePath;
    use crate::rescue::report::RescueStatus;
    use crate::rescue::scheduler::RescueScheduler;
    use approx::assert_relative_eq;

    #[test]
    fn test_basic_seeded_balances() {
        let (network, observations) = BasicScenario.build().unwrap();
        let scheduler =
            RescueScheduler::new(network, &observations, Box::new(FirstFeasiblePath)).unwrap();
        let balances = scheduler.current_snapshot().balances();

        // A: 2 - 2 - 1, B: -2 + 2 - 2, C: -2 + 2, D: 1 + 1
        assert_relative_eq!(-1.0, balances.get(NodeId(0)));
        assert_relative_eq!(-2.0, balances.get(NodeId(1)));
        assert_relative_eq!(0.0, balances.get(NodeId(2)));
        assert_relative_eq!(2.0, balances.get(NodeId(3)));
    }

    #[test]
    fn test_basic_stalls_on_system_shortfall() {
        let (network, observations) = BasicScenario.build().unwrap();
        let mut scheduler =
            RescueScheduler::new(network, &observations, Box::new(FirstFeasiblePath)).unwrap();

        let report = scheduler.run();

        assert_eq!(2, report.iterations);
        assert_eq!(NodeId(3), report.pushes[0].donor());
        assert_eq!(NodeId(0), report.pushes[0].deficit());
        assert_eq!(
            vec![NodeId(3), NodeId(0), NodeId(1)],
            report.pushes[1].path().nodes()
        );
        match report.status {
            RescueStatus::Stalled { deficits } => {
                assert_eq!(1, deficits.len());
                assert_eq!(NodeId(1), deficits[0].0);
                assert_relative_eq!(1.0, deficits[0].1);
            }
            RescueStatus::Balanced => panic!("total demand exceeds supply"),
        }
        assert_relative_eq!(-1.0, report.balances.total());
    }
}
