use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::analysis::netting::Observation;
use crate::graph::error::NetworkError;
use crate::graph::link::{Link, LinkId};
use crate::graph::network::Network;
use crate::graph::node::{Node, NodeId};
use crate::scenario::scenario::Scenario;

pub struct RandomScenario {
    seed: u64,
    node_count: usize,
}

impl RandomScenario {
    pub fn new(seed: u64, node_count: usize) -> Self {
        Self {
            seed,
            node_count: node_count.max(2),
        }
    }
}

fn tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl Scenario for RandomScenario {
    fn name(&self) -> &str {
        "random"
    }

    fn build(&self) -> Result<(Network, Vec<Observation>), NetworkError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = self.node_count;

        let nodes = (0..n)
            .map(|i| {
                let supply = rng.gen_range(0..20) as f64;
                let demand = rng.gen_range(0..20) as f64;
                Node::new(NodeId(i), format!("sys-{}", i), supply, demand)
            })
            .collect::<Vec<Node>>();

        let mut links = Vec::new();
        let mut has_link = vec![vec![false; n]; n];

        let mut add_link = |a: usize, b: usize, capacity: f64| {
            if a == b || has_link[a][b] {
                return;
            }
            has_link[a][b] = true;
            has_link[b][a] = true;
            links.push(Link::new(LinkId(links.len()), NodeId(a), NodeId(b), capacity));
        };

        for i in 1..n {
            let parent = rng.gen_range(0..i);
            add_link(parent, i, rng.gen_range(1..15) as f64);
        }

        let extra_links = n / 2;
        for _ in 0..extra_links {
            let a = rng.gen_range(0..n);
            let b = rng.gen_range(0..n);
            add_link(a, b, rng.gen_range(1..15) as f64);
        }

        let mut observations = Vec::new();
        for link in &links {
            if !rng.gen_bool(0.6) {
                continue;
            }
            let forward = tenths(rng.gen_range(0.0..=link.capacity()));
            let backward = tenths(rng.gen_range(0.0..=link.capacity()));
            observations.push(Observation::new(link.a(), link.b(), forward));
            observations.push(Observation::new(link.b(), link.a(), backward));
        }

        let network = Network::new(nodes, links)?;
        Ok((network, observations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rescue::policy::FirstFeasiblePath;
    use crate::rescue::scheduler::RescueScheduler;

    #[test]
    fn test_same_seed_same_network() {
        let (first, first_obs) = RandomScenario::new(7, 15).build().unwrap();
        let (second, second_obs) = RandomScenario::new(7, 15).build().unwrap();

        assert_eq!(first_obs, second_obs);
        assert_eq!(first.link_count(), second.link_count());
        first.links().iter().zip(second.links()).for_each(|(a, b)| {
            assert_eq!(a.key(), b.key());
            assert_eq!(a.capacity(), b.capacity());
        });
    }

    #[test]
    fn test_spanning_tree_present() {
        let (network, _) = RandomScenario::new(3, 20).build().unwrap();
        assert!(network.link_count() >= 19);
        assert!(network.nodes().iter().all(|n| !network.neighbors(n.id()).is_empty()));
    }

    #[test]
    fn test_seeds_produce_valid_runs() {
        for seed in 0..20 {
            let (network, observations) = RandomScenario::new(seed, 12).build().unwrap();
            let mut scheduler =
                RescueScheduler::new(network, &observations, Box::new(FirstFeasiblePath)).unwrap();
            let report = scheduler.run();
            for usage in &report.utilization {
                assert!(usage.peak() <= usage.capacity() + 1e-9);
            }
        }
    }

    #[test]
    fn test_minimum_size() {
        let (network, _) = RandomScenario::new(1, 0).build().unwrap();
        assert_eq!(2, network.node_count());
    }
}
