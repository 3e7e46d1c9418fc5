use std::collections::VecDeque;

use crate::graph::network::Network;
use crate::graph::node::NodeId;
use crate::state::flow::FlowAssignment;

/// Directed route from a donor to a deficit node and the most it can carry.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowPath {
    edges: Vec<(NodeId, NodeId)>,
    bottleneck: f64,
}

impl FlowPath {
    pub fn new(edges: Vec<(NodeId, NodeId)>, bottleneck: f64) -> Self {
        Self { edges, bottleneck }
    }

    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    pub fn bottleneck(&self) -> f64 {
        self.bottleneck
    }

    /// Visited nodes from source to target.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = self.edges.iter().map(|(from, _)| *from).collect::<Vec<_>>();
        if let Some((_, last)) = self.edges.last() {
            nodes.push(*last);
        }
        nodes
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// How the rescue loop routes surplus from a donor to a deficit node.
pub trait PathPolicy {
    fn name(&self) -> &'static str;

    /// `None` when `target` cannot be reached from `source`.
    fn find_path(
        &self,
        network: &Network,
        flows: &FlowAssignment,
        source: NodeId,
        target: NodeId,
    ) -> Option<FlowPath>;
}

/// Breadth-first search over links that still have headroom in the direction
/// of travel.
///
/// Returns the first path that reaches the target in BFS order, with
/// neighbors expanded by ascending id. This is not the widest path, nor a
/// particular one among several of equal length: it only answers whether
/// surplus can get through at all, and how much along that one route.
pub struct FirstFeasiblePath;

impl FirstFeasiblePath {
    fn headroom(network: &Network, flows: &FlowAssignment, from: NodeId, to: NodeId) -> f64 {
        network
            .link_between(from, to)
            .map(|l| l.capacity() - flows.get(from, to))
            .unwrap_or(0.0)
    }
}

impl PathPolicy for FirstFeasiblePath {
    fn name(&self) -> &'static str {
        "first-feasible"
    }

    fn find_path(
        &self,
        network: &Network,
        flows: &FlowAssignment,
        source: NodeId,
        target: NodeId,
    ) -> Option<FlowPath> {
        if source == target {
            return None;
        }

        let mut visited = vec![false; network.node_count()];
        let mut queue = VecDeque::new();
        queue.push_back((source, Vec::<(NodeId, NodeId)>::new(), f64::INFINITY));

        while let Some((node, path, bottleneck)) = queue.pop_front() {
            if node == target {
                return Some(FlowPath::new(path, bottleneck));
            }
            if visited[node.index()] {
                continue;
            }
            visited[node.index()] = true;

            for (next, _) in network.neighbors(node) {
                if visited[next.index()] {
                    continue;
                }
                let room = Self::headroom(network, flows, node, *next);
                if room <= network.tolerance() {
                    continue;
                }
                let mut extended = path.clone();
                extended.push((node, *next));
                queue.push_back((*next, extended, bottleneck.min(room)));
            }
        }
        None
    }
}

/// Ignores the link graph and moves surplus straight from donor to deficit
/// over a virtual edge with no capacity limit.
pub struct DirectTransfer;

impl PathPolicy for DirectTransfer {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn find_path(
        &self,
        _network: &Network,
        _flows: &FlowAssignment,
        source: NodeId,
        target: NodeId,
    ) -> Option<FlowPath> {
        (source != target).then(|| FlowPath::new(vec![(source, target)], f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::network::NetworkBuilder;
    use approx::assert_relative_eq;

    fn network(links: &[(&str, &str, f64)]) -> Network {
        let mut builder = NetworkBuilder::new();
        for name in ["A", "B", "C", "D", "E"] {
            builder = builder.node(name, 0.0, 0.0);
        }
        for (a, b, c) in links {
            builder = builder.link(*a, *b, *c);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_chain_bottleneck_is_minimum_capacity() {
        let network = network(&[("A", "B", 5.0), ("B", "C", 3.0)]);

        let path = FirstFeasiblePath
            .find_path(&network, &FlowAssignment::new(), NodeId(0), NodeId(2))
            .unwrap();

        assert_eq!(vec![(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))], path.edges());
        assert_eq!(vec![NodeId(0), NodeId(1), NodeId(2)], path.nodes());
        assert_relative_eq!(3.0, path.bottleneck());
    }

    #[test]
    fn test_unreachable_target() {
        let network = network(&[("A", "B", 5.0), ("C", "D", 5.0)]);

        let flows = FlowAssignment::new();
        let path = FirstFeasiblePath.find_path(&network, &flows, NodeId(0), NodeId(3));

        assert!(path.is_none());
    }

    #[test]
    fn test_same_source_and_target() {
        let network = network(&[("A", "B", 5.0)]);
        assert!(
            FirstFeasiblePath
                .find_path(&network, &FlowAssignment::new(), NodeId(0), NodeId(0))
                .is_none()
        );
    }

    //   A ─1─ B ─1─ D
    //   └─9── C ─9──┘
    #[test]
    fn test_first_path_in_bfs_order_not_widest() {
        let network = network(&[
            ("A", "C", 9.0),
            ("C", "D", 9.0),
            ("A", "B", 1.0),
            ("B", "D", 1.0),
        ]);

        let path = FirstFeasiblePath
            .find_path(&network, &FlowAssignment::new(), NodeId(0), NodeId(3))
            .unwrap();

        assert_eq!(vec![NodeId(0), NodeId(1), NodeId(3)], path.nodes());
        assert_relative_eq!(1.0, path.bottleneck());
    }

    #[test]
    fn test_saturated_direction_is_skipped() {
        let network = network(&[("A", "B", 2.0), ("B", "C", 2.0), ("A", "C", 1.0)]);
        let mut flows = FlowAssignment::new();
        flows.add(NodeId(0), NodeId(2), 1.0);
        flows.add(NodeId(0), NodeId(1), 0.5);

        let path = FirstFeasiblePath
            .find_path(&network, &flows, NodeId(0), NodeId(2))
            .unwrap();

        assert_eq!(vec![NodeId(0), NodeId(1), NodeId(2)], path.nodes());
        assert_relative_eq!(1.5, path.bottleneck());
    }

    #[test]
    fn test_opposite_direction_has_own_capacity() {
        let network = network(&[("A", "B", 2.0)]);
        let mut flows = FlowAssignment::new();
        flows.add(NodeId(0), NodeId(1), 2.0);

        let path = FirstFeasiblePath
            .find_path(&network, &flows, NodeId(1), NodeId(0))
            .unwrap();

        assert_relative_eq!(2.0, path.bottleneck());
        assert!(FirstFeasiblePath.find_path(&network, &flows, NodeId(0), NodeId(1)).is_none());
    }

    #[test]
    fn test_zero_capacity_link_blocks() {
        let network = network(&[("A", "B", 0.0)]);
        assert!(
            FirstFeasiblePath
                .find_path(&network, &FlowAssignment::new(), NodeId(0), NodeId(1))
                .is_none()
        );
    }

    #[test]
    fn test_direct_transfer_ignores_links() {
        let network = network(&[]);

        let path = DirectTransfer
            .find_path(&network, &FlowAssignment::new(), NodeId(4), NodeId(1))
            .unwrap();

        assert_eq!(vec![(NodeId(4), NodeId(1))], path.edges());
        assert!(path.bottleneck().is_infinite());
    }
}
