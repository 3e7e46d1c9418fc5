use crate::graph::link::LinkId;
use crate::graph::network::Network;
use crate::graph::node::NodeId;
use crate::state::flow::FlowAssignment;

/// Used flow against declared capacity for one link. Both directions are
/// reported because capacity bounds each of them separately.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkUtilization {
    link: LinkId,
    a: NodeId,
    b: NodeId,
    forward: f64,
    backward: f64,
    capacity: f64,
}

impl LinkUtilization {
    pub fn link(&self) -> LinkId {
        self.link
    }

    pub fn a(&self) -> NodeId {
        self.a
    }

    pub fn b(&self) -> NodeId {
        self.b
    }

    /// `a -> b`
    pub fn forward(&self) -> f64 {
        self.forward
    }

    /// `b -> a`
    pub fn backward(&self) -> f64 {
        self.backward
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Signed net flow, positive for `a -> b`.
    pub fn net(&self) -> f64 {
        self.forward - self.backward
    }

    pub fn peak(&self) -> f64 {
        self.forward.max(self.backward)
    }

    pub fn ratio(&self) -> f64 {
        if self.capacity > 0.0 {
            self.peak() / self.capacity
        } else {
            0.0
        }
    }
}

/// One entry per link in link-table order, idle links included.
pub fn link_utilization(network: &Network, flows: &FlowAssignment) -> Vec<LinkUtilization> {
    network
        .links()
        .iter()
        .map(|l| LinkUtilization {
            link: l.id(),
            a: l.a(),
            b: l.b(),
            forward: flows.get(l.a(), l.b()),
            backward: flows.get(l.b(), l.a()),
            capacity: l.capacity(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::network::NetworkBuilder;
    use approx::assert_relative_eq;

    #[test]
    fn test_every_link_reported() {
        let network = NetworkBuilder::new()
            .node("A", 0.0, 0.0)
            .node("B", 0.0, 0.0)
            .node("C", 0.0, 0.0)
            .link("A", "B", 10.0)
            .link("B", "C", 4.0)
            .link("C", "A", 0.0)
            .build()
            .unwrap();
        let mut flows = FlowAssignment::new();
        flows.add(NodeId(0), NodeId(1), 3.0);
        flows.add(NodeId(2), NodeId(1), 4.0);
        flows.add(NodeId(1), NodeId(2), 1.0);

        let usage = link_utilization(&network, &flows);

        assert_eq!(3, usage.len());
        assert_relative_eq!(0.3, usage[0].ratio());
        assert_relative_eq!(1.0, usage[1].forward());
        assert_relative_eq!(4.0, usage[1].backward());
        assert_relative_eq!(-3.0, usage[1].net());
        assert_relative_eq!(1.0, usage[1].ratio());
        assert_relative_eq!(0.0, usage[2].peak());
        assert_relative_eq!(0.0, usage[2].ratio());
    }
}
