use std::collections::BTreeMap;

use crate::graph::node::NodeId;

/// Directed flow amounts keyed by `(from, to)`.
///
/// Entries only ever grow. Iteration is ordered by `(from, to)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowAssignment {
    flows: BTreeMap<(NodeId, NodeId), f64>,
}

impl FlowAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the directed entry, creating it if absent. Non-positive
    /// amounts leave the assignment untouched.
    pub fn add(&mut self, from: NodeId, to: NodeId, amount: f64) {
        if amount > 0.0 {
            *self.flows.entry((from, to)).or_insert(0.0) += amount;
        }
    }

    pub fn get(&self, from: NodeId, to: NodeId) -> f64 {
        self.flows.get(&(from, to)).copied().unwrap_or(0.0)
    }

    /// Signed flow from `x` to `y` after cancelling the opposite direction.
    pub fn net(&self, x: NodeId, y: NodeId) -> f64 {
        self.get(x, y) - self.get(y, x)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.flows.iter().map(|(&(from, to), &amount)| (from, to, amount))
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Collapses opposing entries so each pair keeps only its dominant
    /// direction. Pairs that cancel exactly disappear.
    pub fn netted(&self) -> FlowAssignment {
        let mut out = FlowAssignment::new();
        self.flows
            .keys()
            .filter(|(from, to)| from < to || !self.flows.contains_key(&(*to, *from)))
            .for_each(|&(from, to)| {
                let net = self.net(from, to);
                if net > 0.0 {
                    out.add(from, to, net);
                } else if net < 0.0 {
                    out.add(to, from, -net);
                }
            });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_add_accumulates_and_ignores_non_positive() {
        let mut flows = FlowAssignment::new();
        flows.add(NodeId(0), NodeId(1), 2.0);
        flows.add(NodeId(0), NodeId(1), 1.5);
        flows.add(NodeId(1), NodeId(0), 0.0);
        flows.add(NodeId(1), NodeId(0), -3.0);

        assert_relative_eq!(3.5, flows.get(NodeId(0), NodeId(1)));
        assert_relative_eq!(0.0, flows.get(NodeId(1), NodeId(0)));
        assert_eq!(1, flows.len());
    }

    #[test]
    fn test_netted_keeps_dominant_direction() {
        let mut flows = FlowAssignment::new();
        flows.add(NodeId(0), NodeId(1), 3.0);
        flows.add(NodeId(1), NodeId(0), 5.0);
        flows.add(NodeId(2), NodeId(1), 4.0);
        flows.add(NodeId(3), NodeId(4), 1.0);
        flows.add(NodeId(4), NodeId(3), 1.0);

        let netted = flows.netted();

        assert_relative_eq!(2.0, netted.get(NodeId(1), NodeId(0)));
        assert_relative_eq!(0.0, netted.get(NodeId(0), NodeId(1)));
        assert_relative_eq!(4.0, netted.get(NodeId(2), NodeId(1)));
        assert_relative_eq!(0.0, netted.net(NodeId(3), NodeId(4)));
        assert_eq!(2, netted.len());
    }
}
