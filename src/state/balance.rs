use crate::graph::network::Network;
use crate::graph::node::NodeId;
use crate::state::flow::FlowAssignment;

/// Balances within this distance of zero are treated as zero. Residual link
/// headroom at or below it counts as saturated.
pub const TOLERANCE: f64 = 1e-9;

/// Share of the network's largest quantity that is still treated as zero.
/// Keeps the zero band above f64 rounding once quantities grow large.
pub const RELATIVE_TOLERANCE: f64 = 1e-12;

/// Zero band for quantities of magnitude `scale`, never below `TOLERANCE`.
pub fn scaled_tolerance(scale: f64) -> f64 {
    TOLERANCE.max(scale.abs() * RELATIVE_TOLERANCE)
}

/// Per-node balance indexed by `NodeId`.
#[derive(Clone, Debug, PartialEq)]
pub struct Balances {
    values: Vec<f64>,
    tolerance: f64,
}

impl Balances {
    pub fn get(&self, id: NodeId) -> f64 {
        self.values[id.index()]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.values.iter().enumerate().map(|(i, b)| (NodeId(i), *b))
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Nodes short of supply with the amount they still need, ascending by id.
    pub fn deficits(&self) -> Vec<(NodeId, f64)> {
        self.iter()
            .filter(|(_, b)| *b < -self.tolerance)
            .map(|(id, b)| (id, -b))
            .collect()
    }

    /// Nodes with spare supply and the amount they can give, ascending by id.
    pub fn surpluses(&self) -> Vec<(NodeId, f64)> {
        self.iter().filter(|(_, b)| *b > self.tolerance).collect()
    }

    pub fn is_balanced(&self) -> bool {
        self.values.iter().all(|b| *b >= -self.tolerance)
    }
}

/// Derives every node's balance from scratch:
/// `supply - demand - outgoing + incoming`. The zero band comes from
/// `Network::tolerance`.
pub fn compute_balances(network: &Network, flows: &FlowAssignment) -> Balances {
    let mut values = network
        .nodes()
        .iter()
        .map(|n| n.local_balance())
        .collect::<Vec<f64>>();

    flows.iter().for_each(|(from, to, amount)| {
        values[from.index()] -= amount;
        values[to.index()] += amount;
    });

    Balances {
        values,
        tolerance: network.tolerance(),
    }
}
