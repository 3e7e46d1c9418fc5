use std::collections::BTreeMap;

use tracing::trace;

use crate::graph::link::pair_key;
use crate::graph::node::NodeId;
use crate::state::flow::FlowAssignment;

/// One row of raw, directed flow data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    from: NodeId,
    to: NodeId,
    /// amount >= 0.0
    amount: f64,
}

impl Observation {
    pub fn new(from: NodeId, to: NodeId, amount: f64) -> Self {
        Self { from, to, amount }
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// `a -> b`
    Forward,
    /// `b -> a`
    Backward,
    Balanced,
}

/// Signed flow on the unordered pair `{a, b}`, with `a < b`. Positive means
/// `a -> b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetFlow {
    a: NodeId,
    b: NodeId,
    net: f64,
}

impl NetFlow {
    pub fn a(&self) -> NodeId {
        self.a
    }

    pub fn b(&self) -> NodeId {
        self.b
    }

    pub fn net(&self) -> f64 {
        self.net
    }

    pub fn magnitude(&self) -> f64 {
        self.net.abs()
    }

    pub fn direction(&self) -> Direction {
        if self.net > 0.0 {
            Direction::Forward
        } else if self.net < 0.0 {
            Direction::Backward
        } else {
            Direction::Balanced
        }
    }

    /// `(from, to, amount)` along the dominant direction, if there is one.
    pub fn dominant(&self) -> Option<(NodeId, NodeId, f64)> {
        match self.direction() {
            Direction::Forward => Some((self.a, self.b, self.net)),
            Direction::Backward => Some((self.b, self.a, -self.net)),
            Direction::Balanced => None,
        }
    }
}

/// Net flow per unordered pair, ordered by pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetFlows {
    flows: BTreeMap<(NodeId, NodeId), f64>,
}

impl NetFlows {
    /// Signed flow from `x` to `y`; zero for pairs never observed.
    pub fn get(&self, x: NodeId, y: NodeId) -> f64 {
        let key = pair_key(x, y);
        let net = self.flows.get(&key).copied().unwrap_or(0.0);
        if key.0 == x { net } else { -net }
    }

    pub fn iter(&self) -> impl Iterator<Item = NetFlow> + '_ {
        self.flows
            .iter()
            .map(|(&(a, b), &net)| NetFlow { a, b, net })
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Directed assignment holding only the dominant direction of each pair.
    pub fn to_assignment(&self) -> FlowAssignment {
        let mut assignment = FlowAssignment::new();
        self.iter()
            .filter_map(|f| f.dominant())
            .for_each(|(from, to, amount)| assignment.add(from, to, amount));
        assignment
    }
}

/// Collapses opposing observations on each unordered pair into one signed
/// value. Pairs whose observations cancel are kept with a zero net.
pub fn net_observations(observations: &[Observation]) -> NetFlows {
    let mut flows = BTreeMap::new();
    for obs in observations {
        if obs.from == obs.to {
            trace!(node = %obs.from, amount = obs.amount, "skipping self observation");
            continue;
        }
        let key = pair_key(obs.from, obs.to);
        let signed = if key.0 == obs.from { obs.amount } else { -obs.amount };
        *flows.entry(key).or_insert(0.0) += signed;
    }
    NetFlows { flows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn obs(from: usize, to: usize, amount: f64) -> Observation {
        Observation::new(NodeId(from), NodeId(to), amount)
    }

    #[test]
    fn test_opposing_observations_cancel() {
        let net = net_observations(&[obs(0, 1, 3.0), obs(1, 0, 1.0)]);

        assert_relative_eq!(2.0, net.get(NodeId(0), NodeId(1)));
        assert_relative_eq!(-2.0, net.get(NodeId(1), NodeId(0)));
        let flow = net.iter().next().unwrap();
        assert_eq!(Direction::Forward, flow.direction());
        assert_eq!(Some((NodeId(0), NodeId(1), 2.0)), flow.dominant());
    }

    #[test]
    fn test_reverse_dominant_direction() {
        let net = net_observations(&[obs(2, 1, 4.0), obs(1, 2, 1.5), obs(2, 1, 0.5)]);

        let flow = net.iter().next().unwrap();
        assert_eq!((NodeId(1), NodeId(2)), (flow.a(), flow.b()));
        assert_eq!(Direction::Backward, flow.direction());
        assert_relative_eq!(3.0, flow.magnitude());
    }

    #[test]
    fn test_exact_cancellation_is_balanced() {
        let net = net_observations(&[obs(0, 1, 2.0), obs(1, 0, 2.0), obs(2, 0, 0.0)]);

        assert_eq!(2, net.len());
        assert!(net.iter().all(|f| f.direction() == Direction::Balanced));
        assert!(net.to_assignment().is_empty());
    }

    #[test]
    fn test_unobserved_pair_is_zero() {
        let net = net_observations(&[obs(0, 1, 2.0)]);
        assert_relative_eq!(0.0, net.get(NodeId(3), NodeId(4)));
    }

    #[test]
    fn test_self_observation_skipped() {
        let net = net_observations(&[obs(1, 1, 9.0)]);
        assert!(net.is_empty());
    }

    #[test]
    fn test_assignment_has_one_direction_per_pair() {
        let net = net_observations(&[
            obs(0, 1, 3.0),
            obs(1, 0, 1.0),
            obs(1, 2, 2.0),
            obs(2, 1, 0.0),
            obs(0, 3, 1.0),
            obs(3, 0, 0.0),
        ]);

        let assignment = net.to_assignment();

        assert_eq!(3, assignment.len());
        assert_relative_eq!(2.0, assignment.get(NodeId(0), NodeId(1)));
        assert_relative_eq!(2.0, assignment.get(NodeId(1), NodeId(2)));
        assert_relative_eq!(1.0, assignment.get(NodeId(0), NodeId(3)));
    }
}
