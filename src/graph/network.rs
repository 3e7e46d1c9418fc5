use std::collections::HashMap;

use crate::analysis::netting::Observation;
use crate::graph::error::{NetworkError, check_quantity};
use crate::graph::link::{Link, LinkId, pair_key};
use crate::graph::node::{Node, NodeId};
use crate::state::balance::scaled_tolerance;
use crate::state::flow::FlowAssignment;

/// Immutable node and link tables.
///
/// Neighbor lists are kept sorted by `NodeId`, so every traversal over the
/// network visits neighbors in the same order regardless of how the links
/// were declared.
#[derive(Debug)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    adj: Vec<Vec<(NodeId, LinkId)>>,
    by_name: HashMap<String, NodeId>,
    by_pair: HashMap<(NodeId, NodeId), LinkId>,
    tolerance: f64,
}

impl Network {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self, NetworkError> {
        let mut by_name = HashMap::with_capacity(nodes.len());
        for (row, node) in nodes.iter().enumerate() {
            if node.id().index() != row {
                return Err(NetworkError::NodeIdMismatch {
                    expected: row,
                    found: node.id().index(),
                });
            }
            check_quantity(|| format!("supply of `{}`", node.name()), node.supply())?;
            check_quantity(|| format!("demand of `{}`", node.name()), node.demand())?;
            if by_name.insert(node.name().to_string(), node.id()).is_some() {
                return Err(NetworkError::DuplicateNode(node.name().to_string()));
            }
        }

        let name = |id: NodeId| nodes[id.index()].name().to_string();

        let mut adj: Vec<Vec<(NodeId, LinkId)>> = vec![Vec::new(); nodes.len()];
        let mut by_pair = HashMap::with_capacity(links.len());
        for (row, link) in links.iter().enumerate() {
            for end in [link.a(), link.b()] {
                if end.index() >= nodes.len() {
                    return Err(NetworkError::UnknownNodeId(end.index()));
                }
            }
            if link.a() == link.b() {
                return Err(NetworkError::SelfLink(name(link.a())));
            }
            check_quantity(
                || format!("capacity of `{}`-`{}`", name(link.a()), name(link.b())),
                link.capacity(),
            )?;
            if by_pair.insert(link.key(), LinkId(row)).is_some() {
                return Err(NetworkError::DuplicateLink {
                    a: name(link.a()),
                    b: name(link.b()),
                });
            }
            adj[link.a().index()].push((link.b(), LinkId(row)));
            adj[link.b().index()].push((link.a(), LinkId(row)));
        }
        adj.iter_mut().for_each(|neighbors| neighbors.sort());

        let supply = nodes.iter().map(Node::supply).sum::<f64>();
        let demand = nodes.iter().map(Node::demand).sum::<f64>();
        let widest = links.iter().map(Link::capacity).fold(0.0, f64::max);
        let tolerance = scaled_tolerance(supply.max(demand).max(widest));

        Ok(Self {
            nodes,
            links,
            adj,
            by_name,
            by_pair,
            tolerance,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_by_id(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn link_by_id(&self, id: LinkId) -> &Link {
        &self.links[id.index()]
    }

    pub fn node_by_name(&self, name: &str) -> Result<NodeId, NetworkError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownNode(name.to_string()))
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.nodes[id.index()].name()
    }

    /// Neighbors of `id` with the connecting link, ascending by neighbor id.
    pub fn neighbors(&self, id: NodeId) -> &[(NodeId, LinkId)] {
        &self.adj[id.index()]
    }

    pub fn link_between(&self, x: NodeId, y: NodeId) -> Option<&Link> {
        self.by_pair
            .get(&pair_key(x, y))
            .map(|id| &self.links[id.index()])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn total_supply(&self) -> f64 {
        self.nodes.iter().map(Node::supply).sum()
    }

    pub fn total_demand(&self) -> f64 {
        self.nodes.iter().map(Node::demand).sum()
    }

    /// Distance from zero below which balances and link headroom are treated
    /// as zero, scaled to the largest supply, demand or capacity total.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Resolves one row of the observation table.
    pub fn observation(
        &self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<Observation, NetworkError> {
        let from_id = self.node_by_name(from)?;
        let to_id = self.node_by_name(to)?;
        check_quantity(|| format!("observed flow `{}`->`{}`", from, to), amount)?;
        Ok(Observation::new(from_id, to_id, amount))
    }

    /// Checks raw observations before netting: both endpoints must exist and
    /// the amount must be a finite non-negative number. Rows that cancel out
    /// or loop back on one node are still checked.
    pub fn check_observations(&self, observations: &[Observation]) -> Result<(), NetworkError> {
        for obs in observations {
            for end in [obs.from(), obs.to()] {
                if end.index() >= self.nodes.len() {
                    return Err(NetworkError::UnknownNodeId(end.index()));
                }
            }
            let (from, to) = (self.name(obs.from()), self.name(obs.to()));
            check_quantity(|| format!("observed flow `{}`->`{}`", from, to), obs.amount())?;
        }
        Ok(())
    }

    /// Checks that every directed entry runs along a link and stays within
    /// that link's capacity.
    pub fn check_flows(&self, flows: &FlowAssignment) -> Result<(), NetworkError> {
        for (from, to, amount) in flows.iter() {
            if from.index() >= self.nodes.len() {
                return Err(NetworkError::UnknownNodeId(from.index()));
            }
            if to.index() >= self.nodes.len() {
                return Err(NetworkError::UnknownNodeId(to.index()));
            }
            let link = self
                .link_between(from, to)
                .ok_or_else(|| NetworkError::UnlinkedFlow {
                    from: self.name(from).to_string(),
                    to: self.name(to).to_string(),
                })?;
            if amount > link.capacity() + self.tolerance {
                return Err(NetworkError::CapacityExceeded {
                    from: self.name(from).to_string(),
                    to: self.name(to).to_string(),
                    amount,
                    capacity: link.capacity(),
                });
            }
        }
        Ok(())
    }
}

/// Collects node and link rows by name and resolves them into a `Network`.
/// Nodes receive ids in the order they are added.
#[derive(Default)]
pub struct NetworkBuilder {
    nodes: Vec<(String, f64, f64)>,
    links: Vec<(String, String, f64)>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, name: impl Into<String>, supply: f64, demand: f64) -> Self {
        self.nodes.push((name.into(), supply, demand));
        self
    }

    pub fn link(mut self, a: impl Into<String>, b: impl Into<String>, capacity: f64) -> Self {
        self.links.push((a.into(), b.into(), capacity));
        self
    }

    pub fn build(self) -> Result<Network, NetworkError> {
        let nodes = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(i, (name, supply, demand))| Node::new(NodeId(i), name, supply, demand))
            .collect::<Vec<Node>>();

        let lookup = |name: &str| {
            nodes
                .iter()
                .find(|n| n.name() == name)
                .map(Node::id)
                .ok_or_else(|| NetworkError::UnknownNode(name.to_string()))
        };

        let links = self
            .links
            .iter()
            .enumerate()
            .map(|(i, (a, b, capacity))| -> Result<Link, NetworkError> {
                Ok(Link::new(LinkId(i), lookup(a.as_str())?, lookup(b.as_str())?, *capacity))
            })
            .collect::<Result<Vec<Link>, NetworkError>>()?;

        Network::new(nodes, links)
    }
}
