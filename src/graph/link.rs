use crate::graph::node::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId(pub usize);

impl LinkId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Undirected connection between two nodes. The capacity bounds each direction
/// on its own: a link can carry `capacity` from `a` to `b` and `capacity` back.
#[derive(Clone, Debug)]
pub struct Link {
    id: LinkId,
    a: NodeId,
    b: NodeId,
    /// capacity >= 0.0
    capacity: f64,
}

impl Link {
    pub fn new(id: LinkId, a: NodeId, b: NodeId, capacity: f64) -> Self {
        Self { id, a, b, capacity }
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn a(&self) -> NodeId {
        self.a
    }

    pub fn b(&self) -> NodeId {
        self.b
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Endpoints ordered by id, the canonical key of the unordered pair.
    pub fn key(&self) -> (NodeId, NodeId) {
        pair_key(self.a, self.b)
    }

    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

pub fn pair_key(x: NodeId, y: NodeId) -> (NodeId, NodeId) {
    if x <= y { (x, y) } else { (y, x) }
}
