use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    name: String,
    /// supply >= 0.0
    supply: f64,
    /// demand >= 0.0
    demand: f64,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, supply: f64, demand: f64) -> Self {
        Self {
            id,
            name: name.into(),
            supply,
            demand,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supply(&self) -> f64 {
        self.supply
    }

    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Balance of the node before any flow enters or leaves it.
    pub fn local_balance(&self) -> f64 {
        self.supply - self.demand
    }
}
