use crate::analysis::netting::NetFlows;
use crate::analysis::utilization::LinkUtilization;
use crate::graph::node::NodeId;
use crate::rescue::policy::FlowPath;
use crate::state::balance::Balances;
use crate::state::flow::FlowAssignment;

/// Flow added by one iteration of the rescue loop.
#[derive(Clone, Debug, PartialEq)]
pub struct RescuePush {
    iteration: usize,
    donor: NodeId,
    deficit: NodeId,
    path: FlowPath,
    amount: f64,
}

impl RescuePush {
    pub fn new(
        iteration: usize,
        donor: NodeId,
        deficit: NodeId,
        path: FlowPath,
        amount: f64,
    ) -> Self {
        Self {
            iteration,
            donor,
            deficit,
            path,
            amount,
        }
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn donor(&self) -> NodeId {
        self.donor
    }

    pub fn deficit(&self) -> NodeId {
        self.deficit
    }

    pub fn path(&self) -> &FlowPath {
        &self.path
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RescueStatus {
    Balanced,
    /// Nodes still short after the loop gave up, with the missing amount.
    Stalled { deficits: Vec<(NodeId, f64)> },
}

impl RescueStatus {
    pub fn is_balanced(&self) -> bool {
        matches!(self, RescueStatus::Balanced)
    }
}

/// Outcome of a finished (or abandoned) rescue run. A stall still carries the
/// partial plan.
#[derive(Clone, Debug)]
pub struct RescueReport {
    pub status: RescueStatus,
    /// Net observed flow per pair before rescue, balanced pairs included.
    pub observed: NetFlows,
    pub seeded_balances: Balances,
    /// Final assignment with one direction per pair.
    pub flows: FlowAssignment,
    pub balances: Balances,
    pub utilization: Vec<LinkUtilization>,
    pub pushes: Vec<RescuePush>,
    pub iterations: usize,
}
