use crate::state::balance::Balances;
use crate::state::flow::FlowAssignment;

#[derive(Clone, Debug)]
pub struct Snapshot {
    iteration: usize,
    flows: FlowAssignment,
    balances: Balances,
}

impl Snapshot {
    pub fn new(iteration: usize, flows: FlowAssignment, balances: Balances) -> Self {
        Self {
            iteration,
            flows,
            balances,
        }
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn flows(&self) -> &FlowAssignment {
        &self.flows
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }
}
