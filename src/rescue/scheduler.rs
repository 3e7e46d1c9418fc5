use std::mem;

use tracing::{debug, info, warn};

use crate::analysis::netting::{NetFlows, Observation, net_observations};
use crate::analysis::utilization::link_utilization;
use crate::graph::error::NetworkError;
use crate::graph::network::Network;
use crate::graph::node::NodeId;
use crate::rescue::policy::{FlowPath, PathPolicy};
use crate::rescue::report::{RescuePush, RescueReport, RescueStatus};
use crate::state::balance::{Balances, compute_balances};
use crate::state::flow::FlowAssignment;
use crate::state::snapshot::Snapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RescueState {
    /// At least one node is in deficit and a route may still exist.
    Searching,
    Balanced,
    /// Deficits remain but no donor can reach any of them.
    Stalled,
}

impl RescueState {
    pub fn is_terminal(self) -> bool {
        self != RescueState::Searching
    }
}

/// A push that has been applied to a copy of the current flows but not yet
/// committed.
struct Candidate {
    donor: NodeId,
    deficit: NodeId,
    path: FlowPath,
    amount: f64,
    flows: FlowAssignment,
    balances: Balances,
}

/// Repair loop that moves surplus to deficit nodes one path at a time.
///
/// Deficit nodes are served in ascending id order and, for each one, donors
/// are tried in ascending id order; the first pair the policy can connect
/// wins. Every push adds `min(need, surplus, bottleneck)` along the path and
/// balances are then recomputed from the whole assignment. A push that would
/// leave the deficit's balance where it is does not count as a route.
pub struct RescueScheduler {
    network: Network,
    policy: Box<dyn PathPolicy>,
    observed: NetFlows,
    seeded_balances: Balances,
    previous_snapshot: Option<Snapshot>,
    current_snapshot: Snapshot,
    state: RescueState,
    pushes: Vec<RescuePush>,
}

impl RescueScheduler {
    /// Nets the observations and seeds the loop with the resulting flows.
    pub fn new(
        network: Network,
        observations: &[Observation],
        policy: Box<dyn PathPolicy>,
    ) -> Result<Self, NetworkError> {
        network.check_observations(observations)?;
        let observed = net_observations(observations);
        let flows = observed.to_assignment();
        Self::seed(network, observed, flows, policy)
    }

    /// Seeds the loop with an already netted assignment.
    pub fn with_flows(
        network: Network,
        flows: FlowAssignment,
        policy: Box<dyn PathPolicy>,
    ) -> Result<Self, NetworkError> {
        Self::seed(network, NetFlows::default(), flows, policy)
    }

    fn seed(
        network: Network,
        observed: NetFlows,
        flows: FlowAssignment,
        policy: Box<dyn PathPolicy>,
    ) -> Result<Self, NetworkError> {
        network.check_flows(&flows)?;

        let balances = compute_balances(&network, &flows);
        let state = Self::classify(&balances);
        let system_total = balances.total();

        info!(
            nodes = network.node_count(),
            links = network.link_count(),
            flows = flows.len(),
            policy = policy.name(),
            deficits = balances.deficits().len(),
            tolerance = network.tolerance(),
            "rescue scheduler seeded"
        );
        if system_total < 0.0 {
            warn!(
                shortfall = -system_total,
                "total demand exceeds total supply, full balance is out of reach"
            );
        }

        Ok(Self {
            network,
            policy,
            observed,
            seeded_balances: balances.clone(),
            previous_snapshot: None,
            current_snapshot: Snapshot::new(0, flows, balances),
            state,
            pushes: Vec::new(),
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn policy(&self) -> &dyn PathPolicy {
        self.policy.as_ref()
    }

    pub fn state(&self) -> RescueState {
        self.state
    }

    pub fn pushes(&self) -> &[RescuePush] {
        &self.pushes
    }

    /// Net observed flow per pair, including pairs that cancel exactly.
    /// Empty when seeded from an assignment.
    pub fn observed(&self) -> &NetFlows {
        &self.observed
    }

    /// Balances before any rescue push.
    pub fn seeded_balances(&self) -> &Balances {
        &self.seeded_balances
    }

    pub fn current_snapshot(&self) -> &Snapshot {
        &self.current_snapshot
    }

    pub fn previous_snapshot(&self) -> &Snapshot {
        self.previous_snapshot
            .as_ref()
            .unwrap_or(&self.current_snapshot)
    }

    fn classify(balances: &Balances) -> RescueState {
        if balances.is_balanced() {
            RescueState::Balanced
        } else {
            RescueState::Searching
        }
    }

    fn find_route(&self) -> Option<Candidate> {
        let balances = self.current_snapshot.balances();
        let flows = self.current_snapshot.flows();
        let donors = balances.surpluses();

        balances.deficits().into_iter().find_map(|(deficit, need)| {
            donors.iter().find_map(|&(donor, surplus)| {
                let path = self.policy.find_path(&self.network, flows, donor, deficit);
                debug!(
                    donor = self.network.name(donor),
                    deficit = self.network.name(deficit),
                    found = path.is_some(),
                    "path search"
                );
                let path = path?;
                let amount = need.min(surplus).min(path.bottleneck());
                self.try_push(donor, deficit, path, amount)
            })
        })
    }

    /// Applies the push to a copy of the flows. Returns `None` when rounding
    /// swallows it and the deficit would not move.
    fn try_push(
        &self,
        donor: NodeId,
        deficit: NodeId,
        path: FlowPath,
        amount: f64,
    ) -> Option<Candidate> {
        let mut flows = self.current_snapshot.flows().clone();
        path.edges()
            .iter()
            .for_each(|(from, to)| flows.add(*from, *to, amount));
        let balances = compute_balances(&self.network, &flows);

        if balances.get(deficit) <= self.current_snapshot.balances().get(deficit) {
            debug!(
                donor = self.network.name(donor),
                deficit = self.network.name(deficit),
                amount,
                "push leaves the deficit unchanged, skipping"
            );
            return None;
        }
        Some(Candidate {
            donor,
            deficit,
            path,
            amount,
            flows,
            balances,
        })
    }

    /// Runs one iteration and returns the resulting state. Terminal states are
    /// sticky.
    pub fn step(&mut self) -> RescueState {
        if self.state.is_terminal() {
            return self.state;
        }

        let Some(candidate) = self.find_route() else {
            let stranded = self
                .current_snapshot
                .balances()
                .deficits()
                .iter()
                .map(|(id, need)| format!("{}={:.3}", self.network.name(*id), need))
                .collect::<Vec<String>>();
            warn!(
                iteration = self.current_snapshot.iteration(),
                deficits = %stranded.join(", "),
                "rescue stalled, no donor can reach the remaining deficits"
            );
            self.state = RescueState::Stalled;
            return self.state;
        };

        let Candidate {
            donor,
            deficit,
            path,
            amount,
            flows,
            balances,
        } = candidate;

        let iteration = self.current_snapshot.iteration() + 1;
        debug!(
            iteration,
            donor = self.network.name(donor),
            deficit = self.network.name(deficit),
            hops = path.len(),
            bottleneck = path.bottleneck(),
            amount,
            "pushed rescue flow"
        );

        let old_snapshot = mem::replace(
            &mut self.current_snapshot,
            Snapshot::new(iteration, flows, balances),
        );
        self.previous_snapshot = Some(old_snapshot);
        self.pushes
            .push(RescuePush::new(iteration, donor, deficit, path, amount));

        self.state = Self::classify(self.current_snapshot.balances());
        if self.state == RescueState::Balanced {
            info!(iteration, "network balanced");
        }
        self.state
    }

    pub fn run(&mut self) -> RescueReport {
        while !self.state.is_terminal() {
            self.step();
        }
        info!(
            state = ?self.state,
            iterations = self.current_snapshot.iteration(),
            pushes = self.pushes.len(),
            "rescue finished"
        );
        self.build_report()
    }

    /// Report of the finished run, `None` while still searching.
    pub fn report(&self) -> Option<RescueReport> {
        self.state.is_terminal().then(|| self.build_report())
    }

    fn build_report(&self) -> RescueReport {
        let balances = self.current_snapshot.balances().clone();
        let status = match self.state {
            RescueState::Balanced => RescueStatus::Balanced,
            _ => RescueStatus::Stalled {
                deficits: balances.deficits(),
            },
        };
        RescueReport {
            status,
            observed: self.observed.clone(),
            seeded_balances: self.seeded_balances.clone(),
            flows: self.current_snapshot.flows().netted(),
            utilization: link_utilization(&self.network, self.current_snapshot.flows()),
            balances,
            pushes: self.pushes.clone(),
            iterations: self.current_snapshot.iteration(),
        }
    }
}
