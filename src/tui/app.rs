use crate::rescue::scheduler::{RescueScheduler, RescueState};

pub struct App {
    pub scheduler: RescueScheduler,
    pub running: bool,
    scenario: String,
}

impl App {
    pub fn new(scheduler: RescueScheduler, scenario: impl Into<String>) -> Self {
        Self {
            scheduler,
            running: true,
            scenario: scenario.into(),
        }
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn step(&mut self) -> RescueState {
        self.scheduler.step()
    }

    pub fn finish(&mut self) -> RescueState {
        self.scheduler.run();
        self.scheduler.state()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        ratatui::restore();
    }
}
