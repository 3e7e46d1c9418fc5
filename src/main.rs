use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use gridrescue::analysis::netting::Observation;
use gridrescue::graph::network::Network;
use gridrescue::rescue::policy::{DirectTransfer, FirstFeasiblePath, PathPolicy};
use gridrescue::rescue::report::{RescueReport, RescueStatus};
use gridrescue::rescue::scheduler::RescueScheduler;
use gridrescue::scenario::basic::BasicScenario;
use gridrescue::scenario::bottleneck::BottleneckScenario;
use gridrescue::scenario::random::RandomScenario;
use gridrescue::scenario::scenario::Scenario;
use gridrescue::tui::app::App;
use gridrescue::tui::draw::draw_app;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScenarioKind {
    Basic,
    Bottleneck,
    Random,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyKind {
    /// Breadth-first search over links with remaining headroom
    FirstFeasible,
    /// Ignore links and move surplus straight to the deficit
    Direct,
}

/// Balance supply and demand across a capacity-limited network.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[arg(long, value_enum, default_value_t = ScenarioKind::Basic)]
    scenario: ScenarioKind,

    /// Seed for the random scenario
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Node count for the random scenario
    #[arg(long, default_value_t = 12)]
    nodes: usize,

    #[arg(long, value_enum, default_value_t = PolicyKind::FirstFeasible)]
    policy: PolicyKind,

    /// Run to completion and print the plan instead of opening the TUI
    #[arg(long)]
    headless: bool,

    /// Log destination while the TUI owns the terminal
    #[arg(long, default_value = "gridrescue.log")]
    log_file: PathBuf,
}

fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.headless {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
        return None;
    }

    let dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file = cli
        .log_file
        .file_name()
        .map(|f| f.to_os_string())
        .unwrap_or_else(|| "gridrescue.log".into());
    let appender = tracing_appender::rolling::never(dir, file);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Some(guard)
}

fn load(cli: &Cli) -> Result<(String, Network, Vec<Observation>)> {
    let scenario: Box<dyn Scenario> = match cli.scenario {
        ScenarioKind::Basic => Box::new(BasicScenario),
        ScenarioKind::Bottleneck => Box::new(BottleneckScenario),
        ScenarioKind::Random => Box::new(RandomScenario::new(cli.seed, cli.nodes)),
    };
    let (network, observations) = scenario
        .build()
        .with_context(|| format!("building scenario `{}`", scenario.name()))?;
    Ok((scenario.name().to_string(), network, observations))
}

fn policy(kind: PolicyKind) -> Box<dyn PathPolicy> {
    match kind {
        PolicyKind::FirstFeasible => Box::new(FirstFeasiblePath),
        PolicyKind::Direct => Box::new(DirectTransfer),
    }
}

fn print_report(scheduler: &RescueScheduler, report: &RescueReport) {
    let network = scheduler.network();
    let name = move |id| network.name(id);

    match &report.status {
        RescueStatus::Balanced => {
            println!("status: balanced after {} iterations", report.iterations)
        }
        RescueStatus::Stalled { deficits } => {
            println!("status: stalled after {} iterations", report.iterations);
            for (id, need) in deficits {
                println!("  {} short by {:.2}", name(*id), need);
            }
        }
    }

    if !report.observed.is_empty() {
        println!("\nobserved net flows:");
        for pair in report.observed.iter() {
            match pair.dominant() {
                Some((from, to, amount)) => {
                    println!("  {} -> {}: {:.2}", name(from), name(to), amount)
                }
                None => println!("  {} <-> {}: no net flow", name(pair.a()), name(pair.b())),
            }
        }
    }

    println!("\nbalances:");
    println!("  {:<16} {:>8} {:>8}", "", "seeded", "final");
    for (id, balance) in report.balances.iter() {
        let seeded = report.seeded_balances.get(id);
        println!("  {:<16} {:>8.2} {:>8.2}", name(id), seeded, balance);
    }

    println!("\nnet flows after rescue:");
    for (from, to, amount) in report.flows.iter() {
        println!("  {} -> {}: {:.2}", name(from), name(to), amount);
    }

    println!("\nlinks:");
    for usage in &report.utilization {
        println!(
            "  {} - {}: fwd {:.2} bwd {:.2} cap {:.2} ({:.0}%)",
            name(usage.a()),
            name(usage.b()),
            usage.forward(),
            usage.backward(),
            usage.capacity(),
            usage.ratio() * 100.0
        );
    }

    if !report.pushes.is_empty() {
        println!("\nrescue pushes:");
        for push in &report.pushes {
            let route = push
                .path()
                .nodes()
                .into_iter()
                .map(name)
                .collect::<Vec<&str>>()
                .join(" -> ");
            println!("  #{} {:.2} via {}", push.iteration(), push.amount(), route);
        }
    }
}

fn run_tui(mut app: App) -> Result<()> {
    let mut terminal = ratatui::init();

    while app.running {
        terminal.draw(|frame| draw_app(frame, &app))?;

        if crossterm::event::poll(Duration::from_millis(16))? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') => app.running = false,
                    KeyCode::Char(' ') => {
                        app.step();
                    }
                    KeyCode::Char('r') => {
                        app.finish();
                    }
                    _ => continue,
                },
                _ => continue,
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli);

    let (scenario, network, observations) = load(&cli)?;
    let mut scheduler = RescueScheduler::new(network, &observations, policy(cli.policy))
        .context("seeding rescue scheduler")?;

    if cli.headless {
        let report = scheduler.run();
        print_report(&scheduler, &report);
        return Ok(());
    }

    run_tui(App::new(scheduler, scenario))
}
