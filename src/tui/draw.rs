use crate::analysis::utilization::link_utilization;
use crate::graph::node::NodeId;
use crate::rescue::scheduler::RescueState;
use crate::state::balance::TOLERANCE;
use crate::tui::app::App;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::Color::White;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, List, ListItem, Padding, Paragraph, Row, Table};

pub fn draw_app(frame: &mut Frame, app: &App) {
    let node_count = app.scheduler.network().node_count();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length((node_count + 3) as u16),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[3]);

    frame.render_widget(build_header(app), chunks[0]);
    frame.render_widget(build_node_table(app), chunks[2]);
    frame.render_widget(build_link_table(app), lower[0]);
    frame.render_widget(build_push_list(app), lower[1]);
    frame.render_widget(build_footer(), chunks[4]);
}

fn util_style(utilization: f64) -> Style {
    if utilization < 0.8 {
        Style::default().fg(Color::Green)
    } else if utilization < 1.0 - TOLERANCE {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Red)
    }
}

fn balance_style(balance: f64) -> Style {
    if balance < -TOLERANCE {
        Style::default().fg(Color::Red)
    } else if balance > TOLERANCE {
        Style::default().fg(Color::Green)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    }
}

fn state_style(state: RescueState) -> Style {
    match state {
        RescueState::Searching => Style::default().yellow().bold(),
        RescueState::Balanced => Style::default().green().bold(),
        RescueState::Stalled => Style::default().red().bold(),
    }
}

fn build_header(app: &'_ App) -> Block<'_> {
    let scheduler = &app.scheduler;
    let dim = Style::default().add_modifier(Modifier::DIM);
    Block::new()
        .title(Line::from(vec![
            Span::raw(" Gridrescue ").style(Style::default().bold().cyan()),
            Span::raw("-").style(dim),
            Span::raw(format!(" {} / {} ", app.scenario(), scheduler.policy().name())).style(dim),
            Span::raw("-").style(dim),
            Span::raw(" Iteration: ").style(dim),
            Span::raw(format!("{}", scheduler.current_snapshot().iteration()))
                .style(Style::default().bold()),
            Span::raw(" "),
            Span::raw(format!("{:?}", scheduler.state())).style(state_style(scheduler.state())),
            Span::raw(" "),
        ]))
        .title_alignment(Alignment::Center)
}

fn build_node_table(app: &'_ App) -> Table<'_> {
    let scheduler = &app.scheduler;
    let network = scheduler.network();
    let balances = scheduler.current_snapshot().balances();
    let previous = scheduler.previous_snapshot().balances();

    Table::new(
        network.nodes().iter().map(|node| {
            let balance = balances.get(node.id());
            let delta = balance - previous.get(node.id());
            let status = if balance < -TOLERANCE {
                Span::raw("SHORT").style(Style::default().red().bold())
            } else {
                Span::raw("ok").style(Style::default().add_modifier(Modifier::DIM))
            };
            let delta_cell = if delta.abs() > TOLERANCE {
                Cell::from(format!("{:>+7.2}", delta)).style(Style::default().bold())
            } else {
                Cell::from("")
            };

            Row::new(vec![
                Cell::from(node.id().index().to_string()),
                Cell::from(node.name()),
                Cell::from(format!("{:>7.2}", node.supply())),
                Cell::from(format!("{:>7.2}", node.demand())),
                Cell::from(format!("{:>7.2}", balance)).style(balance_style(balance)),
                delta_cell,
                Cell::from(status),
            ])
        }),
        [
            Constraint::Length(4),
            Constraint::Length(16),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(7),
        ],
    )
    .header(
        Row::new([
            Cell::from("ID"),
            Cell::from("Name"),
            Cell::from(" Supply"),
            Cell::from(" Demand"),
            Cell::from("Balance"),
            Cell::from("  Delta"),
            Cell::from("Status"),
        ])
        .style(Style::default().bg(Color::DarkGray).fg(White)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::from(" Nodes ").style(Style::default().bold()),
            ]))
            .padding(Padding::horizontal(1)),
    )
}

fn build_link_table(app: &'_ App) -> Table<'_> {
    let scheduler = &app.scheduler;
    let network = scheduler.network();
    let mut rows = link_utilization(network, scheduler.current_snapshot().flows());
    rows.sort_by(|a, b| b.ratio().total_cmp(&a.ratio()));

    Table::new(
        rows.into_iter().map(|usage| {
            Row::new(vec![
                Cell::from(format!(
                    "{} - {}",
                    network.name(usage.a()),
                    network.name(usage.b())
                )),
                Cell::from(format!("{:>6.2}", usage.forward())),
                Cell::from(format!("{:>6.2}", usage.backward())),
                Cell::from(format!("{:>6.2}", usage.capacity())),
                Cell::from(format!("{:>6.2}", usage.ratio())).style(util_style(usage.ratio())),
            ])
        }),
        [
            Constraint::Length(24),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new([
            Cell::from("Link"),
            Cell::from("   Fwd"),
            Cell::from("   Bwd"),
            Cell::from("   Cap"),
            Cell::from("  Util"),
        ])
        .style(Style::default().bg(Color::DarkGray).fg(White)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::from(" Links ").style(Style::default().bold()),
            ]))
            .padding(Padding::horizontal(1)),
    )
}

fn path_label(app: &App, nodes: &[NodeId]) -> String {
    let network = app.scheduler.network();
    nodes
        .iter()
        .map(|id| network.name(*id))
        .collect::<Vec<&str>>()
        .join(" > ")
}

fn build_push_list(app: &'_ App) -> List<'_> {
    let items = app
        .scheduler
        .pushes()
        .iter()
        .rev()
        .map(|push| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:>3} ", push.iteration()))
                    .style(Style::default().add_modifier(Modifier::DIM)),
                Span::raw(format!("{:>6.2} ", push.amount())).style(Style::default().bold()),
                Span::raw(path_label(app, &push.path().nodes())),
            ]))
        })
        .collect::<Vec<ListItem>>();

    List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::from(" Rescue pushes ").style(Style::default().bold()),
            ]))
            .padding(Padding::horizontal(1)),
    )
}

fn build_footer() -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        Span::raw(" space ").style(Style::default().bold()),
        Span::raw("step  "),
        Span::raw(" r ").style(Style::default().bold()),
        Span::raw("run to end  "),
        Span::raw(" q ").style(Style::default().bold()),
        Span::raw("quit"),
    ]))
    .style(Style::default().add_modifier(Modifier::DIM))
}
