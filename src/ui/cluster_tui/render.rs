use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
};

use super::app::{ClusterApp, View};
use super::widgets::{capability_line, format_mb, state_color};
use crate::core::cluster::topology::ROOT_LABEL;

/// Main render function
pub fn render_ui(frame: &mut Frame, app: &ClusterApp) {
    let area = frame.area();

    let errors = app.snapshot.errors();
    let error_height = if errors.is_empty() {
        0
    } else {
        (errors.len() + 2) as u16
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),            // Cluster metrics
            Constraint::Length(error_height), // Source errors
            Constraint::Length(1),            // Tabs
            Constraint::Min(5),               // Main panel + details
            Constraint::Length(1),            // Footer
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    if !errors.is_empty() {
        render_errors(frame, chunks[1], &errors);
    }
    render_tabs(frame, chunks[2], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[3]);

    match app.view {
        View::List => render_node_table(frame, body[0], app),
        View::Topology => render_topology(frame, body[0], app),
    }
    render_details(frame, body[1], app);
    render_footer(frame, chunks[4], app);

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &ClusterApp) {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let line = match &app.snapshot.metrics {
        Some(m) => Line::from(vec![
            Span::styled("Nodes: ", bold),
            Span::styled(
                format!("{} active", m.active_nodes),
                Style::default().fg(Color::Green),
            ),
            Span::raw(format!(
                " / {} total, {} unhealthy, {} lost  ",
                m.total_nodes, m.unhealthy_nodes, m.lost_nodes
            )),
            Span::styled("Apps: ", bold),
            Span::raw(format!(
                "{} running, {} pending  ",
                m.apps_running, m.apps_pending
            )),
            Span::styled("Memory: ", bold),
            Span::raw(format!(
                "{} / {}  ",
                format_mb(m.allocated_mb as f64),
                format_mb(m.total_mb as f64)
            )),
            Span::styled("vCores: ", bold),
            Span::raw(format!(
                "{} / {}",
                m.allocated_virtual_cores, m.total_virtual_cores
            )),
        ]),
        None => Line::from(Span::styled(
            "Waiting for cluster metrics...",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let updated = if app.snapshot.timestamp > 0 {
        chrono::DateTime::from_timestamp(app.snapshot.timestamp, 0)
            .map(|t| {
                t.with_timezone(&chrono::Local)
                    .format("%H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "-".to_string())
    } else {
        "-".to_string()
    };

    let block = Block::default()
        .title(format!(
            " Cluster │ every {:.1}s │ updated {} ",
            app.interval_ms as f64 / 1000.0,
            updated
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_errors(frame: &mut Frame, area: Rect, errors: &[(&'static str, &str)]) {
    let lines: Vec<Line> = errors
        .iter()
        .map(|(source, error)| {
            Line::from(vec![
                Span::styled(
                    format!("⚠ {}: ", source),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::raw(error.to_string()),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" Stale data ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &ClusterApp) {
    let titles = [View::List, View::Topology].map(View::title);
    let selected = match app.view {
        View::List => 0,
        View::Topology => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_node_table(frame: &mut Frame, area: Rect, app: &ClusterApp) {
    let block = Block::default()
        .title(format!(" Nodes ({}) ", app.topology.len()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 2 {
        return;
    }

    if app.topology.is_empty() {
        let text = if app.snapshot.nodes_status.generation == 0 {
            "Waiting for node inventory..."
        } else {
            "No nodes reported"
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let header = Row::new(vec![
        Cell::from("Node").style(bold),
        Cell::from("State").style(bold),
        Cell::from("Containers").style(bold),
        Cell::from("Memory used").style(bold),
        Cell::from("Modules").style(bold),
    ])
    .height(1);

    let selected = app.topology.selected_index();
    let rows: Vec<Row> = app
        .topology
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let style = if Some(i) == selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(node.id.clone()),
                Cell::from(node.state.clone()).style(Style::default().fg(state_color(&node.state))),
                Cell::from(node.num_containers.to_string()),
                Cell::from(format!(
                    "{} / {}",
                    format_mb(node.used_memory_mb),
                    format_mb(node.used_memory_mb + node.avail_memory_mb)
                )),
                Cell::from(capability_line(&node.flags)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(18),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths).header(header).column_spacing(1);
    frame.render_widget(table, inner);
}

fn render_topology(frame: &mut Frame, area: Rect, app: &ClusterApp) {
    let block = Block::default()
        .title(" Topology ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let graph = app.topology.graph();
    let selected = app.topology.selected_id();

    let mut lines = Vec::with_capacity(graph.nodes.len());
    lines.push(Line::from(Span::styled(
        format!("◉ {}", ROOT_LABEL),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));

    let last = graph.edges.len().saturating_sub(1);
    for (i, edge) in graph.edges.iter().enumerate() {
        let branch = if i == last { "└── " } else { "├── " };
        let label = graph
            .nodes
            .iter()
            .find(|n| n.id == edge.to)
            .map(|n| n.label.as_str())
            .unwrap_or(edge.to.as_str());

        let style = if selected == Some(edge.to.as_str()) {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default()
        };

        let mut spans = vec![
            Span::styled(branch, Style::default().fg(Color::DarkGray)),
            Span::styled(format!("□ {}", label), style),
        ];
        if let Some(node) = app.topology.nodes().get(i) {
            spans.push(Span::raw("  "));
            spans.extend(capability_line(&node.flags).spans);
        }
        lines.push(Line::from(spans));
    }

    // Keep the selected node visible in tall clusters
    let scroll = app
        .topology
        .selected_index()
        .map(|i| (i + 2).saturating_sub(inner.height as usize) as u16)
        .unwrap_or(0);

    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn render_details(frame: &mut Frame, area: Rect, app: &ClusterApp) {
    let block = Block::default()
        .title(" Node details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let Some(node) = app.selected_node() else {
        let hint = Paragraph::new("Select a node with ↑/↓")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let label = |name: &str| Span::styled(format!("{:<11}", name), Style::default().fg(Color::Cyan));

    let mut lines = vec![
        Line::from(vec![label("Id"), Span::raw(node.id.clone())]),
        Line::from(vec![label("Host"), Span::raw(node.host_name.clone())]),
        Line::from(vec![label("Rack"), Span::raw(node.rack.clone())]),
        Line::from(vec![
            label("State"),
            Span::styled(
                node.state.clone(),
                Style::default().fg(state_color(&node.state)),
            ),
        ]),
        Line::from(vec![
            label("Containers"),
            Span::raw(node.num_containers.to_string()),
        ]),
        Line::from(vec![
            label("Memory"),
            Span::raw(format!(
                "{} used, {} free",
                format_mb(node.used_memory_mb),
                format_mb(node.avail_memory_mb)
            )),
        ]),
        Line::from(vec![label("Modules"), Span::raw(node.flags.modules_label())]),
        Line::from({
            let mut spans = vec![label("Usage")];
            spans.extend(capability_line(&node.flags).spans);
            spans
        }),
    ];

    if !node.health_report.is_empty() {
        lines.push(Line::from(vec![
            label("Health"),
            Span::raw(node.health_report.clone()),
        ]));
    }

    lines.push(Line::from(""));
    let power_style = if app.selected_power().is_some() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(vec![
        label("PDU"),
        Span::styled(app.power_label(), power_style),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &ClusterApp) {
    let view = match app.view {
        View::List => "Topology",
        View::Topology => "List",
    };
    let help = format!(
        " q: Quit │ ?: Help │ Tab: {} │ ↑↓: Select │ Esc: Deselect │ r: Refresh ",
        view
    );
    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = r#"
    Cluster Monitor - Help

    Keyboard Shortcuts:
    ─────────────────────────────────────
    q           Quit the application
    ? / h       Toggle this help screen
    Tab         Switch List / Topology
    ↑ / k       Select previous node
    ↓ / j       Select next node
    Esc         Clear selection
    r           Refresh now

    Badges: CPU* in use, CPU present, --- absent

    Press any key to close this help
    "#;

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::DarkGray));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(paragraph, popup_area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
