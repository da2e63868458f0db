//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::machine::MachineState;
use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(frame.area());

    // Left side: listing, machine state and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_listing(frame, left_chunks[0], app);
    draw_state(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: registers and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_registers(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw the program listing around the current label.
fn draw_listing(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let listing = app.get_listing();
    let visible = (area.height as usize).saturating_sub(2);
    let current = listing.iter().position(|(_, _, is_current)| *is_current).unwrap_or(0);
    let start = current.saturating_sub(visible / 2);

    let items: Vec<ListItem> = listing
        .iter()
        .skip(start)
        .take(visible)
        .map(|(label, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(label) { "●" } else { " " };
            let text = format!("{}{}: {}", prefix, label, instr);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(label) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}", bp, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Program ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw label, step count and run state.
fn draw_state(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let machine = &app.machine;
    let defined = machine.current_instruction().is_some();

    let content = vec![
        Line::from(vec![
            Span::raw("Label: "),
            Span::styled(
                format!("{}", machine.label),
                if defined {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Red)
                },
            ),
            Span::raw("   Start: "),
            Span::raw(format!("{}", machine.start_label())),
        ]),
        Line::from(vec![
            Span::raw("Steps: "),
            Span::styled(format!("{}", machine.steps), Style::default().fg(Color::Cyan)),
            Span::raw("   State: "),
            Span::styled(format!("{:?}", machine.state), state_style(machine.state)),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Machine ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw register view.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = app.machine.registers.as_slice();
    let touched = app.machine.current_instruction().and_then(|i| i.register());
    let visible_rows = (area.height as usize).saturating_sub(2);
    let start = app.reg_scroll.min(regs.len());
    let end = (start + visible_rows).min(regs.len());

    let items: Vec<ListItem> = (start..end)
        .map(|idx| {
            let text = format!("r{:<4} {}", idx, regs[idx]);

            let style = if touched == Some(idx) {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if !regs[idx].is_zero() {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll registers  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}

/// Color for a run state.
fn state_style(state: MachineState) -> Style {
    match state {
        MachineState::Running => Style::default().fg(Color::Green),
        MachineState::ProperHalt => Style::default().fg(Color::Cyan),
        MachineState::ErroneousHalt => Style::default().fg(Color::Red),
    }
}
