//! Frame rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use encfm_core::{Charset, Children, ConvertStatus};

use crate::app::{App, AppMode};

/// Computes the visible window `(start, end)` for a list of `total` items
/// so that `selected` is always in view within `max_visible` lines.
fn visible_window(selected: usize, total: usize, max_visible: usize) -> (usize, usize) {
    if total <= max_visible {
        return (0, total);
    }
    let half = max_visible / 2;
    let start = if selected <= half {
        0
    } else if selected + half >= total {
        total.saturating_sub(max_visible)
    } else {
        selected - half
    };
    let end = (start + max_visible).min(total);
    (start, end)
}

/// Main render function — composes the full UI layout each frame.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_path_bar(f, app, chunks[0]);
    render_tree(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);

    match app.mode() {
        AppMode::Browse => {}
        AppMode::PathInput(input) => render_path_input(f, input),
        AppMode::EncodingSelect { selected } => render_encoding_picker(f, app, *selected),
        AppMode::ConfirmConvert { target } => render_confirm(f, app, *target),
        AppMode::Report => render_report(f, app),
    }
}

fn render_path_bar(f: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled("Path: ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.tree().root().display().to_string()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_tree(f: &mut Frame, app: &App, area: Rect) {
    let max_visible = area.height as usize;
    let (start, end) = visible_window(app.cursor(), app.rows().len(), max_visible);

    let mut lines = Vec::with_capacity(end - start);
    for (index, row) in app.rows()[start..end].iter().enumerate() {
        let Some(entry) = app.tree().entry(row.id) else {
            continue;
        };

        let marker = if app.is_marked(row.id) { "*" } else { " " };
        let affordance = if entry.is_dir() {
            match entry.children() {
                Some(Children::Empty) => "  ",
                _ if app.is_open(row.id) => "▾ ",
                _ => "▸ ",
            }
        } else {
            "  "
        };

        let mut spans = vec![
            Span::raw(format!("{marker} {}", "  ".repeat(row.depth))),
            Span::raw(affordance),
        ];
        if entry.is_dir() {
            spans.push(Span::styled(
                entry.name().to_string(),
                Style::default().fg(Color::Blue),
            ));
        } else {
            spans.push(Span::raw(entry.name().to_string()));
            spans.push(Span::styled(
                format!("  {}", entry.annotation()),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let mut line = Line::from(spans);
        if start + index == app.cursor() {
            line = line.style(Style::default().add_modifier(Modifier::REVERSED));
        }
        lines.push(line);
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.status() {
        Some(message) => message.to_string(),
        None => format!(
            "{} marked | space mark  ⏎ open  c convert  p path  r refresh  q quit",
            app.marked_count()
        ),
    };
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_path_input(f: &mut Frame, input: &str) {
    let area = centered_rect(60, 3, f.area());
    f.render_widget(Clear, area);
    let popup = Paragraph::new(Line::from(format!("{input}▏"))).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Go to path (⏎ apply, esc cancel)"),
    );
    f.render_widget(popup, area);
}

fn render_encoding_picker(f: &mut Frame, app: &App, selected: usize) {
    let height = Charset::ALL.len() as u16 + 2;
    let area = centered_rect(30, height, f.area());
    f.render_widget(Clear, area);

    let lines: Vec<Line> = Charset::ALL
        .iter()
        .enumerate()
        .map(|(index, charset)| {
            let line = Line::from(format!(" {} ", charset.label()));
            if index == selected {
                line.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                line
            }
        })
        .collect();

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Convert {} entries to…", app.marked_count())),
    );
    f.render_widget(popup, area);
}

fn render_confirm(f: &mut Frame, app: &App, target: Charset) {
    let area = centered_rect(50, 4, f.area());
    f.render_widget(Clear, area);
    let lines = vec![
        Line::from(format!(
            "Rewrite {} marked entries as {target}?",
            app.marked_count()
        )),
        Line::from("y convert / n cancel").style(Style::default().fg(Color::DarkGray)),
    ];
    let popup = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Convert"));
    f.render_widget(popup, area);
}

fn render_report(f: &mut Frame, app: &App) {
    let Some(report) = app.report() else {
        return;
    };
    let area = centered_rect(70, (report.outcomes.len() as u16 + 3).min(20), f.area());
    f.render_widget(Clear, area);

    let mut lines: Vec<Line> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.status {
            ConvertStatus::Converted { from } => Line::from(vec![
                Span::styled("✓ ", Style::default().fg(Color::Green)),
                Span::raw(format!("{} (from {from})", outcome.name)),
            ]),
            ConvertStatus::SkippedDirectory => Line::from(vec![
                Span::styled("- ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("{} (directory, skipped)", outcome.name)),
            ]),
            ConvertStatus::Failed(err) => Line::from(vec![
                Span::styled("✗ ", Style::default().fg(Color::Red)),
                Span::raw(format!("{}: {err}", outcome.name)),
            ]),
        })
        .collect();
    lines.push(
        Line::from("⏎ close").style(Style::default().fg(Color::DarkGray)),
    );

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Conversion report"),
    );
    f.render_widget(popup, area);
}

/// Centers a `width`-percent by `height`-row rectangle within `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_fits_small_lists() {
        assert_eq!(visible_window(0, 5, 10), (0, 5));
    }

    #[test]
    fn window_follows_cursor() {
        let (start, end) = visible_window(50, 100, 10);
        assert!(start <= 50 && 50 < end);
        assert_eq!(end - start, 10);
    }

    #[test]
    fn window_clamps_at_the_end() {
        assert_eq!(visible_window(99, 100, 10), (90, 100));
    }

    #[test]
    fn window_clamps_at_the_start() {
        assert_eq!(visible_window(0, 100, 10), (0, 10));
    }
}
