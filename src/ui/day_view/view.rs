use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::geometry::DAY_ROWS;

use super::app::{AppState, DeleteConfirmState, StatusKind};
use super::editor::{EditorKind, EditorState};
use super::model::{self, TaskBlock};

const GUTTER_WIDTH: u16 = 6;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_NOW: Color = Color::Rgb(255, 107, 107);
const COLOR_BORDER: Color = Color::Rgb(92, 126, 166);

/// Block fill colors, assigned round-robin by visible order
const BLOCK_COLORS: &[Color] = &[
    Color::Rgb(58, 92, 140),
    Color::Rgb(66, 110, 84),
    Color::Rgb(120, 86, 56),
    Color::Rgb(100, 72, 128),
    Color::Rgb(54, 108, 116),
];

pub fn render(frame: &mut Frame, app: &mut AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(area);
    let header = chunks[0];
    let main = chunks[1];
    let footer = chunks[2];

    render_header(frame, app, header);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(main);
    render_timeline(frame, app, columns[0]);
    render_task_list(frame, app, columns[1]);

    render_footer(frame, app, footer);

    if let Some(editor) = app.editor.as_ref() {
        render_editor_modal(frame, area, editor);
    }
    if let Some(state) = app.delete_confirm.as_ref() {
        render_delete_confirm_modal(frame, area, state);
    }
}

fn render_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let date_label = app.date.format("%A, %Y-%m-%d").to_string();
    let count = app.visible_ids.len();
    let line = Line::from(vec![
        Span::styled(
            date_label,
            Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {count} task(s)"),
            Style::default().fg(COLOR_MUTED),
        ),
    ]);
    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_timeline(frame: &mut Frame, app: &mut AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title("Timeline");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // The app needs the inner area and scroll to map mouse rows back to
    // timeline rows.
    app.timeline_area = inner;
    app.clamp_scroll(inner.height);

    let blocks = model::layout_blocks(&app.tasks, app.date, DAY_ROWS);
    let now_row = model::now_row(app.date, DAY_ROWS);
    let content_width = inner.width.saturating_sub(GUTTER_WIDTH) as usize;

    let mut lines = Vec::with_capacity(DAY_ROWS as usize);
    for row in 0..DAY_ROWS {
        lines.push(timeline_row(app, &blocks, row, now_row, content_width));
    }

    let widget = Paragraph::new(lines).scroll((app.scroll, 0));
    frame.render_widget(widget, inner);
}

fn timeline_row(
    app: &AppState,
    blocks: &[TaskBlock],
    row: u16,
    now_row: Option<u16>,
    content_width: usize,
) -> Line<'static> {
    let is_now = now_row == Some(row);
    // Hour labels land on every other row of the 48-row column
    let gutter = if row % 2 == 0 {
        format!("{:02}:00 ", row / 2)
    } else {
        " ".repeat(GUTTER_WIDTH as usize)
    };
    let gutter_style = if is_now {
        Style::default().fg(COLOR_NOW).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_MUTED_DARK)
    };

    let covering = blocks
        .iter()
        .enumerate()
        .rev()
        .find(|(_, block)| row >= block.top && row < block.top + block.height);

    let content = match covering {
        Some((idx, block)) => {
            let task_name = app
                .tasks
                .find(&block.task_id)
                .map(|task| task.name.clone())
                .unwrap_or_default();
            let label = if row == block.top {
                format!(" {task_name}")
            } else {
                String::new()
            };
            let mut text: String = label.chars().take(content_width).collect();
            let pad = content_width.saturating_sub(text.chars().count());
            text.push_str(&" ".repeat(pad));

            let selected = app.selected.as_deref() == Some(block.task_id.as_str());
            let mut style = Style::default()
                .fg(COLOR_TEXT)
                .bg(BLOCK_COLORS[idx % BLOCK_COLORS.len()]);
            if selected {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            if is_now {
                style = style.fg(COLOR_NOW);
            }
            Span::styled(text, style)
        }
        None => {
            let fill = if is_now { "─" } else if row % 2 == 0 { "┄" } else { " " };
            let text = fill.repeat(content_width);
            let style = if is_now {
                Style::default().fg(COLOR_NOW)
            } else {
                Style::default().fg(COLOR_BG_MUTED)
            };
            Span::styled(text, style)
        }
    };

    Line::from(vec![Span::styled(gutter, gutter_style), content])
}

fn render_task_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title("Tasks");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.visible_ids.is_empty() {
        let widget = Paragraph::new(Line::from(Span::styled(
            "No tasks. Press 'a' to add one, or click the timeline.",
            Style::default().fg(COLOR_MUTED),
        )));
        frame.render_widget(widget, inner);
        return;
    }

    let mut lines = Vec::new();
    for id in &app.visible_ids {
        let Some(task) = app.tasks.find(id) else {
            continue;
        };
        let selected = app.selected.as_deref() == Some(id.as_str());
        let marker = if selected { "> " } else { "  " };
        let interval = format!(
            "{}-{}",
            task.start_time.format("%H:%M"),
            task.end_time.format("%H:%M")
        );
        let style = if selected {
            Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_TEXT)
        };
        lines.push(Line::from(vec![
            Span::styled(marker.to_string(), style),
            Span::styled(interval, Style::default().fg(COLOR_INFO)),
            Span::raw("  "),
            Span::styled(task.name.clone(), style),
        ]));
    }
    let widget = Paragraph::new(lines);
    frame.render_widget(widget, inner);
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut lines = Vec::new();
    if let Some((message, kind)) = app.status_line() {
        let color = match kind {
            StatusKind::Error => COLOR_ERROR,
            StatusKind::Info => COLOR_INFO,
        };
        lines.push(Line::from(Span::styled(message, Style::default().fg(color))));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "a add  e edit  d delete  j/k select  h/l day  t today  drag to move/resize  q quit",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_editor_modal(frame: &mut Frame, area: Rect, editor: &EditorState) {
    let title = match editor.kind() {
        EditorKind::NewTask => "New Task",
        EditorKind::EditTask => "Edit Task",
    };
    let height = (editor.fields().len() as u16) + 4;
    let modal = centered_rect(area, 44, height);
    frame.render_widget(Clear, modal);

    let mut lines = Vec::new();
    for (idx, field) in editor.fields().iter().enumerate() {
        let active = idx == editor.active_index();
        let label_style = if active {
            Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        let cursor = if active { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>6}: ", field.label), label_style),
            Span::styled(
                format!("{}{}", field.value, cursor),
                Style::default().fg(COLOR_TEXT),
            ),
        ]));
    }
    lines.push(Line::from(""));
    match editor.error() {
        Some(error) => lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(COLOR_ERROR),
        ))),
        None => lines.push(Line::from(Span::styled(
            "Enter next/submit  Tab fields  Esc cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        ))),
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER))
            .title(title),
    );
    frame.render_widget(widget, modal);
}

fn render_delete_confirm_modal(frame: &mut Frame, area: Rect, state: &DeleteConfirmState) {
    let modal = centered_rect(area, 44, 5);
    frame.render_widget(Clear, modal);

    let lines = vec![
        Line::from(Span::styled(
            format!("Delete '{}'?", state.name),
            Style::default().fg(COLOR_TEXT),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "y/Enter delete  Esc cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];
    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_ERROR))
            .title("Confirm"),
    );
    frame.render_widget(widget, modal);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Prefill times for the editor from the selection, or a default morning slot
pub fn editor_prefill(app: &AppState) -> (i64, i64) {
    if let Some(task) = app.selected.as_deref().and_then(|id| app.tasks.find(id)) {
        if let Some((start, end)) = crate::geometry::clip_to_day(task, app.date) {
            return (start as i64, end as i64);
        }
    }
    (9 * 60, 10 * 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_the_area() {
        let area = Rect::new(0, 0, 80, 24);
        let modal = centered_rect(area, 44, 8);
        assert!(modal.x >= area.x && modal.right() <= area.right());
        assert!(modal.y >= area.y && modal.bottom() <= area.bottom());

        // Never larger than the terminal
        let tiny = centered_rect(Rect::new(0, 0, 20, 4), 44, 8);
        assert_eq!(tiny.width, 20);
        assert_eq!(tiny.height, 4);
    }
}
