use std::io;
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use crate::config::Config;
use crate::drag::{DragAction, DragState};
use crate::error::Result;
use crate::events::EventSink;
use crate::geometry::{offset_to_minutes, DAY_ROWS};
use crate::storage::Storage;
use crate::task::TaskSet;

use super::actions::{self, ActionOutcome};
use super::editor::{EditorAction, EditorKind, EditorState};
use super::model::{self, TimelineHit};
use super::view;

const EVENT_POLL_MS: u64 = 120;
const TICK_MS: u64 = 1000;

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

pub(crate) struct DeleteConfirmState {
    pub(crate) task_id: String,
    pub(crate) name: String,
}

pub struct AppState {
    pub(crate) tasks: TaskSet,
    pub(crate) date: NaiveDate,
    pub(crate) visible_ids: Vec<String>,
    pub(crate) selected: Option<String>,
    pub(crate) editor: Option<EditorState>,
    pub(crate) delete_confirm: Option<DeleteConfirmState>,
    pub(crate) scroll: u16,
    pub(crate) timeline_area: Rect,
    drag: DragState,
    status_message: Option<String>,
    info_message: Option<String>,
    storage: Storage,
    config: Config,
    sink: Option<EventSink>,
}

impl AppState {
    fn new(storage: Storage, config: Config, date: NaiveDate, sink: Option<EventSink>) -> Self {
        let tasks = storage.load();
        let mut app = Self {
            tasks,
            date,
            visible_ids: Vec::new(),
            selected: None,
            editor: None,
            delete_confirm: None,
            scroll: 0,
            timeline_area: Rect::default(),
            drag: DragState::Idle,
            status_message: None,
            info_message: None,
            storage,
            config,
            sink,
        };
        app.refresh_visible();
        app
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(info) = self.info_message.as_ref() {
            return Some((info.clone(), StatusKind::Info));
        }
        None
    }

    pub(crate) fn clamp_scroll(&mut self, viewport_rows: u16) {
        let max = DAY_ROWS.saturating_sub(viewport_rows.max(1));
        self.scroll = self.scroll.min(max);
    }

    fn refresh_visible(&mut self) {
        self.visible_ids = model::day_task_ids(&self.tasks, self.date);
        if let Some(selected) = self.selected.as_deref() {
            if !self.visible_ids.iter().any(|id| id == selected) {
                self.selected = None;
            }
        }
    }

    fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.selected = None;
        self.drag.finish();
        self.refresh_visible();
    }

    fn apply_outcome(&mut self, outcome: ActionOutcome) {
        if !outcome.message.is_empty() {
            self.info_message = Some(outcome.message);
        }
        self.status_message = None;
        if let Some(id) = outcome.task_id {
            self.selected = Some(id);
        }
        self.refresh_visible();
    }

    fn report_error(&mut self, err: crate::error::Error) {
        self.status_message = Some(err.to_string());
        self.info_message = None;
    }

    /// Map an absolute mouse position to a row of the timeline column
    fn timeline_row(&self, column: u16, row: u16) -> Option<u16> {
        let area = self.timeline_area;
        if area.width == 0
            || column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }
        let timeline_row = row - area.y + self.scroll;
        (timeline_row < DAY_ROWS).then_some(timeline_row)
    }
}

pub fn run(storage: Storage, config: Config, date: NaiveDate, sink: Option<EventSink>) -> Result<()> {
    let mut app = AppState::new(storage, config, date, sink);
    run_terminal(&mut app)
}

fn run_terminal(app: &mut AppState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let mut dirty = true;
    let mut last_tick = Instant::now();
    loop {
        // The current-time indicator advances without input, so redraw on a
        // fixed tick as well as on events.
        if last_tick.elapsed() >= Duration::from_millis(TICK_MS) {
            last_tick = Instant::now();
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Mouse(mouse) => {
                    handle_mouse(app, mouse);
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Returns true when the app should quit
fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if app.editor.is_some() {
        handle_editor_key(app, key);
        return false;
    }
    if app.delete_confirm.is_some() {
        handle_delete_confirm_key(app, key);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            app.selected = model::step_selection(&app.visible_ids, app.selected.as_deref(), 1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.selected = model::step_selection(&app.visible_ids, app.selected.as_deref(), -1);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.set_date(app.date - ChronoDuration::days(1));
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.set_date(app.date + ChronoDuration::days(1));
        }
        KeyCode::Char('t') => {
            app.set_date(Local::now().date_naive());
        }
        KeyCode::Char('a') => {
            let (start, end) = view::editor_prefill(app);
            app.editor = Some(EditorState::new_task(start, end));
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(task) = app.selected.as_deref().and_then(|id| app.tasks.find(id)) {
                if let Some((start, end)) = crate::geometry::clip_to_day(task, app.date) {
                    app.editor = Some(EditorState::edit_task(task, start as i64, end as i64));
                }
            }
        }
        KeyCode::Char('d') => {
            if let Some(task) = app.selected.as_deref().and_then(|id| app.tasks.find(id)) {
                app.delete_confirm = Some(DeleteConfirmState {
                    task_id: task.id.clone(),
                    name: task.name.clone(),
                });
            }
        }
        KeyCode::PageDown => {
            app.scroll = app.scroll.saturating_add(4);
        }
        KeyCode::PageUp => {
            app.scroll = app.scroll.saturating_sub(4);
        }
        KeyCode::Esc => {
            app.status_message = None;
            app.info_message = None;
        }
        _ => {}
    }
    false
}

fn handle_editor_key(app: &mut AppState, key: KeyEvent) {
    let Some(editor) = app.editor.as_mut() else {
        return;
    };
    match editor.handle_key(key) {
        EditorAction::None => {}
        EditorAction::Cancel => {
            app.editor = None;
        }
        EditorAction::Submit => {
            let submit = match editor.build_submit() {
                Ok(submit) => submit,
                Err(err) => {
                    editor.set_error(err);
                    return;
                }
            };
            let result = match (editor.kind(), editor.task_id().map(str::to_string)) {
                (EditorKind::EditTask, Some(task_id)) => actions::update_task(
                    &mut app.tasks,
                    &app.storage,
                    app.sink.as_mut(),
                    app.date,
                    &task_id,
                    &submit,
                ),
                _ => actions::create_task(
                    &mut app.tasks,
                    &app.storage,
                    app.sink.as_mut(),
                    app.date,
                    &submit,
                ),
            };
            match result {
                Ok(outcome) => {
                    app.editor = None;
                    app.apply_outcome(outcome);
                }
                Err(err) => {
                    if let Some(editor) = app.editor.as_mut() {
                        editor.set_error(err.to_string());
                    }
                }
            }
        }
    }
}

fn handle_delete_confirm_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            if let Some(state) = app.delete_confirm.take() {
                match actions::delete_task(
                    &mut app.tasks,
                    &app.storage,
                    app.sink.as_mut(),
                    &state.task_id,
                ) {
                    Ok(outcome) => app.apply_outcome(outcome),
                    Err(err) => app.report_error(err),
                }
            }
        }
        KeyCode::Esc | KeyCode::Char('n') => {
            app.delete_confirm = None;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    if app.editor.is_some() || app.delete_confirm.is_some() {
        return;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(row) = app.timeline_row(mouse.column, mouse.row) else {
                return;
            };
            let blocks = model::layout_blocks(&app.tasks, app.date, DAY_ROWS);
            match model::hit_test(&blocks, row) {
                TimelineHit::TaskBody { task_id } => {
                    begin_drag(app, task_id, DragAction::Move, row);
                }
                TimelineHit::TaskTopEdge { task_id } => {
                    begin_drag(app, task_id, DragAction::ResizeTop, row);
                }
                TimelineHit::TaskBottomEdge { task_id } => {
                    begin_drag(app, task_id, DragAction::ResizeBottom, row);
                }
                TimelineHit::Empty { row } => {
                    let snap = app.config.timeline.snap_minutes;
                    let start = offset_to_minutes(row, DAY_ROWS, snap) as i64;
                    let duration = app.config.timeline.default_task_minutes;
                    match actions::create_at_click(
                        &mut app.tasks,
                        &app.storage,
                        app.sink.as_mut(),
                        app.date,
                        start,
                        duration,
                    ) {
                        Ok(outcome) => {
                            app.apply_outcome(outcome);
                            // A freshly clicked-in task goes straight to the
                            // inline editor.
                            if let Some(task) =
                                app.selected.as_deref().and_then(|id| app.tasks.find(id))
                            {
                                if let Some((start, end)) =
                                    crate::geometry::clip_to_day(task, app.date)
                                {
                                    app.editor = Some(EditorState::edit_task(
                                        task,
                                        start as i64,
                                        end as i64,
                                    ));
                                }
                            }
                        }
                        Err(err) => app.report_error(err),
                    }
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if !app.drag.is_dragging() {
                return;
            }
            // Leaving the timeline ends the drag; the last applied position
            // stands.
            let Some(row) = app.timeline_row(mouse.column, mouse.row) else {
                app.drag.finish();
                return;
            };
            let snap = app.config.timeline.snap_minutes;
            let Some(update) = app.drag.moved(row, DAY_ROWS, snap) else {
                return;
            };
            let action = match &app.drag {
                DragState::Dragging { action, .. } => *action,
                DragState::Idle => return,
            };
            match actions::apply_drag(
                &mut app.tasks,
                &app.storage,
                app.sink.as_mut(),
                app.date,
                action,
                &update,
            ) {
                Ok(outcome) => app.apply_outcome(outcome),
                Err(err) => app.report_error(err),
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.drag.finish();
        }
        MouseEventKind::ScrollDown => {
            app.scroll = app.scroll.saturating_add(2);
        }
        MouseEventKind::ScrollUp => {
            app.scroll = app.scroll.saturating_sub(2);
        }
        _ => {}
    }
}

fn begin_drag(app: &mut AppState, task_id: String, action: DragAction, row: u16) {
    let Some(task) = app.tasks.find(&task_id) else {
        return;
    };
    let Some((start, end)) = crate::geometry::clip_to_day(task, app.date) else {
        return;
    };
    app.selected = Some(task_id.clone());
    app.drag = DragState::begin(task_id, action, row, start as i64, end as i64);
}
