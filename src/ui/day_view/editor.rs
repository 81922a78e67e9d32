use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    NewTask,
    EditTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFieldId {
    Name,
    Start,
    End,
}

#[derive(Debug, Clone)]
pub struct EditorField {
    pub id: EditorFieldId,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
}

/// Validated editor result: name plus endpoints in minutes past midnight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSubmit {
    pub name: String,
    pub start_minutes: i64,
    pub end_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Cancel,
    Submit,
}

/// Inline form for creating and editing tasks.
///
/// Times are entered as wall-clock `HH:MM` on the displayed day.
#[derive(Debug, Clone)]
pub struct EditorState {
    kind: EditorKind,
    fields: Vec<EditorField>,
    active: usize,
    error: Option<String>,
    task_id: Option<String>,
}

impl EditorState {
    pub fn new_task(start_minutes: i64, end_minutes: i64) -> Self {
        Self {
            kind: EditorKind::NewTask,
            fields: vec![
                EditorField {
                    id: EditorFieldId::Name,
                    label: "Name",
                    value: String::new(),
                    required: true,
                },
                EditorField {
                    id: EditorFieldId::Start,
                    label: "Start",
                    value: format_minutes(start_minutes),
                    required: true,
                },
                EditorField {
                    id: EditorFieldId::End,
                    label: "End",
                    value: format_minutes(end_minutes),
                    required: true,
                },
            ],
            active: 0,
            error: None,
            task_id: None,
        }
    }

    pub fn edit_task(task: &Task, start_minutes: i64, end_minutes: i64) -> Self {
        let mut editor = Self::new_task(start_minutes, end_minutes);
        editor.kind = EditorKind::EditTask;
        editor.task_id = Some(task.id.clone());
        if let Some(field) = editor.fields.first_mut() {
            field.value = task.name.clone();
        }
        editor
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn fields(&self) -> &[EditorField] {
        &self.fields
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
            if let Some(field) = self.current_field_mut() {
                field.value.clear();
            }
            self.error = None;
            return EditorAction::None;
        }

        match key.code {
            KeyCode::Esc => return EditorAction::Cancel,
            KeyCode::Tab | KeyCode::Down => {
                self.move_active(1);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_active(-1);
            }
            KeyCode::Enter => {
                if self.active + 1 >= self.fields.len() {
                    return self.attempt_submit();
                }
                self.move_active(1);
            }
            KeyCode::Backspace => {
                if let Some(field) = self.current_field_mut() {
                    field.value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return EditorAction::None;
                }
                if !ch.is_control() {
                    if let Some(field) = self.current_field_mut() {
                        field.value.push(ch);
                    }
                }
            }
            _ => {}
        }

        self.error = None;
        EditorAction::None
    }

    pub fn build_submit(&self) -> Result<EditorSubmit, String> {
        let name = self.field_value(EditorFieldId::Name).trim().to_string();
        if name.is_empty() {
            return Err("name is required".to_string());
        }
        let start_minutes = parse_minutes(self.field_value(EditorFieldId::Start))?;
        let end_minutes = parse_minutes(self.field_value(EditorFieldId::End))?;
        if end_minutes <= start_minutes {
            return Err("end must be after start".to_string());
        }
        Ok(EditorSubmit {
            name,
            start_minutes,
            end_minutes,
        })
    }

    fn attempt_submit(&mut self) -> EditorAction {
        match self.build_submit() {
            Ok(_) => EditorAction::Submit,
            Err(err) => {
                self.error = Some(err);
                EditorAction::None
            }
        }
    }

    fn move_active(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        if len == 0 {
            self.active = 0;
            return;
        }
        let next = (self.active as isize + delta).rem_euclid(len);
        self.active = next as usize;
    }

    fn current_field_mut(&mut self) -> Option<&mut EditorField> {
        self.fields.get_mut(self.active)
    }

    fn field_value(&self, id: EditorFieldId) -> &str {
        self.fields
            .iter()
            .find(|field| field.id == id)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }
}

/// Render minutes past midnight as `HH:MM`
pub fn format_minutes(minutes: i64) -> String {
    let minutes = minutes.clamp(0, 24 * 60);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn parse_minutes(value: &str) -> Result<i64, String> {
    let trimmed = value.trim();
    let (hours, minutes) = trimmed
        .split_once(':')
        .ok_or_else(|| format!("invalid time '{trimmed}': expected HH:MM"))?;
    let hours: i64 = hours
        .parse()
        .map_err(|_| format!("invalid time '{trimmed}': expected HH:MM"))?;
    let minutes: i64 = minutes
        .parse()
        .map_err(|_| format!("invalid time '{trimmed}': expected HH:MM"))?;
    if !(0..=24).contains(&hours) || !(0..60).contains(&minutes) || hours * 60 + minutes > 24 * 60 {
        return Err(format!("time '{trimmed}' is out of range"));
    }
    Ok(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(editor: &mut EditorState, text: &str) {
        for ch in text.chars() {
            editor.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }

    #[test]
    fn editor_requires_a_name() {
        let mut editor = EditorState::new_task(540, 600);
        for _ in 0..editor.fields().len() {
            let action = editor.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
            assert_eq!(action, EditorAction::None);
        }
        assert_eq!(editor.error(), Some("name is required"));
    }

    #[test]
    fn editor_rejects_inverted_times() {
        let mut editor = EditorState::new_task(540, 600);
        type_text(&mut editor, "standup");
        editor.fields[1].value = "10:00".to_string();
        editor.fields[2].value = "09:00".to_string();
        assert_eq!(
            editor.build_submit().unwrap_err(),
            "end must be after start"
        );
    }

    #[test]
    fn prefilled_times_submit_unchanged() {
        let mut editor = EditorState::new_task(540, 600);
        type_text(&mut editor, "standup");
        let submit = editor.build_submit().unwrap();
        assert_eq!(submit.name, "standup");
        assert_eq!(submit.start_minutes, 540);
        assert_eq!(submit.end_minutes, 600);
    }

    #[test]
    fn minutes_round_trip_through_the_text_form() {
        assert_eq!(format_minutes(540), "09:00");
        assert_eq!(parse_minutes("09:00").unwrap(), 540);
        assert_eq!(parse_minutes("24:00").unwrap(), 1440);
        assert!(parse_minutes("25:00").is_err());
        assert!(parse_minutes("0930").is_err());
    }
}
