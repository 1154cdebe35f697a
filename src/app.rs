use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::kanban_board::{KanbanBoard, Request};
use crate::task::{Status, TaskField};

/// Which part of the screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Board,
    Draft,
    Edit,
}

/// A line of a form: an editable field or a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    Field(TaskField),
    Create,
    Save,
    Delete,
}

pub const DRAFT_ROWS: [FormRow; 5] = [
    FormRow::Field(TaskField::Title),
    FormRow::Field(TaskField::Description),
    FormRow::Field(TaskField::Status),
    FormRow::Field(TaskField::DueDate),
    FormRow::Create,
];

pub const EDIT_ROWS: [FormRow; 6] = [
    FormRow::Field(TaskField::Title),
    FormRow::Field(TaskField::Description),
    FormRow::Field(TaskField::Status),
    FormRow::Field(TaskField::DueDate),
    FormRow::Save,
    FormRow::Delete,
];

pub struct App {
    pub board: KanbanBoard,
    pub focus: Focus,
    pub draft_row: usize,
    pub edit_row: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(board: KanbanBoard) -> Self {
        Self {
            board,
            focus: Focus::Board,
            draft_row: 0,
            edit_row: 0,
            should_quit: false,
        }
    }

    /// Row that has the cursor in the focused form, if a form is focused.
    pub fn focused_row(&self) -> Option<FormRow> {
        match self.focus {
            Focus::Board => None,
            Focus::Draft => DRAFT_ROWS.get(self.draft_row).copied(),
            Focus::Edit => EDIT_ROWS.get(self.edit_row).copied(),
        }
    }

    /// The edit form loses focus once its snapshot is gone.
    pub fn sync_focus(&mut self) {
        if self.focus == Focus::Edit && self.board.editing.is_none() {
            self.focus = Focus::Board;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Request> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }
        self.sync_focus();
        match self.focus {
            Focus::Board => self.handle_board_key(key),
            Focus::Draft | Focus::Edit => self.handle_form_key(key),
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Option<Request> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => self.board.move_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.board.move_column(1),
            KeyCode::Up | KeyCode::Char('k') => self.board.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.board.move_selection(1),
            KeyCode::Char('n') | KeyCode::Char('a') | KeyCode::Tab => {
                self.focus = Focus::Draft;
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let task = self.board.selected()?.clone();
                if !self.board.is_editing(&task.id) {
                    self.board.start_edit(&task);
                    self.edit_row = 0;
                }
                self.focus = Focus::Edit;
            }
            _ => {}
        }
        None
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Request> {
        let rows: &[FormRow] = if self.focus == Focus::Draft {
            &DRAFT_ROWS
        } else {
            &EDIT_ROWS
        };
        let row = self.focused_row()?;

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('s') {
                return self.submit();
            }
            return None;
        }

        match key.code {
            KeyCode::Esc => self.focus = Focus::Board,
            KeyCode::Tab | KeyCode::Down => self.step_row(rows.len(), 1),
            KeyCode::BackTab | KeyCode::Up => self.step_row(rows.len(), -1),
            KeyCode::Enter => {
                return match row {
                    FormRow::Field(_) => {
                        self.step_row(rows.len(), 1);
                        None
                    }
                    FormRow::Create | FormRow::Save => self.submit(),
                    FormRow::Delete => self.delete(),
                };
            }
            KeyCode::Left | KeyCode::Right if row == FormRow::Field(TaskField::Status) => {
                let current = self.field_value(TaskField::Status);
                let next = Status::cycle(&current, key.code == KeyCode::Right);
                self.set_field_value(TaskField::Status, next.label().to_string());
            }
            KeyCode::Backspace => {
                if let FormRow::Field(field) = row {
                    if field != TaskField::Status {
                        let mut value = self.field_value(field);
                        value.pop();
                        self.set_field_value(field, value);
                    }
                }
            }
            KeyCode::Char(c) => {
                if let FormRow::Field(field) = row {
                    if field != TaskField::Status {
                        let mut value = self.field_value(field);
                        value.push(c);
                        self.set_field_value(field, value);
                    }
                }
            }
            _ => {}
        }
        None
    }

    fn step_row(&mut self, len: usize, direction: isize) {
        let row = match self.focus {
            Focus::Draft => &mut self.draft_row,
            Focus::Edit => &mut self.edit_row,
            Focus::Board => return,
        };
        *row = (*row as isize + direction).rem_euclid(len as isize) as usize;
    }

    fn field_value(&self, field: TaskField) -> String {
        match self.focus {
            Focus::Edit => self
                .board
                .editing
                .as_ref()
                .map(|t| t.field(field).to_string())
                .unwrap_or_default(),
            _ => self.board.draft.field(field).to_string(),
        }
    }

    fn set_field_value(&mut self, field: TaskField, value: String) {
        match self.focus {
            Focus::Edit => self.board.set_edit_field(field, value),
            _ => self.board.set_draft_field(field, value),
        }
    }

    fn submit(&mut self) -> Option<Request> {
        match self.focus {
            Focus::Draft => self.board.submit_draft(),
            Focus::Edit => {
                let id = self.board.editing.as_ref()?.id.clone();
                self.focus = Focus::Board;
                self.board.save_edit(&id)
            }
            Focus::Board => None,
        }
    }

    fn delete(&mut self) -> Option<Request> {
        let id = self.board.editing.as_ref()?.id.clone();
        self.focus = Focus::Board;
        Some(self.board.delete_task(&id))
    }
}
