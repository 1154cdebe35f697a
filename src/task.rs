use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned identifier. The backend decides whether it is a number or
/// a string; either way it is echoed back untouched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

/// The four board columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    ToDo,
    Started,
    InProgress,
    Finished,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::ToDo,
        Status::Started,
        Status::InProgress,
        Status::Finished,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Status::ToDo => "To do",
            Status::Started => "Started",
            Status::InProgress => "In progress",
            Status::Finished => "Finished",
        }
    }

    /// Exact match only: "to do" or "Done" are not statuses.
    pub fn from_label(label: &str) -> Option<Status> {
        Status::ALL.into_iter().find(|s| s.label() == label)
    }

    /// Next (or previous) status after `current`, wrapping around. Unknown
    /// text starts the cycle from either end.
    pub fn cycle(current: &str, forward: bool) -> Status {
        let len = Status::ALL.len();
        match Status::from_label(current) {
            Some(status) if forward => Status::ALL[(status as usize + 1) % len],
            Some(status) => Status::ALL[(status as usize + len - 1) % len],
            None if forward => Status::ToDo,
            None => Status::Finished,
        }
    }
}

/// One of the four user-editable fields of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Status,
    DueDate,
}

/// A task as the backend returns it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub due_date: Option<String>,
    /// Whatever else the server sent; kept so a PUT sends the full task back.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `null` reads the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Task {
    pub fn field(&self, field: TaskField) -> &str {
        match field {
            TaskField::Title => &self.title,
            TaskField::Description => self.description.as_deref().unwrap_or(""),
            TaskField::Status => &self.status,
            TaskField::DueDate => self.due_date.as_deref().unwrap_or(""),
        }
    }

    pub fn set_field(&mut self, field: TaskField, value: String) {
        match field {
            TaskField::Title => self.title = value,
            TaskField::Description => self.description = Some(value),
            TaskField::Status => self.status = value,
            TaskField::DueDate => self.due_date = Some(value),
        }
    }

    /// Due date to show on the card; `None` for both missing and empty.
    pub fn due_date_label(&self) -> Option<&str> {
        self.due_date.as_deref().filter(|d| !d.is_empty())
    }

    /// True when the due date is a `YYYY-MM-DD` day strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date_label()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .is_some_and(|due| due < today)
    }
}

/// The new-task form. Posted as-is, so an empty due date goes out as `""`.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: String,
    pub due_date: String,
}

impl Default for NewTask {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: Status::ToDo.label().to_string(),
            due_date: String::new(),
        }
    }
}

impl NewTask {
    pub fn is_submittable(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn field(&self, field: TaskField) -> &str {
        match field {
            TaskField::Title => &self.title,
            TaskField::Description => &self.description,
            TaskField::Status => &self.status,
            TaskField::DueDate => &self.due_date,
        }
    }

    pub fn set_field(&mut self, field: TaskField, value: String) {
        match field {
            TaskField::Title => self.title = value,
            TaskField::Description => self.description = value,
            TaskField::Status => self.status = value,
            TaskField::DueDate => self.due_date = value,
        }
    }
}
