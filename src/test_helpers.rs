use std::sync::Mutex;

use crate::api::{execute, TaskApi};
use crate::error::{Error, Result};
use crate::kanban_board::{KanbanBoard, Request};
use crate::task::{NewTask, Task, TaskId};

/// Create a `Task` with no description or due date.
pub fn make_task(id: i64, title: &str, status: &str) -> Task {
    Task {
        id: TaskId::Number(id),
        title: title.to_string(),
        description: None,
        status: status.to_string(),
        due_date: None,
        extra: serde_json::Map::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A request as the fake server saw it; bodies are kept as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get,
    Post(serde_json::Value),
    Put(String, serde_json::Value),
    Delete(String),
}

/// In-memory `TaskApi` that records every call and serves a fixed list.
#[derive(Default)]
pub struct RecordingApi {
    tasks: Mutex<Vec<Task>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<Vec<Method>>,
}

impl RecordingApi {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Default::default()
        }
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        *self.tasks.lock().unwrap() = tasks;
    }

    /// Every later call with `method` fails.
    pub fn fail(&self, method: Method) {
        self.failing.lock().unwrap().push(method);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, method: Method, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&method) {
            return Err(Error::Http(format!("{method:?} refused by test server")));
        }
        Ok(())
    }
}

impl TaskApi for RecordingApi {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        self.record(Method::Get, Call::Get)?;
        Ok(self.tasks.lock().unwrap().clone())
    }

    fn create_task(&self, draft: &NewTask) -> Result<()> {
        let body = serde_json::to_value(draft).unwrap();
        self.record(Method::Post, Call::Post(body))
    }

    fn update_task(&self, id: &TaskId, task: &Task) -> Result<()> {
        let body = serde_json::to_value(task).unwrap();
        self.record(Method::Put, Call::Put(id.to_string(), body))
    }

    fn delete_task(&self, id: &TaskId) -> Result<()> {
        self.record(Method::Delete, Call::Delete(id.to_string()))
    }
}

/// Runs `request` and every follow-up the board asks for, synchronously.
pub fn run_request(board: &mut KanbanBoard, api: &dyn TaskApi, request: Request) {
    let mut next = Some(request);
    while let Some(request) = next {
        next = board.apply(execute(api, request));
    }
}
