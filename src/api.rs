use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::kanban_board::{Outcome, Request};
use crate::task::{NewTask, Task, TaskId};

/// The four calls the board makes against the task service.
pub trait TaskApi {
    fn list_tasks(&self) -> Result<Vec<Task>>;
    fn create_task(&self, draft: &NewTask) -> Result<()>;
    fn update_task(&self, id: &TaskId, task: &Task) -> Result<()>;
    fn delete_task(&self, id: &TaskId) -> Result<()>;
}

/// Runs one request and wraps its result for the board.
pub fn execute(api: &dyn TaskApi, request: Request) -> Outcome {
    match request {
        Request::Fetch => Outcome::Fetched(api.list_tasks()),
        Request::Create(draft) => Outcome::Created(api.create_task(&draft)),
        Request::Update(id, task) => {
            let result = api.update_task(&id, &task);
            Outcome::Updated(id, result)
        }
        Request::Delete(id) => {
            let result = api.delete_task(&id);
            Outcome::Deleted(id, result)
        }
    }
}

/// JSON-over-HTTP client. No retries and no timeouts: a request either
/// completes or fails once.
pub struct HttpTaskApi {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, id: &TaskId) -> String {
        format!("{}/tasks/{id}", self.base_url)
    }
}

fn http_error(method: &str, url: &str, err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(code, _) => Error::Http(format!("{method} {url} returned {code}")),
        ureq::Error::Transport(t) => Error::Http(format!("{method} {url} failed: {t}")),
    }
}

/// A write counts as done once the server has answered, whatever the status.
/// Only transport failures are errors.
fn write_completed(
    method: &str,
    url: &str,
    result: std::result::Result<ureq::Response, ureq::Error>,
) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(ureq::Error::Status(code, _)) => {
            warn!(method, url, code, "server answered write with error status");
            Ok(())
        }
        Err(e) => Err(http_error(method, url, e)),
    }
}

impl TaskApi for HttpTaskApi {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        let url = self.tasks_url();
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| http_error("GET", &url, e))?;
        let tasks: Vec<Task> = response
            .into_json()
            .map_err(|e| Error::Decode(format!("GET {url}: {e}")))?;
        debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    fn create_task(&self, draft: &NewTask) -> Result<()> {
        let url = self.tasks_url();
        let result = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(draft);
        write_completed("POST", &url, result)
    }

    fn update_task(&self, id: &TaskId, task: &Task) -> Result<()> {
        let url = self.task_url(id);
        let result = self
            .agent
            .put(&url)
            .set("Content-Type", "application/json")
            .send_json(task);
        write_completed("PUT", &url, result)
    }

    fn delete_task(&self, id: &TaskId) -> Result<()> {
        let url = self.task_url(id);
        let result = self.agent.delete(&url).call();
        write_completed("DELETE", &url, result)
    }
}
