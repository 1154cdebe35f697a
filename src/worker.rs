use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tracing::{debug, error};

use crate::api::{execute, TaskApi};
use crate::kanban_board::{KanbanBoard, Outcome, Request};

/// Runs requests off the UI thread. Every request gets its own thread and
/// nothing is deduplicated or cancelled; completions queue up in arrival
/// order until the event loop drains them.
pub struct Worker {
    api: Arc<dyn TaskApi + Send + Sync>,
    tx: Sender<Outcome>,
    rx: Receiver<Outcome>,
}

impl Worker {
    pub fn new(api: Arc<dyn TaskApi + Send + Sync>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { api, tx, rx }
    }

    pub fn dispatch(&self, request: Request) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name("taskboard-request".to_string())
            .spawn(move || {
                let outcome = execute(&*api, request);
                if tx.send(outcome).is_err() {
                    debug!("board gone before request completed");
                }
            });
        if let Err(e) = spawned {
            error!(error = %e, "failed to start request thread");
        }
    }

    /// Applies every completion received so far, dispatching follow-ups.
    /// Returns how many completions were applied.
    pub fn pump(&self, board: &mut KanbanBoard) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            applied += 1;
            if let Some(follow_up) = board.apply(outcome) {
                self.dispatch(follow_up);
            }
        }
        applied
    }

    #[cfg(test)]
    fn wait(&self, board: &mut KanbanBoard) {
        let outcome = self
            .rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        if let Some(follow_up) = board.apply(outcome) {
            self.dispatch(follow_up);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskField;
    use crate::test_helpers::{make_task, Call, RecordingApi};

    #[test]
    fn test_fetch_completes_off_thread() {
        let api = Arc::new(RecordingApi::new(vec![make_task(1, "A", "To do")]));
        let worker = Worker::new(api.clone());
        let mut board = KanbanBoard::new();

        worker.dispatch(board.fetch_tasks());
        worker.wait(&mut board);

        assert_eq!(board.tasks.len(), 1);
        assert_eq!(api.calls(), vec![Call::Get]);
    }

    #[test]
    fn test_create_follow_up_fetch_is_dispatched() {
        let api = Arc::new(RecordingApi::new(vec![]));
        let worker = Worker::new(api.clone());
        let mut board = KanbanBoard::new();
        board.set_draft_field(TaskField::Title, "A".to_string());
        api.set_tasks(vec![make_task(1, "A", "To do")]);

        worker.dispatch(board.submit_draft().unwrap());
        worker.wait(&mut board); // POST
        worker.wait(&mut board); // GET

        assert_eq!(board.tasks.len(), 1);
        assert!(board.draft.title.is_empty());
        assert_eq!(api.calls().len(), 2);
        assert_eq!(api.calls()[1], Call::Get);
    }

    #[test]
    fn test_pump_without_completions() {
        let worker = Worker::new(Arc::new(RecordingApi::new(vec![])));
        let mut board = KanbanBoard::new();
        assert_eq!(worker.pump(&mut board), 0);
    }
}
