use tracing::{debug, error};

use crate::error::Result;
use crate::task::{NewTask, Status, Task, TaskField, TaskId};

/// A call the board wants made against the task service.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Fetch,
    Create(NewTask),
    Update(TaskId, Task),
    Delete(TaskId),
}

/// The completion of a [`Request`], fed back through [`KanbanBoard::apply`].
#[derive(Debug)]
pub enum Outcome {
    Fetched(Result<Vec<Task>>),
    Created(Result<()>),
    Updated(TaskId, Result<()>),
    Deleted(TaskId, Result<()>),
}

/// Local state of the board. The task list is only ever replaced wholesale
/// by a fetch; mutations go to the server and are followed by a re-fetch.
#[derive(Debug, Default)]
pub struct KanbanBoard {
    pub tasks: Vec<Task>,
    pub draft: NewTask,
    /// Copy of the task being edited. At most one at a time.
    pub editing: Option<Task>,
    pub selected_status: usize,
    pub selected_task: usize,
}

impl KanbanBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_tasks(&self) -> Request {
        Request::Fetch
    }

    pub fn set_draft_field(&mut self, field: TaskField, value: String) {
        self.draft.set_field(field, value);
    }

    /// `None` when the title is blank; the draft is left untouched.
    pub fn submit_draft(&self) -> Option<Request> {
        if !self.draft.is_submittable() {
            debug!("ignoring new task with empty title");
            return None;
        }
        Some(Request::Create(self.draft.clone()))
    }

    /// Replaces any previous snapshot; unsaved edits to it are dropped.
    pub fn start_edit(&mut self, task: &Task) {
        self.editing = Some(task.clone());
    }

    pub fn set_edit_field(&mut self, field: TaskField, value: String) {
        if let Some(snapshot) = self.editing.as_mut() {
            snapshot.set_field(field, value);
        }
    }

    pub fn is_editing(&self, id: &TaskId) -> bool {
        self.editing.as_ref().is_some_and(|t| &t.id == id)
    }

    pub fn save_edit(&self, id: &TaskId) -> Option<Request> {
        self.editing
            .as_ref()
            .map(|snapshot| Request::Update(id.clone(), snapshot.clone()))
    }

    pub fn delete_task(&self, id: &TaskId) -> Request {
        Request::Delete(id.clone())
    }

    /// Applies a finished request and returns the follow-up, if any.
    ///
    /// A failed create leaves the draft for another try; update and delete
    /// leave edit mode and re-fetch whether or not they succeeded.
    pub fn apply(&mut self, outcome: Outcome) -> Option<Request> {
        match outcome {
            Outcome::Fetched(Ok(tasks)) => {
                debug!(count = tasks.len(), "task list replaced");
                self.tasks = tasks;
                self.clamp_selection();
                None
            }
            Outcome::Fetched(Err(e)) => {
                error!(error = %e, "error fetching tasks");
                None
            }
            Outcome::Created(Ok(())) => {
                self.draft = NewTask::default();
                Some(Request::Fetch)
            }
            Outcome::Created(Err(e)) => {
                error!(error = %e, "error creating task");
                None
            }
            Outcome::Updated(id, result) => {
                if let Err(e) = result {
                    error!(%id, error = %e, "error updating task");
                }
                self.editing = None;
                Some(Request::Fetch)
            }
            Outcome::Deleted(id, result) => {
                if let Err(e) = result {
                    error!(%id, error = %e, "error deleting task");
                }
                self.editing = None;
                Some(Request::Fetch)
            }
        }
    }

    /// Tasks whose status is exactly `status`, in server order.
    pub fn get_tasks_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == status.label())
            .collect()
    }

    pub fn selected_column(&self) -> Status {
        Status::ALL[self.selected_status.min(Status::ALL.len() - 1)]
    }

    pub fn selected(&self) -> Option<&Task> {
        self.get_tasks_by_status(self.selected_column())
            .get(self.selected_task)
            .copied()
    }

    pub fn move_column(&mut self, direction: isize) {
        let last = Status::ALL.len() as isize - 1;
        self.selected_status = (self.selected_status as isize + direction).clamp(0, last) as usize;
        self.clamp_selection();
    }

    pub fn move_selection(&mut self, direction: isize) {
        let len = self.get_tasks_by_status(self.selected_column()).len();
        if len == 0 {
            self.selected_task = 0;
            return;
        }
        self.selected_task =
            (self.selected_task as isize + direction).clamp(0, len as isize - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.get_tasks_by_status(self.selected_column()).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_helpers::{make_task, run_request, Call, Method, RecordingApi};
    use serde_json::json;

    fn loaded_board(api: &RecordingApi) -> KanbanBoard {
        let mut board = KanbanBoard::new();
        let fetch = board.fetch_tasks();
        run_request(&mut board, api, fetch);
        api.clear_calls();
        board
    }

    #[test]
    fn test_each_known_status_lands_in_one_column() {
        let mut board = KanbanBoard::new();
        board.tasks = vec![
            make_task(1, "a", "To do"),
            make_task(2, "b", "Started"),
            make_task(3, "c", "In progress"),
            make_task(4, "d", "Finished"),
            make_task(5, "e", "Done"),
            make_task(6, "f", "to do"),
        ];

        for task in &board.tasks {
            let columns = Status::ALL
                .iter()
                .filter(|s| board.get_tasks_by_status(**s).contains(&task))
                .count();
            let expected = usize::from(Status::from_label(&task.status).is_some());
            assert_eq!(columns, expected, "task {}", task.title);
        }
    }

    #[test]
    fn test_null_status_task_is_kept_but_not_in_any_column() {
        let mut board = KanbanBoard::new();
        let tasks: Vec<Task> = serde_json::from_str(
            r#"[{"id":1,"title":"A","status":"To do"},{"id":2,"status":null}]"#,
        )
        .unwrap();
        board.apply(Outcome::Fetched(Ok(tasks)));

        assert_eq!(board.tasks.len(), 2);
        assert_eq!(board.get_tasks_by_status(Status::ToDo).len(), 1);
        let hidden = &board.tasks[1];
        assert!(Status::ALL
            .iter()
            .all(|s| !board.get_tasks_by_status(*s).contains(&hidden)));
    }

    #[test]
    fn test_fetch_replaces_list() {
        let api = RecordingApi::new(vec![make_task(1, "A", "To do")]);
        let mut board = loaded_board(&api);
        assert_eq!(board.tasks.len(), 1);

        api.set_tasks(vec![make_task(2, "B", "Started"), make_task(3, "C", "Started")]);
        run_request(&mut board, &api, Request::Fetch);
        assert_eq!(
            board.tasks.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
            vec!["B", "C"]
        );
        assert_eq!(api.calls(), vec![Call::Get]);
    }

    #[test]
    fn test_failed_fetch_keeps_stale_list() {
        let api = RecordingApi::new(vec![make_task(1, "A", "To do")]);
        let mut board = loaded_board(&api);

        api.fail(Method::Get);
        run_request(&mut board, &api, Request::Fetch);
        assert_eq!(board.tasks, vec![make_task(1, "A", "To do")]);
    }

    #[test]
    fn test_blank_title_issues_no_request() {
        let mut board = KanbanBoard::new();
        board.set_draft_field(TaskField::Title, "   ".to_string());
        board.set_draft_field(TaskField::Description, "notes".to_string());
        let before = board.draft.clone();

        assert_eq!(board.submit_draft(), None);
        assert_eq!(board.draft, before);
    }

    #[test]
    fn test_create_posts_then_fetches_and_resets_draft() {
        let api = RecordingApi::new(vec![]);
        let mut board = loaded_board(&api);
        board.set_draft_field(TaskField::Title, "Buy milk".to_string());
        board.set_draft_field(TaskField::Status, "Started".to_string());
        api.set_tasks(vec![make_task(1, "Buy milk", "Started")]);

        let request = board.submit_draft().unwrap();
        run_request(&mut board, &api, request);

        assert_eq!(
            api.calls(),
            vec![
                Call::Post(json!({
                    "title": "Buy milk",
                    "description": "",
                    "status": "Started",
                    "dueDate": ""
                })),
                Call::Get,
            ]
        );
        assert_eq!(board.draft, NewTask::default());
        assert_eq!(board.tasks.len(), 1);
    }

    #[test]
    fn test_failed_create_keeps_draft_and_skips_fetch() {
        let api = RecordingApi::new(vec![]);
        let mut board = loaded_board(&api);
        board.set_draft_field(TaskField::Title, "Buy milk".to_string());
        api.fail(Method::Post);

        let request = board.submit_draft().unwrap();
        run_request(&mut board, &api, request);

        assert_eq!(api.calls().len(), 1);
        assert!(matches!(api.calls()[0], Call::Post(_)));
        assert_eq!(board.draft.title, "Buy milk");
    }

    #[test]
    fn test_second_edit_replaces_first() {
        let mut board = KanbanBoard::new();
        let a = make_task(1, "A", "To do");
        let b = make_task(2, "B", "Started");

        board.start_edit(&a);
        board.set_edit_field(TaskField::Title, "A changed".to_string());
        board.start_edit(&b);

        assert_eq!(board.editing, Some(b));
        assert!(!board.is_editing(&a.id));
    }

    #[test]
    fn test_edit_touches_snapshot_only() {
        let api = RecordingApi::new(vec![make_task(1, "A", "To do")]);
        let mut board = loaded_board(&api);
        let task = board.tasks[0].clone();

        board.start_edit(&task);
        board.set_edit_field(TaskField::Description, "details".to_string());

        assert_eq!(board.tasks[0].description, None);
        assert_eq!(
            board.editing.as_ref().unwrap().description.as_deref(),
            Some("details")
        );
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_save_puts_snapshot_then_fetches() {
        let api = RecordingApi::new(vec![make_task(1, "A", "To do")]);
        let mut board = loaded_board(&api);
        let task = board.tasks[0].clone();

        board.start_edit(&task);
        board.set_edit_field(TaskField::Status, "Finished".to_string());
        api.set_tasks(vec![make_task(1, "A", "Finished")]);
        let request = board.save_edit(&task.id).unwrap();
        run_request(&mut board, &api, request);

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            Call::Put(id, body) => {
                assert_eq!(id, "1");
                assert_eq!(body["id"], 1);
                assert_eq!(body["title"], "A");
                assert_eq!(body["status"], "Finished");
            }
            other => panic!("expected PUT, got {other:?}"),
        }
        assert_eq!(calls[1], Call::Get);
        assert_eq!(board.editing, None);
    }

    #[test]
    fn test_failed_save_still_exits_edit_and_fetches() {
        let api = RecordingApi::new(vec![make_task(1, "A", "To do")]);
        let mut board = loaded_board(&api);
        let task = board.tasks[0].clone();
        board.start_edit(&task);
        api.fail(Method::Put);

        let request = board.save_edit(&task.id).unwrap();
        run_request(&mut board, &api, request);

        assert_eq!(board.editing, None);
        assert_eq!(api.calls().last(), Some(&Call::Get));
    }

    #[test]
    fn test_save_without_snapshot_is_noop() {
        let board = KanbanBoard::new();
        assert_eq!(board.save_edit(&TaskId::Number(1)), None);
    }

    #[test]
    fn test_delete_exits_edit_mode_of_other_task() {
        let api = RecordingApi::new(vec![make_task(1, "A", "To do"), make_task(2, "B", "To do")]);
        let mut board = loaded_board(&api);
        let b = board.tasks[1].clone();
        board.start_edit(&b);
        api.set_tasks(vec![make_task(2, "B", "To do")]);

        let request = board.delete_task(&TaskId::Number(1));
        run_request(&mut board, &api, request);

        assert_eq!(api.calls(), vec![Call::Delete("1".to_string()), Call::Get]);
        assert_eq!(board.editing, None);
        assert_eq!(board.tasks.len(), 1);
    }

    #[test]
    fn test_failed_delete_still_exits_edit_and_fetches() {
        let mut board = KanbanBoard::new();
        board.start_edit(&make_task(1, "A", "To do"));
        let follow_up = board.apply(Outcome::Deleted(
            TaskId::Number(1),
            Err(Error::Http("DELETE /tasks/1 returned 404".to_string())),
        ));
        assert_eq!(follow_up, Some(Request::Fetch));
        assert_eq!(board.editing, None);
    }

    #[test]
    fn test_end_to_end_move_to_finished() {
        let api = RecordingApi::new(vec![make_task(1, "A", "To do")]);
        let mut board = loaded_board(&api);
        assert_eq!(board.get_tasks_by_status(Status::ToDo).len(), 1);
        assert!(board.get_tasks_by_status(Status::Finished).is_empty());

        let task = board.selected().unwrap().clone();
        board.start_edit(&task);
        board.set_edit_field(TaskField::Status, "Finished".to_string());
        api.set_tasks(vec![make_task(1, "A", "Finished")]);
        let request = board.save_edit(&task.id).unwrap();
        run_request(&mut board, &api, request);

        assert!(board.get_tasks_by_status(Status::ToDo).is_empty());
        let finished = board.get_tasks_by_status(Status::Finished);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].title, "A");
    }

    #[test]
    fn test_selection_moves_and_clamps() {
        let mut board = KanbanBoard::new();
        board.tasks = vec![
            make_task(1, "a", "To do"),
            make_task(2, "b", "To do"),
            make_task(3, "c", "Started"),
        ];
        board.move_selection(5);
        assert_eq!(board.selected().unwrap().title, "b");

        board.move_column(1);
        assert_eq!(board.selected_column(), Status::Started);
        assert_eq!(board.selected().unwrap().title, "c");

        board.move_column(10);
        assert_eq!(board.selected_column(), Status::Finished);
        assert_eq!(board.selected(), None);

        board.move_column(-10);
        board.move_selection(1);
        board.apply(Outcome::Fetched(Ok(vec![make_task(1, "a", "To do")])));
        assert_eq!(board.selected_task, 0);
    }
}
