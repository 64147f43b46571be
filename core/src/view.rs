//! Task list view state.
//!
//! # Design
//! `TodoView` owns the local copy of the task list plus the UI state around
//! it: load status and banner, the new-task draft, and the single edit slot.
//! Remote work is split in two halves so a front end can keep several calls
//! in flight:
//!
//! - a [`Command`] is produced synchronously from the current state and
//!   captures everything the call needs (ids, titles);
//! - running it against a [`TodoApi`] yields an [`Outcome`], which
//!   [`TodoView::apply`] folds back into the state when it arrives.
//!
//! Outcomes only touch the entry matching their captured id, so concurrent
//! commands on different tasks never interfere. Two racing writes to the
//! same task resolve last-writer-wins. Nothing is cancelled: an outcome is
//! applied even if the UI has moved on.

use tracing::warn;

use crate::api::TodoApi;
use crate::error::ApiError;
use crate::types::{Task, TaskId, TaskPatch};

const UPDATE_FAILED: &str = "Failed to update todo";
const DELETE_FAILED: &str = "Failed to delete todo";

/// Load status and the single error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The initial list call has not settled yet.
    Loading,
    Idle,
    /// The most recent operation failed; the message is the banner text.
    Failed(String),
}

/// The single edit slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    NotEditing,
    Editing { id: TaskId, buffer: String },
}

/// A remote call captured from view state, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load,
    Create { title: String },
    Toggle { id: TaskId, completed: bool },
    Rename { id: TaskId, title: String },
    Delete { id: TaskId },
}

impl Command {
    /// Perform the call and wrap its result for [`TodoView::apply`].
    pub async fn run<A: TodoApi + ?Sized>(self, api: &A) -> Outcome {
        match self {
            Command::Load => Outcome::Loaded(api.list_tasks().await),
            Command::Create { title } => Outcome::Created(api.create_task(title).await),
            Command::Toggle { id, completed } => Outcome::Toggled {
                id,
                result: api.update_task(id, TaskPatch::completed(completed)).await,
            },
            Command::Rename { id, title } => Outcome::Renamed {
                id,
                result: api.update_task(id, TaskPatch::title(title)).await,
            },
            Command::Delete { id } => Outcome::Deleted {
                id,
                result: api.delete_task(id).await,
            },
        }
    }
}

/// The settled result of a [`Command`].
#[derive(Debug)]
pub enum Outcome {
    Loaded(Result<Vec<Task>, ApiError>),
    Created(Result<Task, ApiError>),
    Toggled { id: TaskId, result: Result<Task, ApiError> },
    Renamed { id: TaskId, result: Result<Task, ApiError> },
    Deleted { id: TaskId, result: Result<(), ApiError> },
}

/// The task list split by completion, borrowed from the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections<'a> {
    pub active: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

#[derive(Debug, Clone)]
pub struct TodoView {
    tasks: Vec<Task>,
    status: Status,
    draft: String,
    edit: EditMode,
}

impl Default for TodoView {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoView {
    /// A view that has not loaded anything yet.
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            status: Status::Loading,
            draft: String::new(),
            edit: EditMode::NotEditing,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn banner(&self) -> Option<&str> {
        match &self.status {
            Status::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn edit_mode(&self) -> &EditMode {
        &self.edit
    }

    pub fn editing_id(&self) -> Option<TaskId> {
        match self.edit {
            EditMode::Editing { id, .. } => Some(id),
            EditMode::NotEditing => None,
        }
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut String> {
        match &mut self.edit {
            EditMode::Editing { buffer, .. } => Some(buffer),
            EditMode::NotEditing => None,
        }
    }

    /// Partition the current list into incomplete and completed tasks,
    /// preserving list order within each half.
    pub fn sections(&self) -> Sections<'_> {
        let (completed, active): (Vec<&Task>, Vec<&Task>) =
            self.tasks.iter().partition(|task| task.completed);
        Sections { active, completed }
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    /// The initial list call.
    pub fn mount(&self) -> Command {
        Command::Load
    }

    /// Create a task from the draft. A blank draft yields nothing.
    pub fn submit_draft(&self) -> Option<Command> {
        if self.draft.trim().is_empty() {
            return None;
        }
        Some(Command::Create {
            title: self.draft.clone(),
        })
    }

    /// Flip the completion flag of `id`, if the view holds it.
    pub fn toggle(&self, id: TaskId) -> Option<Command> {
        self.task(id).map(|task| Command::Toggle {
            id,
            completed: !task.completed,
        })
    }

    /// Put `id` in edit mode seeded with its current title, abandoning any
    /// other edit without saving.
    pub fn begin_edit(&mut self, id: TaskId) {
        if let Some(title) = self.task(id).map(|task| task.title.clone()) {
            self.edit = EditMode::Editing { id, buffer: title };
        }
    }

    /// Rename the task being edited. Yields nothing when not editing or
    /// when the buffer is blank.
    pub fn save_edit(&self) -> Option<Command> {
        match &self.edit {
            EditMode::Editing { id, buffer } if !buffer.trim().is_empty() => Some(Command::Rename {
                id: *id,
                title: buffer.clone(),
            }),
            _ => None,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditMode::NotEditing;
    }

    pub fn delete(&self, id: TaskId) -> Command {
        Command::Delete { id }
    }

    /// Fold a settled call back into the view.
    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Loaded(Ok(tasks)) => {
                self.tasks.clear();
                for task in tasks {
                    self.upsert(task);
                }
                self.status = Status::Idle;
            }
            Outcome::Loaded(Err(err)) => {
                warn!(error = %err, "failed to load todos");
                self.status = Status::Failed(format!("Failed to load todos: {err}"));
            }
            Outcome::Created(Ok(task)) => {
                self.upsert(task);
                self.draft.clear();
                self.settle(None);
            }
            Outcome::Created(Err(err)) => {
                warn!(error = %err, "failed to create todo");
                self.settle(Some(err.to_string()));
            }
            Outcome::Toggled { result: Ok(task), .. } => {
                self.replace(task);
                self.settle(None);
            }
            Outcome::Renamed { id, result: Ok(task) } => {
                self.replace(task);
                if self.editing_id() == Some(id) {
                    self.edit = EditMode::NotEditing;
                }
                self.settle(None);
            }
            Outcome::Toggled { id, result: Err(err) } | Outcome::Renamed { id, result: Err(err) } => {
                warn!(id, error = %err, "failed to update todo");
                self.settle(Some(UPDATE_FAILED.to_string()));
            }
            Outcome::Deleted { id, result: Ok(()) } => {
                self.tasks.retain(|task| task.id != id);
                if self.editing_id() == Some(id) {
                    self.edit = EditMode::NotEditing;
                }
                self.settle(None);
            }
            Outcome::Deleted { id, result: Err(err) } => {
                warn!(id, error = %err, "failed to delete todo");
                self.settle(Some(DELETE_FAILED.to_string()));
            }
        }
    }

    /// Run `command` against `api` and apply its outcome.
    pub async fn dispatch<A: TodoApi + ?Sized>(&mut self, api: &A, command: Command) {
        let outcome = command.run(api).await;
        self.apply(outcome);
    }

    /// Set or clear the banner. Only the list call ends `Loading`.
    fn settle(&mut self, banner: Option<String>) {
        if self.status == Status::Loading {
            return;
        }
        self.status = match banner {
            Some(message) => Status::Failed(message),
            None => Status::Idle,
        };
    }

    /// Replace the entry with the same id, or append if there is none.
    fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Replace the entry with the same id; an unknown id is dropped.
    fn replace(&mut self, task: Task) {
        if let Some(existing) = self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            *existing = task;
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::MockTodoApi;

    fn task(id: TaskId, title: &str, completed: bool) -> Task {
        Task {
            id,
            title: title.to_string(),
            completed,
            created_at: None,
            updated_at: None,
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<TaskId> {
        tasks.iter().map(|t| t.id).collect()
    }

    /// A view whose initial load returned `tasks`.
    async fn loaded(tasks: Vec<Task>) -> TodoView {
        let mut api = MockTodoApi::new();
        api.expect_list_tasks()
            .times(1)
            .return_once(move || Ok(tasks));
        let mut view = TodoView::new();
        view.dispatch(&api, view.mount()).await;
        view
    }

    fn assert_partitioned(view: &TodoView) {
        let sections = view.sections();
        assert_eq!(sections.active.len() + sections.completed.len(), view.tasks().len());
        assert!(sections.active.iter().all(|t| !t.completed));
        assert!(sections.completed.iter().all(|t| t.completed));
        assert_eq!(view.completed_count(), sections.completed.len());
    }

    #[test]
    fn starts_loading_with_nothing_to_show() {
        let view = TodoView::new();
        assert!(view.is_loading());
        assert!(view.tasks().is_empty());
        assert_eq!(view.banner(), None);
        assert_eq!(view.mount(), Command::Load);
    }

    #[tokio::test]
    async fn initial_load_populates_tasks_in_arrival_order() {
        let view = loaded(vec![task(2, "Test Todo 2", true), task(1, "Test Todo 1", false)]).await;
        assert_eq!(view.status(), &Status::Idle);
        assert_eq!(view.tasks()[0].id, 2);
        assert_eq!(view.tasks()[1].id, 1);
    }

    #[tokio::test]
    async fn failed_load_shows_reason_and_stops_loading() {
        let mut api = MockTodoApi::new();
        api.expect_list_tasks()
            .return_once(|| Err(ApiError::Http { status: 500 }));

        let mut view = TodoView::new();
        view.dispatch(&api, view.mount()).await;

        assert!(!view.is_loading());
        assert!(view.tasks().is_empty());
        let banner = view.banner().unwrap();
        assert!(banner.contains("Failed to load todos"));
        assert!(banner.contains("status: 500"));
    }

    #[tokio::test]
    async fn loaded_tasks_are_partitioned() {
        let view = loaded(vec![task(1, "a", false), task(2, "b", true)]).await;
        let sections = view.sections();
        assert_eq!(ids(&sections.active), vec![1]);
        assert_eq!(ids(&sections.completed), vec![2]);
        assert_eq!(view.completed_count(), 1);
    }

    #[tokio::test]
    async fn create_appends_and_clears_draft() {
        let mut view = loaded(vec![task(1, "Existing", false)]).await;
        view.set_draft("New Todo");

        let mut api = MockTodoApi::new();
        api.expect_create_task()
            .with(eq("New Todo".to_string()))
            .times(1)
            .return_once(|_| Ok(task(2, "New Todo", false)));

        let command = view.submit_draft().unwrap();
        view.dispatch(&api, command).await;

        assert_eq!(view.tasks().len(), 2);
        assert_eq!(view.tasks()[1].title, "New Todo");
        assert!(!view.tasks()[1].completed);
        assert_eq!(view.draft(), "");
        assert_eq!(view.banner(), None);
    }

    #[tokio::test]
    async fn blank_draft_does_not_create() {
        let mut view = loaded(vec![task(1, "Existing", false)]).await;
        for draft in ["", "   ", "\t\n"] {
            view.set_draft(draft);
            assert_eq!(view.submit_draft(), None);
        }
        assert_eq!(view.tasks().len(), 1);
        assert_eq!(view.status(), &Status::Idle);
    }

    #[tokio::test]
    async fn failed_create_keeps_list_and_draft() {
        let mut view = loaded(Vec::new()).await;
        view.set_draft("New Todo");

        let mut api = MockTodoApi::new();
        api.expect_create_task()
            .return_once(|_| Err(ApiError::Http { status: 400 }));

        let command = view.submit_draft().unwrap();
        view.dispatch(&api, command).await;

        assert!(view.tasks().is_empty());
        assert_eq!(view.draft(), "New Todo");
        assert_eq!(view.banner(), Some("HTTP error! status: 400"));
    }

    #[tokio::test]
    async fn toggle_twice_restores_flag() {
        let mut view = loaded(vec![task(1, "Test Todo", false)]).await;

        let mut api = MockTodoApi::new();
        api.expect_update_task()
            .withf(|id, patch| *id == 1 && patch.completed == Some(true) && patch.title.is_none())
            .times(1)
            .return_once(|_, _| Ok(task(1, "Test Todo", true)));
        api.expect_update_task()
            .withf(|id, patch| *id == 1 && patch.completed == Some(false))
            .times(1)
            .return_once(|_, _| Ok(task(1, "Test Todo", false)));

        let command = view.toggle(1).unwrap();
        assert_eq!(command, Command::Toggle { id: 1, completed: true });
        view.dispatch(&api, command).await;
        assert!(view.tasks()[0].completed);
        assert_partitioned(&view);

        let command = view.toggle(1).unwrap();
        view.dispatch(&api, command).await;
        assert!(!view.tasks()[0].completed);
        assert_partitioned(&view);
    }

    #[tokio::test]
    async fn failed_toggle_shows_generic_message() {
        let mut view = loaded(vec![task(1, "Test Todo", false)]).await;

        let mut api = MockTodoApi::new();
        api.expect_update_task()
            .return_once(|_, _| Err(ApiError::Transport("reset".to_string())));

        let command = view.toggle(1).unwrap();
        view.dispatch(&api, command).await;

        assert!(!view.tasks()[0].completed);
        assert_eq!(view.banner(), Some(UPDATE_FAILED));
    }

    #[test]
    fn toggle_unknown_task_yields_nothing() {
        assert_eq!(TodoView::new().toggle(42), None);
    }

    #[tokio::test]
    async fn update_of_missing_task_leaves_list_unchanged() {
        let mut view = loaded(vec![task(1, "a", false), task(2, "b", true)]).await;
        let before = view.tasks().to_vec();

        let mut api = MockTodoApi::new();
        api.expect_update_task()
            .withf(|id, _| *id == 999)
            .return_once(|_, _| Err(ApiError::Http { status: 404 }));

        view.dispatch(
            &api,
            Command::Rename {
                id: 999,
                title: "Updated".to_string(),
            },
        )
        .await;

        assert_eq!(view.tasks(), before.as_slice());
        assert_eq!(view.banner(), Some(UPDATE_FAILED));
    }

    #[tokio::test]
    async fn begin_edit_seeds_buffer_and_replaces_previous_edit() {
        let mut view = loaded(vec![task(1, "First", false), task(2, "Second", false)]).await;

        view.begin_edit(1);
        view.edit_buffer_mut().unwrap().push_str(" draft");
        view.begin_edit(2);

        assert_eq!(
            view.edit_mode(),
            &EditMode::Editing {
                id: 2,
                buffer: "Second".to_string()
            }
        );
        assert_eq!(view.tasks()[0].title, "First");
    }

    #[tokio::test]
    async fn save_edit_changes_only_title() {
        let mut view = loaded(vec![task(1, "Test Todo", true), task(2, "Other", false)]).await;
        view.begin_edit(1);
        *view.edit_buffer_mut().unwrap() = "Updated Todo".to_string();

        let mut api = MockTodoApi::new();
        api.expect_update_task()
            .withf(|id, patch| *id == 1 && *patch == TaskPatch::title("Updated Todo"))
            .times(1)
            .return_once(|_, _| Ok(task(1, "Updated Todo", true)));

        let command = view.save_edit().unwrap();
        view.dispatch(&api, command).await;

        assert_eq!(view.tasks()[0], task(1, "Updated Todo", true));
        assert_eq!(view.tasks()[1], task(2, "Other", false));
        assert_eq!(view.edit_mode(), &EditMode::NotEditing);
        assert_eq!(view.banner(), None);
    }

    #[tokio::test]
    async fn blank_edit_buffer_does_not_save() {
        let mut view = loaded(vec![task(1, "Test Todo", false)]).await;
        view.begin_edit(1);
        *view.edit_buffer_mut().unwrap() = "  ".to_string();

        assert_eq!(view.save_edit(), None);
        assert_eq!(view.editing_id(), Some(1));
    }

    #[tokio::test]
    async fn failed_save_stays_in_edit_mode() {
        let mut view = loaded(vec![task(1, "Test Todo", false)]).await;
        view.begin_edit(1);
        *view.edit_buffer_mut().unwrap() = "Renamed".to_string();

        let mut api = MockTodoApi::new();
        api.expect_update_task()
            .return_once(|_, _| Err(ApiError::Http { status: 500 }));

        let command = view.save_edit().unwrap();
        view.dispatch(&api, command).await;

        assert_eq!(view.editing_id(), Some(1));
        assert_eq!(view.tasks()[0].title, "Test Todo");
        assert_eq!(view.banner(), Some(UPDATE_FAILED));
    }

    #[tokio::test]
    async fn cancel_edit_discards_buffer() {
        let mut view = loaded(vec![task(1, "Test Todo", false)]).await;
        view.begin_edit(1);
        *view.edit_buffer_mut().unwrap() = "Changed".to_string();

        view.cancel_edit();

        assert_eq!(view.edit_mode(), &EditMode::NotEditing);
        assert_eq!(view.tasks()[0].title, "Test Todo");
        assert_eq!(view.save_edit(), None);
    }

    #[tokio::test]
    async fn save_applies_after_edit_was_cancelled() {
        let mut view = loaded(vec![task(1, "Test Todo", false), task(2, "Other", false)]).await;
        view.begin_edit(1);
        *view.edit_buffer_mut().unwrap() = "Renamed".to_string();
        let command = view.save_edit().unwrap();

        view.cancel_edit();
        view.begin_edit(2);

        let mut api = MockTodoApi::new();
        api.expect_update_task()
            .return_once(|_, _| Ok(task(1, "Renamed", false)));
        view.dispatch(&api, command).await;

        assert_eq!(view.tasks()[0].title, "Renamed");
        assert_eq!(view.editing_id(), Some(2));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_entry() {
        let mut view = loaded(vec![
            task(1, "a", false),
            task(2, "b", true),
            task(3, "c", false),
        ])
        .await;

        let mut api = MockTodoApi::new();
        api.expect_delete_task()
            .with(eq(2))
            .times(1)
            .return_once(|_| Ok(()));

        view.dispatch(&api, view.delete(2)).await;

        assert_eq!(view.tasks(), &[task(1, "a", false), task(3, "c", false)]);
        assert_eq!(view.completed_count(), 0);
        assert_partitioned(&view);
    }

    #[tokio::test]
    async fn delete_ends_edit_of_removed_task() {
        let mut view = loaded(vec![task(1, "a", false), task(2, "b", false)]).await;
        let command = view.delete(1);
        view.begin_edit(1);

        let mut api = MockTodoApi::new();
        api.expect_delete_task().return_once(|_| Ok(()));
        view.dispatch(&api, command).await;

        assert_eq!(view.edit_mode(), &EditMode::NotEditing);
        assert!(view.save_edit().is_none());
        assert_eq!(view.tasks(), &[task(2, "b", false)]);
    }

    #[tokio::test]
    async fn failed_delete_keeps_entry() {
        let mut view = loaded(vec![task(1, "a", false)]).await;

        let mut api = MockTodoApi::new();
        api.expect_delete_task()
            .return_once(|_| Err(ApiError::Http { status: 404 }));

        view.dispatch(&api, view.delete(1)).await;

        assert_eq!(view.tasks().len(), 1);
        assert_eq!(view.banner(), Some(DELETE_FAILED));
    }

    #[tokio::test]
    async fn success_clears_previous_banner() {
        let mut view = loaded(vec![task(1, "a", false)]).await;
        view.apply(Outcome::Deleted {
            id: 1,
            result: Err(ApiError::Http { status: 500 }),
        });
        assert_eq!(view.banner(), Some(DELETE_FAILED));

        view.apply(Outcome::Toggled {
            id: 1,
            result: Ok(task(1, "a", true)),
        });
        assert_eq!(view.status(), &Status::Idle);
    }

    #[test]
    fn outcomes_apply_in_arrival_order() {
        let mut view = TodoView::new();
        view.apply(Outcome::Loaded(Ok(vec![task(1, "a", false), task(2, "b", false)])));

        let first = view.toggle(1).unwrap();
        let second = view.toggle(2).unwrap();
        assert_ne!(first, second);

        view.apply(Outcome::Toggled {
            id: 2,
            result: Ok(task(2, "b", true)),
        });
        view.apply(Outcome::Toggled {
            id: 1,
            result: Ok(task(1, "a", true)),
        });

        assert!(view.tasks().iter().all(|t| t.completed));
        assert_eq!(ids(&view.sections().completed), vec![1, 2]);
    }

    #[test]
    fn mutation_during_initial_load_keeps_loading() {
        let mut view = TodoView::new();
        view.apply(Outcome::Created(Ok(task(5, "early", false))));
        assert!(view.is_loading());
        assert_eq!(view.tasks().len(), 1);
    }

    #[test]
    fn duplicate_ids_collapse_to_one_entry() {
        let mut view = TodoView::new();
        view.apply(Outcome::Loaded(Ok(vec![task(1, "old", false), task(1, "new", true)])));
        assert_eq!(view.tasks(), &[task(1, "new", true)]);

        view.apply(Outcome::Created(Ok(task(1, "again", false))));
        assert_eq!(view.tasks().len(), 1);
    }

    #[test]
    fn partition_holds_for_mixed_lists() {
        let mut view = TodoView::new();
        let tasks = (1..=12).map(|id| task(id, "t", id % 3 == 0)).collect();
        view.apply(Outcome::Loaded(Ok(tasks)));
        assert_partitioned(&view);
        assert_eq!(view.completed_count(), 4);
    }
}
