//! User actions as a state machine.
//!
//! [`AppState::handle`] takes one [`Event`] and returns the [`Effect`]s the
//! runtime has to carry out. It never touches the network or the screen, so
//! every transition can be exercised directly.

use crate::error::AppError;
use crate::model::{NewTask, Task, TaskUpdate};
use crate::notify::Notice;
use crate::view_state::ViewState;
use tracing::{debug, error};

pub const LOAD_FAILED: &str = "Failed to load todos. Please check your API URL and try again.";
pub const CREATE_FAILED: &str = "Failed to add todo. Please try again.";
pub const CREATED: &str = "Todo added successfully!";
pub const UPDATE_FAILED: &str = "Failed to update todo. Please try again.";
pub const UPDATED: &str = "Todo updated successfully!";
pub const DELETE_FAILED: &str = "Failed to delete todo. Please try again.";
pub const DELETED: &str = "Todo deleted successfully!";
pub const DELETE_QUESTION: &str = "Are you sure you want to delete this todo?";
pub const TASK_NOT_FOUND: &str = "Todo not found";
pub const NOT_EDITING: &str = "No todo is being edited";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    ErrorShown,
}

/// State of the control that triggers an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Control {
    #[default]
    Ready,
    /// The action's own request is outstanding.
    InFlight,
    /// The action succeeded and waits for its load cycle.
    Reloading,
}

impl Control {
    pub fn is_enabled(self) -> bool {
        self == Self::Ready
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl EditDraft {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            completed: task.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Refresh,
    SubmitCreate {
        title: String,
        description: String,
    },
    OpenEdit(String),
    SubmitEdit {
        title: String,
        description: String,
        completed: bool,
    },
    CancelEdit,
    RequestDelete(String),
    DeleteConfirmed(String),
    DeleteDeclined,
    Loaded(Result<Vec<Task>, AppError>),
    Created(Result<Option<Task>, AppError>),
    Updated(Result<Option<Task>, AppError>),
    Deleted(Result<(), AppError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch,
    Create(NewTask),
    Update { id: String, update: TaskUpdate },
    Delete(String),
    Confirm { id: String, question: String },
    Notify(Notice),
    HideError,
    Render,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    phase: Phase,
    view: ViewState,
    load_attempted: bool,
    create_form: CreateForm,
    create_control: Control,
    editor: Option<EditDraft>,
    edit_control: Control,
    pending_delete: Option<String>,
    delete_control: Control,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// True once any load cycle has finished, successfully or not.
    pub fn load_attempted(&self) -> bool {
        self.load_attempted
    }

    pub fn create_form(&self) -> &CreateForm {
        &self.create_form
    }

    pub fn create_control(&self) -> Control {
        self.create_control
    }

    pub fn editor(&self) -> Option<&EditDraft> {
        self.editor.as_ref()
    }

    pub fn edit_control(&self) -> Control {
        self.edit_control
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn delete_control(&self) -> Control {
        self.delete_control
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Refresh => self.refresh(),
            Event::SubmitCreate { title, description } => self.submit_create(title, description),
            Event::OpenEdit(id) => self.open_edit(&id),
            Event::SubmitEdit {
                title,
                description,
                completed,
            } => self.submit_edit(title, description, completed),
            Event::CancelEdit => {
                self.editor = None;
                Vec::new()
            }
            Event::RequestDelete(id) => self.request_delete(id),
            Event::DeleteConfirmed(id) => self.confirm_delete(id),
            Event::DeleteDeclined => {
                self.pending_delete = None;
                Vec::new()
            }
            Event::Loaded(result) => self.loaded(result),
            Event::Created(result) => self.created(result),
            Event::Updated(result) => self.updated(result),
            Event::Deleted(result) => self.deleted(result),
        }
    }

    fn refresh(&mut self) -> Vec<Effect> {
        if self.phase == Phase::Loading {
            debug!("load already in progress");
            return Vec::new();
        }
        self.start_load()
    }

    fn start_load(&mut self) -> Vec<Effect> {
        self.phase = Phase::Loading;
        vec![Effect::HideError, Effect::Fetch]
    }

    fn loaded(&mut self, result: Result<Vec<Task>, AppError>) -> Vec<Effect> {
        self.load_attempted = true;
        self.release_reloading();

        match result {
            Ok(tasks) => {
                debug!(count = tasks.len(), "todos loaded");
                self.view.replace(tasks);
                self.phase = Phase::Idle;
                vec![Effect::Render]
            }
            Err(err) => {
                error!(error = %err, "error loading todos");
                self.phase = Phase::ErrorShown;
                failure(LOAD_FAILED)
            }
        }
    }

    fn submit_create(&mut self, title: String, description: String) -> Vec<Effect> {
        if !self.create_control.is_enabled() {
            debug!("create already submitted");
            return Vec::new();
        }

        let validated = NewTask::new(&title, &description);
        self.create_form = CreateForm { title, description };
        match validated {
            Ok(task) => {
                self.create_control = Control::InFlight;
                vec![Effect::Create(task)]
            }
            Err(err) => failure(err.message()),
        }
    }

    fn created(&mut self, result: Result<Option<Task>, AppError>) -> Vec<Effect> {
        match result {
            Ok(echo) => {
                debug!(id = ?echo.map(|task| task.id), "todo created");
                self.create_form = CreateForm::default();
                self.create_control = Control::Reloading;
                self.succeeded(CREATED)
            }
            Err(err) => {
                error!(error = %err, "error adding todo");
                self.create_control = Control::Ready;
                failure(action_message(&err, CREATE_FAILED))
            }
        }
    }

    fn open_edit(&mut self, id: &str) -> Vec<Effect> {
        match self.view.find(id) {
            Some(task) => {
                self.editor = Some(EditDraft::from_task(task));
                Vec::new()
            }
            None => failure(TASK_NOT_FOUND),
        }
    }

    fn submit_edit(&mut self, title: String, description: String, completed: bool) -> Vec<Effect> {
        if !self.edit_control.is_enabled() {
            debug!("edit already submitted");
            return Vec::new();
        }

        let Some(draft) = self.editor.as_mut() else {
            return failure(NOT_EDITING);
        };

        let validated = TaskUpdate::new(&title, &description, completed);
        draft.title = title;
        draft.description = description;
        draft.completed = completed;
        match validated {
            Ok(update) => {
                self.edit_control = Control::InFlight;
                vec![Effect::Update {
                    id: draft.id.clone(),
                    update,
                }]
            }
            Err(err) => failure(err.message()),
        }
    }

    fn updated(&mut self, result: Result<Option<Task>, AppError>) -> Vec<Effect> {
        match result {
            Ok(echo) => {
                debug!(id = ?echo.map(|task| task.id), "todo updated");
                self.editor = None;
                self.edit_control = Control::Reloading;
                self.succeeded(UPDATED)
            }
            Err(err) => {
                error!(error = %err, "error updating todo");
                self.edit_control = Control::Ready;
                failure(action_message(&err, UPDATE_FAILED))
            }
        }
    }

    fn request_delete(&mut self, id: String) -> Vec<Effect> {
        if !self.delete_control.is_enabled() {
            debug!("delete already submitted");
            return Vec::new();
        }

        self.pending_delete = Some(id.clone());
        vec![Effect::Confirm {
            id,
            question: DELETE_QUESTION.to_string(),
        }]
    }

    fn confirm_delete(&mut self, id: String) -> Vec<Effect> {
        if self.pending_delete.as_deref() != Some(id.as_str()) {
            debug!(%id, "confirmation does not match a pending delete");
            return Vec::new();
        }

        self.pending_delete = None;
        self.delete_control = Control::InFlight;
        vec![Effect::Delete(id)]
    }

    fn deleted(&mut self, result: Result<(), AppError>) -> Vec<Effect> {
        match result {
            Ok(()) => {
                self.delete_control = Control::Reloading;
                self.succeeded(DELETED)
            }
            Err(err) => {
                error!(error = %err, "error deleting todo");
                self.delete_control = Control::Ready;
                failure(action_message(&err, DELETE_FAILED))
            }
        }
    }

    fn succeeded(&mut self, message: &str) -> Vec<Effect> {
        let mut effects = vec![Effect::Notify(Notice::success(message))];
        effects.extend(self.start_load());
        effects
    }

    fn release_reloading(&mut self) {
        for control in [
            &mut self.create_control,
            &mut self.edit_control,
            &mut self.delete_control,
        ] {
            if *control == Control::Reloading {
                *control = Control::Ready;
            }
        }
    }
}

fn failure<M: Into<String>>(message: M) -> Vec<Effect> {
    vec![Effect::Notify(Notice::error(message)), Effect::Render]
}

/// Validation messages are shown as-is; anything else gets the generic text.
fn action_message(err: &AppError, generic: &str) -> String {
    if err.is_validation() {
        err.message()
    } else {
        generic.to_string()
    }
}
