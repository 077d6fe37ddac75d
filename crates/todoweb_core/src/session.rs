//! Async driver that connects the controller to a store and a screen.

use crate::controller::{AppState, Effect, Event};
use crate::error::AppError;
use crate::model::Task;
use crate::notify::{NoopNotifier, NoticeLevel, NotificationSurface, Notifier};
use crate::remote::TaskStore;
use crate::render::{Page, RowIndex, render_page};
use std::collections::VecDeque;
use std::str::FromStr;
use std::time::Instant;
use time::UtcOffset;
use tracing::{debug, warn};

/// Whatever the user looks at.
pub trait Surface {
    fn paint(&mut self, page: &Page);

    /// Asks the user a yes/no question. Anything but an explicit yes is a no.
    fn confirm(&mut self, question: &str) -> bool;
}

/// How the user points at a task: a row number from the last render, or an id.
/// Bare digits are a row; `id:` selects an id verbatim, numeric ones included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRef {
    Row(usize),
    Id(String),
}

const ID_PREFIX: &str = "id:";

impl FromStr for TaskRef {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("task reference is required"));
        }

        if let Some(id) = trimmed.strip_prefix(ID_PREFIX) {
            let id = id.trim();
            if id.is_empty() {
                return Err(AppError::invalid_input("todo id is required after id:"));
            }
            return Ok(Self::Id(id.to_string()));
        }

        if trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            let row = trimmed
                .parse()
                .map_err(|_| AppError::invalid_input(format!("invalid row number: {trimmed}")))?;
            return Ok(Self::Row(row));
        }

        Ok(Self::Id(trimmed.to_string()))
    }
}

pub struct Session<S, U> {
    store: S,
    surface: U,
    state: AppState,
    notices: NotificationSurface,
    notifier: Box<dyn Notifier>,
    offset: UtcOffset,
    index: RowIndex,
    errors_shown: usize,
}

impl<S: TaskStore, U: Surface> Session<S, U> {
    pub fn new(store: S, surface: U) -> Self {
        Self {
            store,
            surface,
            state: AppState::new(),
            notices: NotificationSurface::new(),
            notifier: Box::new(NoopNotifier),
            offset: UtcOffset::UTC,
            index: RowIndex::default(),
            errors_shown: 0,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut U {
        &mut self.surface
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// Error notices shown since the session started.
    pub fn errors_shown(&self) -> usize {
        self.errors_shown
    }

    /// Runs `event` and everything it leads to, in order.
    pub async fn dispatch(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            for effect in self.state.handle(event) {
                if let Some(next) = self.run(effect).await {
                    queue.push_back(next);
                }
            }
        }
    }

    async fn run(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::Fetch => Some(Event::Loaded(self.store.list_tasks().await)),
            Effect::Create(task) => Some(Event::Created(self.store.create_task(&task).await)),
            Effect::Update { id, update } => {
                Some(Event::Updated(self.store.update_task(&id, &update).await))
            }
            Effect::Delete(id) => Some(Event::Deleted(self.store.delete_task(&id).await)),
            Effect::Confirm { id, question } => {
                if self.surface.confirm(&question) {
                    Some(Event::DeleteConfirmed(id))
                } else {
                    debug!(%id, "delete not confirmed");
                    Some(Event::DeleteDeclined)
                }
            }
            Effect::Notify(notice) => {
                if notice.level == NoticeLevel::Error {
                    self.errors_shown += 1;
                }
                if let Err(err) = self.notifier.notify(&notice) {
                    warn!(error = %err, "desktop notification failed");
                }
                self.notices.show(notice, Instant::now());
                None
            }
            Effect::HideError => {
                self.notices.hide_error();
                None
            }
            Effect::Render => {
                self.render();
                None
            }
        }
    }

    /// Page for the current state, without painting it.
    pub fn page(&self) -> Page {
        let view = self
            .state
            .load_attempted()
            .then(|| self.state.view());
        render_page(view, self.notices.visible(Instant::now()), self.offset)
    }

    /// Paints the current page and remembers its row index.
    pub fn render(&mut self) {
        self.notices.prune(Instant::now());
        let page = self.page();
        if let Some(list) = page.list.as_ref() {
            self.index = list.index.clone();
        }
        self.surface.paint(&page);
    }

    pub fn resolve(&self, reference: &TaskRef) -> Result<String, AppError> {
        match reference {
            TaskRef::Id(id) => Ok(id.clone()),
            TaskRef::Row(row) => self
                .index
                .resolve(*row)
                .map(str::to_string)
                .ok_or_else(|| AppError::invalid_input(format!("no row {row} in the current list"))),
        }
    }

    /// Fetches a single record straight from the store.
    pub async fn show(&self, reference: &TaskRef) -> Result<Task, AppError> {
        let id = self.resolve(reference)?;
        self.store.get_task(&id).await
    }
}
