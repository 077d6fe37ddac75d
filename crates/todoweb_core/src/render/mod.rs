//! Projection of the view snapshot into something a front end can paint.
//!
//! Everything here is a pure function of its inputs. Counts are recomputed on
//! every call, and the same inputs always produce the same [`Page`].

pub mod html;

use crate::model::{Task, TaskStatus};
use crate::notify::Notice;
use crate::view_state::ViewState;
use serde::Serialize;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub const EMPTY_STATE: &str = "No todos yet. Add one to get started!";
pub const INVALID_DATE: &str = "Invalid Date";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub banners: Vec<Notice>,
    /// `None` until the first load cycle has run.
    pub list: Option<ListView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub rows: Vec<Row>,
    pub counts: Counts,
    #[serde(skip)]
    pub index: RowIndex,
}

impl ListView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub number: usize,
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub completed: usize,
}

impl Counts {
    pub fn of(tasks: &[Task]) -> Self {
        Self {
            total: tasks.len(),
            completed: tasks.iter().filter(|task| task.completed).count(),
        }
    }

    pub fn total_label(&self) -> String {
        let suffix = if self.total == 1 { "" } else { "s" };
        format!("{} todo{}", self.total, suffix)
    }

    pub fn completed_label(&self) -> String {
        format!("{} completed", self.completed)
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.total_label(), self.completed_label())
    }
}

/// Row number (1-based, as displayed) to task id, for the last render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowIndex {
    ids: Vec<String>,
}

impl RowIndex {
    pub fn resolve(&self, row: usize) -> Option<&str> {
        row.checked_sub(1)
            .and_then(|position| self.ids.get(position))
            .map(String::as_str)
    }
}

pub fn render_list(view: &ViewState, offset: UtcOffset) -> ListView {
    let tasks = view.current();
    let rows: Vec<Row> = tasks
        .iter()
        .enumerate()
        .map(|(position, task)| Row {
            number: position + 1,
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description_text().map(str::to_string),
            status: task.status(),
            created: format_created(&task.created_at, offset),
        })
        .collect();
    let index = RowIndex {
        ids: rows.iter().map(|row| row.id.clone()).collect(),
    };

    ListView {
        rows,
        counts: Counts::of(tasks),
        index,
    }
}

pub fn render_page(view: Option<&ViewState>, banners: Vec<Notice>, offset: UtcOffset) -> Page {
    Page {
        banners,
        list: view.map(|view| render_list(view, offset)),
    }
}

/// Creation date as `M/D/YYYY` in `offset`. Timestamps without an offset are UTC.
pub fn format_created(raw: &str, offset: UtcOffset) -> String {
    let Some(created) = parse_timestamp(raw) else {
        return INVALID_DATE.to_string();
    };

    created
        .to_offset(offset)
        .date()
        .format(format_description!(
            "[month padding:none]/[day padding:none]/[year]"
        ))
        .unwrap_or_else(|_| INVALID_DATE.to_string())
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(value);
    }

    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    if let Ok(value) = PrimitiveDateTime::parse(trimmed, naive) {
        return Some(value.assume_utc());
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// Removes characters that a terminal would interpret instead of print.
pub fn strip_control(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\n' | '\t' => ' ',
            other => other,
        })
        .filter(|ch| !ch.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Counts, EMPTY_STATE, INVALID_DATE, format_created, render_list, strip_control};
    use crate::model::{Task, TaskStatus};
    use crate::view_state::ViewState;
    use time::UtcOffset;
    use time::macros::offset;

    fn task(id: &str, title: &str, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            completed,
            created_at: "2025-12-20T08:30:00.123456".to_string(),
            updated_at: None,
        }
    }

    #[test]
    fn empty_view_renders_zero_counts() {
        let list = render_list(&ViewState::new(), UtcOffset::UTC);

        assert!(list.is_empty());
        assert!(list.index.resolve(1).is_none());
        assert_eq!(list.counts.to_string(), "0 todos / 0 completed");
        assert!(!EMPTY_STATE.is_empty());
    }

    #[test]
    fn two_tasks_one_completed() {
        let mut view = ViewState::new();
        view.replace(vec![task("a", "done", true), task("b", "open", false)]);

        let list = render_list(&view, UtcOffset::UTC);

        assert_eq!(list.counts.to_string(), "2 todos / 1 completed");
        assert_eq!(list.rows[0].status.label(), "Completed");
        assert_eq!(list.rows[1].status, TaskStatus::Pending);
        assert_eq!(list.rows[1].status.label(), "Pending");
        assert_eq!(list.rows[0].created, "12/20/2025");
    }

    #[test]
    fn single_task_uses_singular_label() {
        let counts = Counts::of(&[task("a", "one", false)]);
        assert_eq!(counts.total_label(), "1 todo");
        assert_eq!(counts.completed_label(), "0 completed");
    }

    #[test]
    fn counts_never_exceed_total() {
        let tasks: Vec<Task> = (0..7)
            .map(|n| task(&format!("t{n}"), "x", n % 3 == 0))
            .collect();
        let counts = Counts::of(&tasks);

        assert_eq!(counts.total, tasks.len());
        assert_eq!(counts.completed, 3);
        assert!(counts.completed <= counts.total);
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut view = ViewState::new();
        view.replace(vec![task("a", "one", false), task("b", "two", true)]);

        assert_eq!(
            render_list(&view, UtcOffset::UTC),
            render_list(&view, UtcOffset::UTC)
        );
    }

    #[test]
    fn row_index_maps_displayed_numbers_to_ids() {
        let mut view = ViewState::new();
        view.replace(vec![task("a", "one", false), task("b", "two", true)]);

        let list = render_list(&view, UtcOffset::UTC);

        assert_eq!(list.index.resolve(1), Some("a"));
        assert_eq!(list.index.resolve(2), Some("b"));
        assert_eq!(list.index.resolve(0), None);
        assert_eq!(list.index.resolve(3), None);
    }

    #[test]
    fn created_date_honors_offset_and_formats() {
        assert_eq!(format_created("2025-12-20T23:30:00Z", UtcOffset::UTC), "12/20/2025");
        assert_eq!(
            format_created("2025-12-20T23:30:00Z", offset!(+2)),
            "12/21/2025"
        );
        assert_eq!(format_created("2025-01-05T10:00:00", offset!(-5)), "1/5/2025");
        assert_eq!(format_created("2025-01-05", UtcOffset::UTC), "1/5/2025");
        assert_eq!(format_created("yesterday", UtcOffset::UTC), INVALID_DATE);
        assert_eq!(format_created("", UtcOffset::UTC), INVALID_DATE);
    }

    #[test]
    fn strip_control_removes_escape_sequences() {
        assert_eq!(strip_control("red\x1b[31m text\nnext"), "red[31m text next");
        assert_eq!(strip_control("<script>"), "<script>");
    }
}
