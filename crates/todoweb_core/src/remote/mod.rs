//! Access to the external task API.
//!
//! [`TaskStore`] is the seam the session runtime talks to; [`HttpTaskStore`]
//! is the only production implementation. Every call is a single
//! request/response exchange: no caching, no retries.

mod http;

pub use http::HttpTaskStore;

use crate::error::AppError;
use crate::model::{NewTask, Task, TaskUpdate};
use serde::Deserialize;
use tracing::debug;

#[allow(async_fn_in_trait)]
pub trait TaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError>;

    async fn get_task(&self, id: &str) -> Result<Task, AppError>;

    /// Any 2xx reply is a success; the echoed record is returned when the
    /// body carries one.
    async fn create_task(&self, task: &NewTask) -> Result<Option<Task>, AppError>;

    async fn update_task(&self, id: &str, update: &TaskUpdate)
    -> Result<Option<Task>, AppError>;

    async fn delete_task(&self, id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Deserialize)]
struct TaskList {
    #[serde(default)]
    todos: Option<Vec<Task>>,
}

/// Single-record responses come either wrapped (`{"todo": {...}}`) or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskEnvelope {
    Wrapped { todo: Task },
    Bare(Task),
}

impl TaskEnvelope {
    fn into_task(self) -> Task {
        match self {
            Self::Wrapped { todo } => todo,
            Self::Bare(task) => task,
        }
    }
}

pub(crate) fn decode_task_list(body: &str) -> Result<Vec<Task>, AppError> {
    let list: TaskList = serde_json::from_str(body)?;
    Ok(list.todos.unwrap_or_default())
}

pub(crate) fn decode_task(body: &str) -> Result<Task, AppError> {
    let envelope: TaskEnvelope = serde_json::from_str(body)?;
    Ok(envelope.into_task())
}

/// Record echoed by a mutation reply, if the body holds one.
pub(crate) fn decode_echo(body: &str) -> Option<Task> {
    match decode_task(body) {
        Ok(task) => Some(task),
        Err(err) => {
            debug!(error = %err, "reply carries no todo record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_echo, decode_task, decode_task_list};

    #[test]
    fn list_without_todos_key_is_empty() {
        assert!(decode_task_list("{}").unwrap().is_empty());
        assert!(decode_task_list("{\"todos\": null}").unwrap().is_empty());
    }

    #[test]
    fn list_keeps_server_order() {
        let body = serde_json::json!({
            "todos": [
                {"id": "b", "title": "second", "completed": false, "created_at": "2025-12-21T00:00:00"},
                {"id": "a", "title": "first", "completed": true, "created_at": "2025-12-20T00:00:00"}
            ],
            "count": 2
        });
        let tasks = decode_task_list(&body.to_string()).unwrap();
        let ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn single_task_accepts_wrapper_and_bare_shapes() {
        let wrapped = serde_json::json!({
            "message": "Todo created successfully",
            "todo": {"id": "task-1", "title": "demo", "completed": false, "created_at": "2025-12-20T00:00:00"}
        });
        let bare = serde_json::json!(
            {"id": "task-1", "title": "demo", "completed": false, "created_at": "2025-12-20T00:00:00"}
        );

        assert_eq!(
            decode_task(&wrapped.to_string()).unwrap(),
            decode_task(&bare.to_string()).unwrap()
        );
    }

    #[test]
    fn unexpected_shape_is_invalid_data() {
        let err = decode_task("{\"message\": \"ok\"}").unwrap_err();
        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn echo_without_a_record_is_none() {
        let body = r#"{"message": "Todo created successfully", "id": "x1"}"#;
        assert!(decode_echo(body).is_none());
        assert!(decode_echo("").is_none());

        let wrapped = r#"{"todo": {"id": "x1", "title": "Buy milk"}}"#;
        assert_eq!(decode_echo(wrapped).map(|task| task.id), Some("x1".to_string()));
    }
}
