use crate::error::AppError;
use crate::model::{NewTask, Task, TaskUpdate};
use crate::remote::{TaskStore, decode_echo, decode_task, decode_task_list};
use reqwest::{Method, RequestBuilder, Url};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("todoweb/", env!("CARGO_PKG_VERSION"));

/// [`TaskStore`] backed by the remote JSON API.
///
/// The base URL is the collection endpoint: lists and creates go to the base
/// itself, single-record calls append the id as one path segment.
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    client: reqwest::Client,
    base: Url,
}

impl HttpTaskStore {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| AppError::network(err.to_string()))?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, AppError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("api_url is required"));
        }

        let base = Url::parse(trimmed)
            .map_err(|err| AppError::invalid_input(format!("invalid api_url {trimmed}: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(AppError::invalid_input(format!(
                "api_url cannot be used as a base: {trimmed}"
            )));
        }

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn item_url(&self, id: &str) -> Result<Url, AppError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::invalid_input("api_url cannot be used as a base"))?
            .pop_if_empty()
            .push(trimmed);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "sending request");
        self.client.request(method, url)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<String, AppError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "remote store returned an error status");
            debug!(%body, "error response body");
            return Err(AppError::transport(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(body)
    }
}

impl TaskStore for HttpTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let request = self.request(Method::GET, self.base.clone());
        let body = self.execute(request).await?;
        decode_task_list(&body)
    }

    async fn get_task(&self, id: &str) -> Result<Task, AppError> {
        let request = self.request(Method::GET, self.item_url(id)?);
        let body = self.execute(request).await?;
        decode_task(&body)
    }

    async fn create_task(&self, task: &NewTask) -> Result<Option<Task>, AppError> {
        let request = self.request(Method::POST, self.base.clone()).json(task);
        let body = self.execute(request).await?;
        debug!(%body, "todo created");
        Ok(decode_echo(&body))
    }

    async fn update_task(
        &self,
        id: &str,
        update: &TaskUpdate,
    ) -> Result<Option<Task>, AppError> {
        let request = self.request(Method::PUT, self.item_url(id)?).json(update);
        let body = self.execute(request).await?;
        debug!(%id, %body, "todo updated");
        Ok(decode_echo(&body))
    }

    async fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let request = self.request(Method::DELETE, self.item_url(id)?);
        let body = self.execute(request).await?;
        debug!(%id, %body, "todo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::HttpTaskStore;
    use crate::model::{NewTask, TaskUpdate};
    use crate::remote::TaskStore;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn task_json(id: &str, title: &str, completed: bool) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": title,
            "description": "",
            "completed": completed,
            "created_at": "2025-12-20T08:30:00.123456",
            "updated_at": "2025-12-20T08:30:00.123456"
        })
    }

    async fn store_for(server: &MockServer) -> HttpTaskStore {
        HttpTaskStore::new(&format!("{}/todos", server.uri())).unwrap()
    }

    #[test]
    fn rejects_blank_and_relative_base_urls() {
        assert_eq!(HttpTaskStore::new("  ").unwrap_err().code(), "invalid_input");
        assert_eq!(
            HttpTaskStore::new("todos/api").unwrap_err().code(),
            "invalid_input"
        );
    }

    #[test]
    fn item_url_appends_encoded_segment() {
        let store = HttpTaskStore::new("https://api.example.com/prod/todos/").unwrap();
        let url = store.item_url("a b/c").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/prod/todos/a%20b%2Fc"
        );
        assert!(store.item_url(" ").is_err());
    }

    #[tokio::test]
    async fn list_tasks_reads_todos_wrapper() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "todos": [task_json("task-1", "one", false), task_json("task-2", "two", true)],
                "count": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tasks = store_for(&server).await.list_tasks().await.unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].id, "task-2");
        assert!(tasks[1].completed);
    }

    #[tokio::test]
    async fn create_task_posts_trimmed_body_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .and(body_json(serde_json::json!({"title": "Buy milk", "description": ""})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "message": "Todo created successfully",
                "todo": task_json("task-9", "Buy milk", false)
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let created = store
            .create_task(&NewTask::new(" Buy milk ", "").unwrap())
            .await
            .unwrap();

        assert_eq!(created.map(|task| task.id), Some("task-9".to_string()));
    }

    #[tokio::test]
    async fn create_reply_without_record_still_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "message": "Todo created successfully",
                "id": "x1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let created = store
            .create_task(&NewTask::new("Buy milk", "").unwrap())
            .await
            .unwrap();

        assert!(created.is_none());
    }

    #[tokio::test]
    async fn update_task_puts_to_item_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/todos/task-1"))
            .and(body_json(serde_json::json!({
                "title": "renamed",
                "description": "notes",
                "completed": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json(
                "task-1", "renamed", true,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let updated = store
            .update_task("task-1", &TaskUpdate::new("renamed", "notes", true).unwrap())
            .await
            .unwrap();

        assert!(updated.is_some_and(|task| task.completed));
    }

    #[tokio::test]
    async fn get_and_delete_use_item_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos/task-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "todo": task_json("task-1", "one", false)
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/todos/task-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Todo deleted successfully",
                "id": "task-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        assert_eq!(store.get_task("task-1").await.unwrap().title, "one");
        store.delete_task("task-1").await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/todos/task-1"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "Todo not found"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = store_for(&server).await;
        let err = store.delete_task("task-1").await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        let err = store.list_tasks().await.unwrap_err();
        assert_eq!(err.code(), "http_status");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn malformed_success_body_is_invalid_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = store_for(&server).await.list_tasks().await.unwrap_err();
        assert_eq!(err.code(), "invalid_data");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let base = format!("http://127.0.0.1:{port}/todos");

        let store = HttpTaskStore::new(&base).unwrap();
        let err = store.list_tasks().await.unwrap_err();
        assert_eq!(err.code(), "network_error");
    }
}
