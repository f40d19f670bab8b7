use log::{debug, warn};
use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ApiClient, ApiError};

/// Default base url of the manoderecha API.
pub const API_BASE: &str = "http://manoderecha.net/md/index.php/api/v1/";

/// Manoderecha reads the basic auth credentials from this header.
const API_AUTHORIZATION: &str = "api-authorization";

/// A task in the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// The task id
    pub id: u64,
    /// The task's title
    #[serde(default)]
    pub concept: String,
    /// Whether someone is working on the task
    #[serde(default)]
    pub is_active: bool,
    /// Every other field the API returns
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// The marker shown next to the task, `>` for active tasks.
    /// ```
    /// # use release_email::api::manoderecha::Task;
    /// let task: Task = serde_json::from_str(r#"{"id": 1, "isActive": true}"#).unwrap();
    /// assert_eq!(task.status(), '>');
    /// ```
    pub fn status(&self) -> char {
        return if self.is_active { '>' } else { '.' };
    }
}

/// Client for the manoderecha task tracker.
#[derive(Debug, Clone)]
pub struct Manoderecha {
    client: ApiClient,
}

impl Manoderecha {
    /// Creates a client for the public API.
    pub fn new(user: &str, password: &str) -> Self {
        return Self::with_base(API_BASE, user, password);
    }

    /// Creates a client for an API at another base url.
    pub fn with_base(base: &str, user: &str, password: &str) -> Self {
        let client = ApiClient::new(base)
            .with_basic_auth(user, password)
            .with_auth_copy(HeaderName::from_static(API_AUTHORIZATION));
        return Self { client };
    }

    /// Calls the API, `Ok(None)` if nothing was found.
    pub fn call(&self, url: &str) -> Result<Option<Value>, ApiError> {
        return self.client.call(url);
    }

    /// Gets a single task.
    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>, ApiError> {
        return match self.call(&format!("tasks/{task_id}"))? {
            Some(task) => Ok(Some(serde_json::from_value(task)?)),
            None => Ok(None),
        };
    }

    /// Gets many tasks with a single request.
    /// No request is made for an empty list of ids.
    pub fn get_tasks(&self, task_ids: &[String]) -> Result<Vec<Task>, ApiError> {
        let tasks = self.get_many("tasks", task_ids)?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Task>, serde_json::Error>>()?;
        debug!("Got {} of {} tasks", tasks.len(), task_ids.len());
        return Ok(tasks);
    }

    /// Gets a single minute.
    pub fn get_minute(&self, minute_id: &str) -> Result<Option<Value>, ApiError> {
        return self.call(&format!("minutes/{minute_id}"));
    }

    /// Gets many minutes with a single request.
    pub fn get_minutes(&self, minute_ids: &[String]) -> Result<Vec<Value>, ApiError> {
        return self.get_many("minutes", minute_ids);
    }

    /// The API answers a single object when only one id is asked for.
    fn get_many(&self, resource: &str, ids: &[String]) -> Result<Vec<Value>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        return match self.call(&format!("{resource}/{}", ids.join(",")))? {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) => Ok(Vec::new()),
            Some(item) => Ok(vec![item]),
            None => {
                warn!("None of the {resource} {ids:?} were found");
                Ok(Vec::new())
            },
        };
    }
}
