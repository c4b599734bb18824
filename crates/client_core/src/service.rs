//! Remote task service seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Assignment, NewParticipant, NewTask},
    error::{DashboardError, DashboardResult},
    protocol::{
        AddParticipantRequest, AddTaskRequest, ReassignmentDayResponse, ADD_PARTICIPANT_PATH,
        ADD_TASK_PATH, API_KEY_HEADER, REASSIGNMENT_DAY_PATH, REASSIGN_PATH, TASKS_PATH,
    },
};
use tracing::debug;
use url::Url;
use zeroize::Zeroize;

#[async_trait]
pub trait TaskService: Send + Sync {
    async fn fetch_assignments(&self) -> DashboardResult<Assignment>;
    async fn fetch_reassignment_day(&self) -> DashboardResult<bool>;
    async fn reassign(&self) -> DashboardResult<()>;
    async fn add_participant(&self, participant: &NewParticipant) -> DashboardResult<()>;
    async fn add_task(&self, task: &NewTask) -> DashboardResult<()>;
}

pub struct HttpTaskService {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpTaskService {
    pub fn new(base_url: &str) -> DashboardResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> DashboardResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::network(format!("failed to build http client: {e}")))?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> DashboardResult<Self> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            api_key: None,
        })
    }

    /// Sends `key` in the API key header on every mutation endpoint.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> DashboardResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| DashboardError::network(format!("invalid endpoint '{path}': {e}")))
    }

    fn mutation(&self, path: &str) -> DashboardResult<RequestBuilder> {
        let request = self.http.post(self.endpoint(path)?);
        Ok(match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key.as_str()),
            None => request,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, context: &str) -> DashboardResult<T> {
        let response = send(self.http.get(self.endpoint(path)?), context).await?;
        response
            .json()
            .await
            .map_err(|e| DashboardError::network(format!("{context}: malformed response: {e}")))
    }
}

impl Drop for HttpTaskService {
    fn drop(&mut self) {
        if let Some(key) = self.api_key.as_mut() {
            key.zeroize();
        }
    }
}

fn normalize_base_url(raw: &str) -> DashboardResult<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| DashboardError::network(format!("invalid server url '{raw}': {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn send(request: RequestBuilder, context: &str) -> DashboardResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| DashboardError::network(format!("{context}: {e}")))?;
    let status = response.status();
    debug!(%status, url = %response.url(), "task service responded");
    if status.is_success() {
        Ok(response)
    } else {
        Err(DashboardError::network(format!("{context}: HTTP {status}")))
    }
}

#[async_trait]
impl TaskService for HttpTaskService {
    async fn fetch_assignments(&self) -> DashboardResult<Assignment> {
        self.get_json(TASKS_PATH, "Failed to fetch tasks").await
    }

    async fn fetch_reassignment_day(&self) -> DashboardResult<bool> {
        let body: ReassignmentDayResponse = self
            .get_json(REASSIGNMENT_DAY_PATH, "Failed to fetch Saturday status")
            .await?;
        Ok(body.is_saturday)
    }

    async fn reassign(&self) -> DashboardResult<()> {
        const CONTEXT: &str = "Failed to update tasks";
        let response = self
            .mutation(REASSIGN_PATH)?
            .send()
            .await
            .map_err(|e| DashboardError::network(format!("{CONTEXT}: {e}")))?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DashboardError::auth(
                "reassignment rejected: missing or invalid credential proof",
            )),
            status => Err(DashboardError::network(format!("{CONTEXT}: HTTP {status}"))),
        }
    }

    async fn add_participant(&self, participant: &NewParticipant) -> DashboardResult<()> {
        let request = self
            .mutation(ADD_PARTICIPANT_PATH)?
            .json(&AddParticipantRequest::from(participant));
        send(request, "Failed to add student").await.map(|_| ())
    }

    async fn add_task(&self, task: &NewTask) -> DashboardResult<()> {
        let request = self
            .mutation(ADD_TASK_PATH)?
            .json(&AddTaskRequest::from(task));
        send(request, "Failed to add task").await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
