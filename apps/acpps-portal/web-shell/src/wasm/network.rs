use super::*;

use std::time::Duration;

use acpps_client_core::api::{TaskStatusResponse, decode_task_status};
use acpps_client_core::config::TASK_ID_PLACEHOLDER;
use acpps_client_core::error::ClientError;
use acpps_client_core::launcher::{JSON_CONTENT_TYPE, StartRequest};
use acpps_client_core::poll::{PollTicker, TaskStatusSource};
use async_trait::async_trait;
use futures_util::StreamExt;
use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_timers::future::IntervalStream;
use web_sys::RequestCredentials;

/// Status code and body text; decoding is left to the caller.
#[derive(Debug)]
pub(super) struct RawResponse {
    pub(super) status: u16,
    pub(super) body: String,
}

pub(super) async fn post_empty(url: &str) -> Result<RawResponse, ClientError> {
    let response = post_builder(url)
        .send()
        .await
        .map_err(map_network_error)?;
    read_response(response).await
}

pub(super) async fn post_json<B: Serialize + ?Sized>(
    url: &str,
    body: &B,
) -> Result<RawResponse, ClientError> {
    let body = serde_json::to_string(body).map_err(|error| {
        ClientError::validation(format!("failed to serialize request body: {error}"))
    })?;
    let request = post_builder(url)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .body(body)
        .map_err(map_network_error)?;
    let response = request.send().await.map_err(map_network_error)?;
    read_response(response).await
}

/// The content type goes out even when the start carries no body.
pub(super) async fn post_task_start(
    url: &str,
    start: StartRequest,
) -> Result<RawResponse, ClientError> {
    let builder = post_builder(url).header("Content-Type", start.content_type);
    let response = match start.body {
        Some(body) => builder
            .body(body)
            .map_err(map_network_error)?
            .send()
            .await,
        None => builder.send().await,
    }
    .map_err(map_network_error)?;
    read_response(response).await
}

pub(super) async fn get(url: &str) -> Result<RawResponse, ClientError> {
    let response = Request::get(url)
        .credentials(RequestCredentials::SameOrigin)
        .send()
        .await
        .map_err(map_network_error)?;
    read_response(response).await
}

fn post_builder(url: &str) -> RequestBuilder {
    let builder = Request::post(url).credentials(RequestCredentials::SameOrigin);
    match csrf_token() {
        Some(token) => {
            let (name, value) = token.header();
            builder.header(name, value)
        }
        None => builder,
    }
}

async fn read_response(response: Response) -> Result<RawResponse, ClientError> {
    let status = response.status();
    let body = response.text().await.map_err(map_network_error)?;
    Ok(RawResponse { status, body })
}

pub(super) fn map_network_error(error: gloo_net::Error) -> ClientError {
    ClientError::transport(error)
}

/// Reads task status from the coordinator endpoint.
pub(super) struct HttpTaskStatusSource {
    pub(super) template: UrlTemplate,
}

#[async_trait(?Send)]
impl TaskStatusSource for HttpTaskStatusSource {
    async fn fetch_status(&self, task_id: &str) -> Result<TaskStatusResponse, ClientError> {
        let url = self
            .template
            .render_one(TASK_ID_PLACEHOLDER, task_id)
            .map_err(|error| ClientError::validation(error.to_string()))?;
        let raw = get(&url).await?;
        decode_task_status(raw.status, &raw.body)
    }
}

/// Fires once per interval; the first tick waits a full interval.
pub(super) struct IntervalTicker {
    stream: IntervalStream,
}

impl IntervalTicker {
    pub(super) fn new(interval: Duration) -> Self {
        let millis = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
        Self {
            stream: IntervalStream::new(millis),
        }
    }
}

#[async_trait(?Send)]
impl PollTicker for IntervalTicker {
    async fn tick(&mut self) {
        let _ = self.stream.next().await;
    }
}
