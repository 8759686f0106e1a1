//! Cloud operations API backend.
//!
//! This module provides the [`HttpBackend`] implementation, a blocking JSON
//! client for the Nexus endpoint routes of the cloud operations API.
//!
//! Non-2xx responses are turned into [`Error::Remote`] carrying the
//! service's own `message` so that it reaches the user unchanged.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{
    AsyncOperation, ConnectionSettings, CreateResult, Endpoint, EndpointFilter, EndpointSpec,
    PolicySpec, TargetSpec,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ureq::Agent;
use ureq::http::Response;

/// Page size requested when listing endpoints.
const PAGE_SIZE: &str = "100";

/// Upper bound on pages followed in a single list call.
const MAX_PAGES: usize = 1000;

const USER_AGENT: &str = concat!("cloudctl/", env!("CARGO_PKG_VERSION"));

/// Cloud operations API backend.
///
/// # Example
///
/// ```no_run
/// use nexus::backend::Backend;
/// use nexus::backend::http::HttpBackend;
/// use nexus::{ConnectionSettings, EndpointFilter};
///
/// let settings = ConnectionSettings::default().api_key("my-api-key");
/// let backend = HttpBackend::new(&settings);
/// let endpoints = backend.list_endpoints(&EndpointFilter::all()).unwrap();
/// println!("Found {} endpoints", endpoints.len());
/// ```
pub struct HttpBackend {
    /// HTTP agent for requests.
    agent: Agent,
    /// API base URL, without trailing slash.
    api_base: String,
    /// Bearer token.
    api_key: Option<String>,
    /// API version header value.
    api_version: String,
}

impl HttpBackend {
    /// Create a backend from connection settings.
    #[must_use]
    pub fn new(settings: &ConnectionSettings) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(settings.timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            api_base: settings.server.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            api_version: settings.api_version.clone(),
        }
    }

    /// Get the API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoints_url(&self) -> String {
        format!("{}/cloud/nexus/endpoints", self.api_base)
    }

    fn endpoint_url(&self, id: &str) -> String {
        format!("{}/cloud/nexus/endpoints/{}", self.api_base, id)
    }

    fn authorization(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(|k| format!("Bearer {k}"))
    }

    fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        log::debug!("GET {url} {query:?}");
        let mut request = self
            .agent
            .get(url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .header("temporal-cloud-api-version", &self.api_version);
        if let Some(auth) = self.authorization() {
            request = request.header("Authorization", auth);
        }
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        read_response(request.call()?)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        log::debug!("POST {url}");
        let mut request = self
            .agent
            .post(url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .header("temporal-cloud-api-version", &self.api_version);
        if let Some(auth) = self.authorization() {
            request = request.header("Authorization", auth);
        }
        read_response(request.send_json(body)?)
    }

    fn delete<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        log::debug!("DELETE {url} {query:?}");
        let mut request = self
            .agent
            .delete(url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .header("temporal-cloud-api-version", &self.api_version);
        if let Some(auth) = self.authorization() {
            request = request.header("Authorization", auth);
        }
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        read_response(request.call()?)
    }
}

impl Backend for HttpBackend {
    fn list_endpoints(&self, filter: &EndpointFilter) -> Result<Vec<Endpoint>> {
        let url = self.endpoints_url();
        let mut endpoints = Vec::new();
        let mut page_token = String::new();

        for _ in 0..MAX_PAGES {
            let mut query = vec![("pageSize", PAGE_SIZE)];
            if let Some(name) = filter.name.as_deref() {
                query.push(("name", name));
            }
            if !page_token.is_empty() {
                query.push(("pageToken", page_token.as_str()));
            }

            let page: WireListResponse = self.get(&url, &query)?;
            endpoints.extend(page.endpoints.into_iter().map(Endpoint::from));

            if page.next_page_token.is_empty() {
                return Ok(endpoints);
            }
            page_token = page.next_page_token;
        }

        Err(Error::InvalidResponse(format!(
            "endpoint listing did not finish after {MAX_PAGES} pages"
        )))
    }

    fn create_endpoint(&self, spec: &EndpointSpec, request_id: &str) -> Result<CreateResult> {
        let body = WireCreateRequest {
            spec: spec.into(),
            async_operation_id: request_id,
        };
        let response: WireCreateResponse = self.post(&self.endpoints_url(), &body)?;
        Ok(CreateResult {
            endpoint_id: response.endpoint_id,
            async_operation: response.async_operation.map(Into::into),
        })
    }

    fn update_endpoint(
        &self,
        id: &str,
        resource_version: &str,
        spec: &EndpointSpec,
        request_id: &str,
    ) -> Result<AsyncOperation> {
        let body = WireUpdateRequest {
            spec: spec.into(),
            resource_version,
            async_operation_id: request_id,
        };
        let response: WireOperationResponse = self.post(&self.endpoint_url(id), &body)?;
        Ok(response.into_operation(request_id))
    }

    fn delete_endpoint(
        &self,
        id: &str,
        resource_version: &str,
        request_id: &str,
    ) -> Result<AsyncOperation> {
        let query = [
            ("resourceVersion", resource_version),
            ("asyncOperationId", request_id),
        ];
        let response: WireOperationResponse = self.delete(&self.endpoint_url(id), &query)?;
        Ok(response.into_operation(request_id))
    }
}

/// Decode a response body, turning non-2xx statuses into [`Error::Remote`].
fn read_response<T: DeserializeOwned>(mut response: Response<ureq::Body>) -> Result<T> {
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string()?;

    if !(200..300).contains(&status) {
        log::debug!("HTTP {status}: {body}");
        return Err(Error::remote(error_message(status, &body), Some(status)));
    }

    let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
    Ok(serde_json::from_str(body)?)
}

/// Extract the service's error message from a failed response body.
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<WireStatus>(body) {
        Ok(s) if !s.message.is_empty() => s.message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("HTTP {status}"),
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct WireStatus {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireListResponse {
    #[serde(default)]
    endpoints: Vec<WireEndpoint>,
    #[serde(default)]
    next_page_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireCreateRequest<'a> {
    spec: WireSpec,
    async_operation_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireUpdateRequest<'a> {
    spec: WireSpec,
    resource_version: &'a str,
    async_operation_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCreateResponse {
    #[serde(default)]
    endpoint_id: String,
    async_operation: Option<WireAsyncOperation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOperationResponse {
    async_operation: Option<WireAsyncOperation>,
}

impl WireOperationResponse {
    /// The reported operation, falling back to the request id when the
    /// service sends no operation or one without an id.
    fn into_operation(self, request_id: &str) -> AsyncOperation {
        let mut op = self
            .async_operation
            .map_or_else(|| AsyncOperation::new(request_id), AsyncOperation::from);
        if op.id.is_empty() {
            op.id = request_id.to_string();
        }
        op
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAsyncOperation {
    #[serde(default)]
    id: String,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEndpoint {
    #[serde(default)]
    id: String,
    #[serde(default)]
    resource_version: String,
    #[serde(default)]
    spec: WireSpec,
    #[serde(default)]
    state: String,
    #[serde(default)]
    async_operation_id: String,
    created_time: Option<DateTime<Utc>>,
    last_modified_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSpec {
    #[serde(default)]
    name: String,
    #[serde(default)]
    target_spec: WireTargetSpec,
    #[serde(default)]
    policy_specs: Vec<WirePolicySpec>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTargetSpec {
    #[serde(default)]
    worker_target_spec: WireWorkerTargetSpec,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWorkerTargetSpec {
    #[serde(default)]
    namespace_id: String,
    #[serde(default)]
    task_queue: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePolicySpec {
    #[serde(default)]
    allowed_cloud_namespace_policy_spec: WireAllowedNamespace,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAllowedNamespace {
    #[serde(default)]
    namespace_id: String,
}

impl From<WireEndpoint> for Endpoint {
    fn from(e: WireEndpoint) -> Self {
        Self {
            id: e.id,
            resource_version: e.resource_version,
            spec: e.spec.into(),
            state: e.state.into(),
            async_operation_id: e.async_operation_id,
            created_time: e.created_time,
            last_modified_time: e.last_modified_time,
        }
    }
}

impl From<WireSpec> for EndpointSpec {
    fn from(s: WireSpec) -> Self {
        let worker = s.target_spec.worker_target_spec;
        Self {
            name: s.name,
            target_spec: TargetSpec {
                namespace_id: worker.namespace_id,
                task_queue: worker.task_queue,
            },
            policy_specs: s
                .policy_specs
                .into_iter()
                .map(|p| PolicySpec {
                    namespace_id: p.allowed_cloud_namespace_policy_spec.namespace_id,
                })
                .collect(),
        }
    }
}

impl From<&EndpointSpec> for WireSpec {
    fn from(s: &EndpointSpec) -> Self {
        Self {
            name: s.name.clone(),
            target_spec: WireTargetSpec {
                worker_target_spec: WireWorkerTargetSpec {
                    namespace_id: s.target_spec.namespace_id.clone(),
                    task_queue: s.target_spec.task_queue.clone(),
                },
            },
            policy_specs: s
                .policy_specs
                .iter()
                .map(|p| WirePolicySpec {
                    allowed_cloud_namespace_policy_spec: WireAllowedNamespace {
                        namespace_id: p.namespace_id.clone(),
                    },
                })
                .collect(),
        }
    }
}

impl From<WireAsyncOperation> for AsyncOperation {
    fn from(op: WireAsyncOperation) -> Self {
        Self {
            id: op.id,
            state: op.state,
        }
    }
}
