//! Core types for endpoint management.
//!
//! These are the domain shapes the rest of the crate works with. The HTTP
//! backend converts its wire representation into these types, so nothing
//! outside [`crate::backend::http`] cares about the JSON layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A Nexus endpoint as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Server-assigned identifier, immutable after creation.
    pub id: String,
    /// Optimistic-concurrency token, changes on every mutation.
    pub resource_version: String,
    /// Desired configuration.
    pub spec: EndpointSpec,
    /// Lifecycle status.
    pub state: EndpointState,
    /// Id of the last async operation triggered against this endpoint.
    pub async_operation_id: String,
    /// When the endpoint was created.
    pub created_time: Option<DateTime<Utc>>,
    /// When the endpoint was last modified.
    pub last_modified_time: Option<DateTime<Utc>>,
}

impl Endpoint {
    /// Name of the endpoint.
    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

/// The user-controlled part of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSpec {
    /// Unique human identifier, used for lookup.
    pub name: String,
    /// Where calls to this endpoint are routed.
    pub target_spec: TargetSpec,
    /// Caller namespaces allowed to invoke this endpoint.
    pub policy_specs: Vec<PolicySpec>,
}

impl EndpointSpec {
    /// Build a spec from its parts.
    pub fn new(
        name: impl Into<String>,
        target_spec: TargetSpec,
        allowed_namespaces: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            target_spec,
            policy_specs: allowed_namespaces
                .into_iter()
                .map(PolicySpec::new)
                .collect(),
        }
    }

    /// Namespace ids on the allow-list, in stored order.
    pub fn allowed_namespaces(&self) -> Vec<&str> {
        self.policy_specs
            .iter()
            .map(|p| p.namespace_id.as_str())
            .collect()
    }

    /// Whether `namespace_id` is on the allow-list.
    pub fn allows(&self, namespace_id: &str) -> bool {
        self.policy_specs
            .iter()
            .any(|p| p.namespace_id == namespace_id)
    }
}

/// Worker target: the namespace and task queue that serve the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
    /// Target namespace id (`<namespace>.<account>`).
    pub namespace_id: String,
    /// Task queue polled by the target workers.
    pub task_queue: String,
}

impl TargetSpec {
    /// Build a target spec.
    pub fn new(namespace_id: impl Into<String>, task_queue: impl Into<String>) -> Self {
        Self {
            namespace_id: namespace_id.into(),
            task_queue: task_queue.into(),
        }
    }
}

/// One allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySpec {
    /// Caller namespace id permitted to invoke the endpoint.
    pub namespace_id: String,
}

impl PolicySpec {
    /// Allow-list entry for `namespace_id`.
    pub fn new(namespace_id: impl Into<String>) -> Self {
        Self {
            namespace_id: namespace_id.into(),
        }
    }
}

/// Lifecycle status reported by the server.
///
/// Values the client does not know about are preserved in [`Self::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndpointState {
    /// Being provisioned.
    Activating,
    /// Serving traffic.
    Active,
    /// An update is being applied.
    Updating,
    /// Being removed.
    Deleting,
    /// The last operation failed.
    Failed,
    /// Any other server value, verbatim.
    Other(String),
}

impl EndpointState {
    /// Wire representation of the state.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for EndpointState {
    fn from(s: String) -> Self {
        let normalized = s
            .trim()
            .trim_start_matches("STATE_")
            .trim_start_matches("RESOURCE_STATE_")
            .to_lowercase();
        match normalized.as_str() {
            "activating" => Self::Activating,
            "active" => Self::Active,
            "updating" => Self::Updating,
            "deleting" => Self::Deleting,
            "failed" | "activation_failed" | "update_failed" | "delete_failed" => Self::Failed,
            _ => Self::Other(s),
        }
    }
}

impl From<EndpointState> for String {
    fn from(state: EndpointState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for EndpointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle of a server-side async operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncOperation {
    /// Operation id (the request id when one was supplied).
    pub id: String,
    /// Server-reported state, if any.
    pub state: Option<String>,
}

impl AsyncOperation {
    /// Operation handle with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: None,
        }
    }
}

/// Result of a create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResult {
    /// Id assigned to the new endpoint.
    pub endpoint_id: String,
    /// Async operation tracking the provisioning, if reported.
    pub async_operation: Option<AsyncOperation>,
}

/// Filter passed to the list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointFilter {
    /// Server-side name hint. Callers still match names themselves.
    pub name: Option<String>,
}

impl EndpointFilter {
    /// Filter on everything visible to the account.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter hinting a single name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Parameters for creating an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    /// Endpoint name.
    pub name: String,
    /// Target namespace id.
    pub target_namespace: String,
    /// Target task queue.
    pub target_task_queue: String,
    /// Caller namespaces to allow.
    pub allowed_namespaces: Vec<String>,
    /// Idempotency token, forwarded verbatim.
    pub request_id: Option<String>,
}

/// Connection settings for the HTTP backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Base URL of the cloud operations API.
    pub server: String,
    /// API key sent as a bearer token.
    pub api_key: Option<String>,
    /// Value of the API version header.
    pub api_version: String,
    /// Global timeout for each HTTP call.
    pub timeout: Duration,
}

impl ConnectionSettings {
    /// Default API base URL.
    pub const DEFAULT_SERVER: &'static str = "https://saas-api.tmprl.cloud";
    /// Default API version header value.
    pub const DEFAULT_API_VERSION: &'static str = "2024-10-01-00";
    /// Default per-call timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Settings pointing at `server` with defaults for everything else.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            server: Self::DEFAULT_SERVER.to_string(),
            api_key: None,
            api_version: Self::DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}
