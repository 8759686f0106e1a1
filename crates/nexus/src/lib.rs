//! # nexus
//!
//! Nexus endpoint management against the cloud operations API.
//!
//! This crate provides functionality for:
//! - Resolving endpoints by name ([`Locator`])
//! - Computing target and allow-list changes ([`diff`])
//! - Refusing mutations that would change nothing ([`guard`])
//! - Issuing exactly one remote call per real change ([`Client`])
//!
//! ## Example
//!
//! ```no_run
//! use nexus::{AutoConfirm, Client, ConnectionSettings, TargetUpdate};
//!
//! let client = Client::new(&ConnectionSettings::default().api_key("my-api-key"));
//!
//! let update = TargetUpdate {
//!     task_queue: Some("orders-v2".to_string()),
//!     ..TargetUpdate::default()
//! };
//! let op = client
//!     .update("orders", &update, Some("req-42"), &mut AutoConfirm)
//!     .expect("update failed");
//! println!("Started async operation {}", op.id);
//! ```
//!
//! ## No-op detection
//!
//! Update-class operations fetch the endpoint, build the candidate spec, and
//! hand the result to the guard. If nothing differs the call fails with
//! [`Error::NoUpdate`] and no mutation is sent:
//!
//! ```
//! use nexus::backend::{MockBackend, Operation};
//! use nexus::{AllowListChange, AutoConfirm, Client, EndpointSpec, Error, TargetSpec};
//!
//! let mock = MockBackend::new();
//! mock.add_endpoint(EndpointSpec::new(
//!     "orders",
//!     TargetSpec::new("orders.acct", "orders-tq"),
//!     ["billing.acct"],
//! ));
//! let client = Client::with_backend(Box::new(mock.clone()));
//!
//! let change = AllowListChange::Add("billing.acct".to_string());
//! let err = client
//!     .change_allowed_namespaces("orders", &change, None, &mut AutoConfirm)
//!     .unwrap_err();
//! assert!(matches!(err, Error::NoUpdate));
//! assert_eq!(mock.call_count(Operation::Update), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod confirm;
pub mod diff;
pub mod error;
pub mod guard;
pub mod locate;
pub mod types;

pub use confirm::{AutoConfirm, AutoDecline, ConfirmCallback, ConfirmRequest};
pub use diff::{
    AllowListChange, SpecChange, TargetUpdate, build_target_update, reconcile_allow_list,
};
pub use error::{Error, ErrorCategory, Result};
pub use locate::Locator;
pub use types::{
    AsyncOperation, ConnectionSettings, CreateRequest, CreateResult, Endpoint, EndpointFilter,
    EndpointSpec, EndpointState, PolicySpec, TargetSpec,
};

use backend::Backend;
use backend::http::HttpBackend;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Endpoint names: a letter, then letters, digits, `_` or `-`.
const ENDPOINT_NAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_-]{0,199}$";

static ENDPOINT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ENDPOINT_NAME_PATTERN).expect("valid regex"));


/// High-level client for endpoint operations.
///
/// Each method performs a complete command: it fetches current state,
/// computes the change, and issues at most one remote mutation.
pub struct Client {
    backend: Box<dyn Backend>,
}

impl Client {
    /// Create a client talking to the cloud operations API.
    #[must_use]
    pub fn new(settings: &ConnectionSettings) -> Self {
        Self {
            backend: Box::new(HttpBackend::new(settings)),
        }
    }

    /// Create a client with a custom backend (useful for testing).
    #[must_use]
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    fn locator(&self) -> Locator<'_> {
        Locator::new(self.backend.as_ref())
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Get the endpoint named `name`.
    pub fn get(&self, name: &str) -> Result<Endpoint> {
        require("endpoint name", name)?;
        self.locator().locate(name)
    }

    /// List all endpoints visible to the account.
    pub fn list(&self) -> Result<Vec<Endpoint>> {
        self.locator().list()
    }

    /// Caller namespaces allowed on the endpoint named `name`.
    pub fn allowed_namespaces(&self, name: &str) -> Result<Vec<String>> {
        require("endpoint name", name)?;
        let endpoint = self.locator().locate(name)?;
        Ok(endpoint
            .spec
            .policy_specs
            .into_iter()
            .map(|p| p.namespace_id)
            .collect())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create an endpoint.
    pub fn create(
        &self,
        request: &CreateRequest,
        confirm: &mut dyn ConfirmCallback,
    ) -> Result<CreateResult> {
        validate_endpoint_name(&request.name)?;
        require("target namespace", &request.target_namespace)?;
        require("target task queue", &request.target_task_queue)?;
        if request.allowed_namespaces.is_empty() {
            return Err(Error::validation(
                "at least one allowed namespace is required",
            ));
        }
        let mut seen = BTreeSet::new();
        for namespace in &request.allowed_namespaces {
            require("allowed namespace", namespace)?;
            if !seen.insert(namespace.as_str()) {
                return Err(Error::validation(format!(
                    "duplicate allowed namespace '{namespace}'"
                )));
            }
        }

        let spec = EndpointSpec::new(
            request.name.as_str(),
            TargetSpec::new(
                request.target_namespace.as_str(),
                request.target_task_queue.as_str(),
            ),
            request.allowed_namespaces.iter().map(String::as_str),
        );

        ask(
            confirm,
            ConfirmRequest {
                action: "create endpoint",
                endpoint: &spec.name,
                before: None,
                after: Some(&spec),
            },
        )?;

        let result = self
            .backend
            .create_endpoint(&spec, request.request_id.as_deref().unwrap_or_default())?;
        log::info!(
            "Created endpoint '{}' with id {}",
            spec.name,
            result.endpoint_id
        );
        Ok(result)
    }

    /// Change the worker target of the endpoint named `name`.
    ///
    /// An empty `update` fails with [`Error::NoUpdate`] before the service is
    /// contacted at all.
    pub fn update(
        &self,
        name: &str,
        update: &TargetUpdate,
        request_id: Option<&str>,
        confirm: &mut dyn ConfirmCallback,
    ) -> Result<AsyncOperation> {
        require("endpoint name", name)?;
        guard::guard(!update.is_empty())?;
        if let Some(namespace) = &update.namespace {
            require("target namespace", namespace)?;
        }
        if let Some(task_queue) = &update.task_queue {
            require("target task queue", task_queue)?;
        }

        let endpoint = self.locator().locate(name)?;
        let spec = diff::build_target_update(&endpoint.spec, update).into_guarded()?;
        self.submit_update(&endpoint, &spec, "update endpoint", request_id, confirm)
    }

    /// Add, set or remove one caller namespace on the endpoint named `name`.
    pub fn change_allowed_namespaces(
        &self,
        name: &str,
        change: &AllowListChange,
        request_id: Option<&str>,
        confirm: &mut dyn ConfirmCallback,
    ) -> Result<AsyncOperation> {
        require("endpoint name", name)?;
        require("namespace", change.namespace())?;

        let endpoint = self.locator().locate(name)?;
        let spec = diff::reconcile_allow_list(&endpoint.spec, change).into_guarded()?;
        let action = format!(
            "{} allowed namespace {} on",
            change.verb(),
            change.namespace()
        );
        self.submit_update(&endpoint, &spec, &action, request_id, confirm)
    }

    /// Delete the endpoint named `name`.
    pub fn delete(
        &self,
        name: &str,
        request_id: Option<&str>,
        confirm: &mut dyn ConfirmCallback,
    ) -> Result<AsyncOperation> {
        require("endpoint name", name)?;
        let endpoint = self.locator().locate(name)?;

        ask(
            confirm,
            ConfirmRequest {
                action: "delete endpoint",
                endpoint: endpoint.name(),
                before: Some(&endpoint.spec),
                after: None,
            },
        )?;

        let op = self.backend.delete_endpoint(
            &endpoint.id,
            &endpoint.resource_version,
            request_id.unwrap_or_default(),
        )?;
        log::info!(
            "Deleting endpoint '{}' (async operation {})",
            endpoint.name(),
            op.id
        );
        Ok(op)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Confirm and send a guarded spec, pinned to the fetched version.
    fn submit_update(
        &self,
        endpoint: &Endpoint,
        spec: &EndpointSpec,
        action: &str,
        request_id: Option<&str>,
        confirm: &mut dyn ConfirmCallback,
    ) -> Result<AsyncOperation> {
        ask(
            confirm,
            ConfirmRequest {
                action,
                endpoint: endpoint.name(),
                before: Some(&endpoint.spec),
                after: Some(spec),
            },
        )?;

        let op = self.backend.update_endpoint(
            &endpoint.id,
            &endpoint.resource_version,
            spec,
            request_id.unwrap_or_default(),
        )?;
        log::info!(
            "Updating endpoint '{}' (async operation {})",
            endpoint.name(),
            op.id
        );
        Ok(op)
    }
}

fn ask(confirm: &mut dyn ConfirmCallback, request: ConfirmRequest<'_>) -> Result<()> {
    if confirm.confirm(&request)? {
        Ok(())
    } else {
        Err(Error::Cancelled)
    }
}

fn require(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{what} must not be empty")));
    }
    Ok(())
}

fn validate_endpoint_name(name: &str) -> Result<()> {
    require("endpoint name", name)?;
    if !ENDPOINT_NAME.is_match(name) {
        return Err(Error::validation(format!(
            "invalid endpoint name '{name}': must start with a letter and contain only \
             letters, digits, '_' or '-'"
        )));
    }
    Ok(())
}
