//! Backend trait and implementations for talking to the remote service.
//!
//! The [`Backend`] trait is the whole surface the crate needs from the cloud
//! operations API: one read and three mutations. [`http::HttpBackend`] is the
//! real implementation.
//!
//! # Testing
//!
//! Use [`MockBackend`] for testing without network access:
//!
//! ```
//! use nexus::backend::{Backend, MockBackend, Operation};
//! use nexus::{EndpointFilter, EndpointSpec, TargetSpec};
//!
//! let mock = MockBackend::new();
//! mock.add_endpoint(EndpointSpec::new(
//!     "orders",
//!     TargetSpec::new("orders.acct", "orders-tq"),
//!     ["billing.acct"],
//! ));
//!
//! let endpoints = mock.list_endpoints(&EndpointFilter::all()).unwrap();
//! assert_eq!(endpoints.len(), 1);
//! assert_eq!(mock.call_count(Operation::List), 1);
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::{
    AsyncOperation, CreateResult, Endpoint, EndpointFilter, EndpointSpec, EndpointState,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Remote service operations needed by the client.
pub trait Backend: Send + Sync {
    /// List endpoints visible to the account.
    ///
    /// Implementations may page internally; callers see one logical read.
    fn list_endpoints(&self, filter: &EndpointFilter) -> Result<Vec<Endpoint>>;

    /// Create an endpoint.
    fn create_endpoint(&self, spec: &EndpointSpec, request_id: &str) -> Result<CreateResult>;

    /// Replace the spec of an endpoint.
    ///
    /// `resource_version` must be the version observed when the endpoint was
    /// fetched; the service rejects stale versions.
    fn update_endpoint(
        &self,
        id: &str,
        resource_version: &str,
        spec: &EndpointSpec,
        request_id: &str,
    ) -> Result<AsyncOperation>;

    /// Delete an endpoint.
    fn delete_endpoint(
        &self,
        id: &str,
        resource_version: &str,
        request_id: &str,
    ) -> Result<AsyncOperation>;
}

/// Remote operation kinds, used by [`MockBackend`] for scripting and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `list_endpoints`
    List,
    /// `create_endpoint`
    Create,
    /// `update_endpoint`
    Update,
    /// `delete_endpoint`
    Delete,
}

impl Operation {
    /// Whether this operation mutates remote state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::List)
    }
}

/// A call received by [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `list_endpoints`
    List {
        /// Filter passed by the caller.
        filter: EndpointFilter,
    },
    /// `create_endpoint`
    Create {
        /// Spec sent.
        spec: EndpointSpec,
        /// Request id sent.
        request_id: String,
    },
    /// `update_endpoint`
    Update {
        /// Endpoint id.
        id: String,
        /// Resource version sent.
        resource_version: String,
        /// Spec sent.
        spec: EndpointSpec,
        /// Request id sent.
        request_id: String,
    },
    /// `delete_endpoint`
    Delete {
        /// Endpoint id.
        id: String,
        /// Resource version sent.
        resource_version: String,
        /// Request id sent.
        request_id: String,
    },
}

impl Call {
    /// The operation kind of this call.
    pub fn operation(&self) -> Operation {
        match self {
            Self::List { .. } => Operation::List,
            Self::Create { .. } => Operation::Create,
            Self::Update { .. } => Operation::Update,
            Self::Delete { .. } => Operation::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    endpoints: Vec<Endpoint>,
    failures: HashMap<Operation, Vec<String>>,
    calls: Vec<Call>,
    next_id: u64,
}

/// In-memory backend for testing without network access.
///
/// Behaves like a tiny server: creates assign ids, updates replace the spec
/// and bump the resource version, deletes remove the endpoint. Failures can
/// be scripted per operation and every call is recorded.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock backend seeded with `endpoints`.
    #[must_use]
    pub fn with_endpoints(endpoints: Vec<Endpoint>) -> Self {
        let mock = Self::new();
        mock.lock().endpoints = endpoints;
        mock
    }

    /// Seed an endpoint built from `spec`, returning it.
    pub fn add_endpoint(&self, spec: EndpointSpec) -> Endpoint {
        let mut state = self.lock();
        state.next_id += 1;
        let endpoint = Endpoint {
            id: format!("mock-endpoint-{}", state.next_id),
            resource_version: "1".to_string(),
            spec,
            state: EndpointState::Active,
            async_operation_id: String::new(),
            created_time: None,
            last_modified_time: None,
        };
        state.endpoints.push(endpoint.clone());
        endpoint
    }

    /// Make the next call of `operation` fail with `message`.
    ///
    /// Failures queue up: scripting twice fails the next two calls.
    pub fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push(message.into());
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of calls received for `operation`.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Number of mutating calls received.
    pub fn mutation_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation().is_mutation())
            .count()
    }

    /// Current server-side endpoints.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.lock().endpoints.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn scripted_failure(state: &mut MockState, operation: Operation) -> Result<()> {
        match state.failures.get_mut(&operation) {
            Some(queue) if !queue.is_empty() => Err(Error::remote(queue.remove(0), None)),
            _ => Ok(()),
        }
    }

    fn async_operation(state: &mut MockState, request_id: &str) -> AsyncOperation {
        if request_id.is_empty() {
            state.next_id += 1;
            AsyncOperation::new(format!("mock-operation-{}", state.next_id))
        } else {
            AsyncOperation::new(request_id)
        }
    }

    fn find_mut<'a>(
        state: &'a mut MockState,
        id: &str,
        resource_version: &str,
    ) -> Result<&'a mut Endpoint> {
        let endpoint = state
            .endpoints
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| {
                Error::remote(format!("endpoint {id} does not exist"), Some(404))
            })?;
        if endpoint.resource_version != resource_version {
            return Err(Error::remote(
                format!(
                    "resource version mismatch: have {}, got {resource_version}",
                    endpoint.resource_version
                ),
                Some(409),
            ));
        }
        Ok(endpoint)
    }
}

impl Backend for MockBackend {
    fn list_endpoints(&self, filter: &EndpointFilter) -> Result<Vec<Endpoint>> {
        let mut state = self.lock();
        state.calls.push(Call::List {
            filter: filter.clone(),
        });
        Self::scripted_failure(&mut state, Operation::List)?;
        // Like the real service, the name filter is only a hint.
        Ok(state.endpoints.clone())
    }

    fn create_endpoint(&self, spec: &EndpointSpec, request_id: &str) -> Result<CreateResult> {
        let mut state = self.lock();
        state.calls.push(Call::Create {
            spec: spec.clone(),
            request_id: request_id.to_string(),
        });
        Self::scripted_failure(&mut state, Operation::Create)?;

        let operation = Self::async_operation(&mut state, request_id);
        state.next_id += 1;
        let endpoint = Endpoint {
            id: format!("mock-endpoint-{}", state.next_id),
            resource_version: "1".to_string(),
            spec: spec.clone(),
            state: EndpointState::Activating,
            async_operation_id: operation.id.clone(),
            created_time: None,
            last_modified_time: None,
        };
        let endpoint_id = endpoint.id.clone();
        state.endpoints.push(endpoint);

        Ok(CreateResult {
            endpoint_id,
            async_operation: Some(operation),
        })
    }

    fn update_endpoint(
        &self,
        id: &str,
        resource_version: &str,
        spec: &EndpointSpec,
        request_id: &str,
    ) -> Result<AsyncOperation> {
        let mut state = self.lock();
        state.calls.push(Call::Update {
            id: id.to_string(),
            resource_version: resource_version.to_string(),
            spec: spec.clone(),
            request_id: request_id.to_string(),
        });
        Self::scripted_failure(&mut state, Operation::Update)?;

        let operation = Self::async_operation(&mut state, request_id);
        let endpoint = Self::find_mut(&mut state, id, resource_version)?;
        let next_version = endpoint
            .resource_version
            .parse::<u64>()
            .map_or_else(
                |_| format!("{}-next", endpoint.resource_version),
                |v| (v + 1).to_string(),
            );
        endpoint.spec = spec.clone();
        endpoint.resource_version = next_version;
        endpoint.state = EndpointState::Updating;
        endpoint.async_operation_id = operation.id.clone();
        Ok(operation)
    }

    fn delete_endpoint(
        &self,
        id: &str,
        resource_version: &str,
        request_id: &str,
    ) -> Result<AsyncOperation> {
        let mut state = self.lock();
        state.calls.push(Call::Delete {
            id: id.to_string(),
            resource_version: resource_version.to_string(),
            request_id: request_id.to_string(),
        });
        Self::scripted_failure(&mut state, Operation::Delete)?;

        let operation = Self::async_operation(&mut state, request_id);
        Self::find_mut(&mut state, id, resource_version)?;
        state.endpoints.retain(|e| e.id != id);
        Ok(operation)
    }
}
