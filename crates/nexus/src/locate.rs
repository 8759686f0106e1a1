//! Endpoint lookup by name.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{Endpoint, EndpointFilter};

/// Resolves endpoint names against a fresh listing.
///
/// Nothing is cached: every call performs exactly one list read.
pub struct Locator<'a> {
    backend: &'a dyn Backend,
}

impl<'a> Locator<'a> {
    /// Create a locator over `backend`.
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Find the endpoint named `name`.
    ///
    /// Matching is exact and case-sensitive. The name is also sent to the
    /// service as a filter, but results are always re-checked here.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no endpoint has that name.
    /// - [`Error::Ambiguous`] if more than one does.
    /// - Any backend error, unchanged.
    pub fn locate(&self, name: &str) -> Result<Endpoint> {
        let endpoints = self.backend.list_endpoints(&EndpointFilter::by_name(name))?;
        let mut matches: Vec<Endpoint> = endpoints
            .into_iter()
            .filter(|e| e.spec.name == name)
            .collect();

        match matches.len() {
            0 => Err(Error::NotFound {
                name: name.to_string(),
            }),
            1 => {
                let endpoint = matches.remove(0);
                log::debug!(
                    "Resolved endpoint '{}' to {} (version {})",
                    name,
                    endpoint.id,
                    endpoint.resource_version
                );
                Ok(endpoint)
            }
            count => Err(Error::Ambiguous {
                name: name.to_string(),
                count,
            }),
        }
    }

    /// All endpoints visible to the account.
    pub fn list(&self) -> Result<Vec<Endpoint>> {
        self.backend.list_endpoints(&EndpointFilter::all())
    }
}
