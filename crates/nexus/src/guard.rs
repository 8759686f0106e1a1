//! Update guard.
//!
//! Every update-class operation passes its computed delta through [`guard`]
//! before the remote mutate call. An empty delta ends the operation with
//! [`Error::NoUpdate`] and nothing is sent.

use crate::error::{Error, Result};

/// Allow a mutation only if something actually changed.
pub fn guard(changed: bool) -> Result<()> {
    if changed {
        Ok(())
    } else {
        log::debug!("Computed delta is empty, skipping remote update");
        Err(Error::NoUpdate)
    }
}
