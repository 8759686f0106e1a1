//! Spec diffing for endpoint mutations.
//!
//! Both builders start from the spec fetched from the service, apply the
//! requested change to a copy, and report whether the copy differs from the
//! original. Neither talks to the network; the result is meant to be fed to
//! [`crate::guard`].

use crate::error::Result;
use crate::guard;
use crate::types::{EndpointSpec, PolicySpec};
use std::collections::BTreeSet;
use std::fmt;

/// Requested changes to the worker target.
///
/// `None` fields are left as they are on the current spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetUpdate {
    /// New target namespace id.
    pub namespace: Option<String>,
    /// New target task queue.
    pub task_queue: Option<String>,
}

impl TargetUpdate {
    /// Whether no field was requested at all.
    pub fn is_empty(&self) -> bool {
        self.namespace.is_none() && self.task_queue.is_none()
    }
}

/// A candidate spec and whether it differs from the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecChange {
    /// The candidate spec.
    pub spec: EndpointSpec,
    /// True iff `spec` differs from the spec it was built from.
    pub changed: bool,
}

impl SpecChange {
    fn unchanged(current: &EndpointSpec) -> Self {
        Self {
            spec: current.clone(),
            changed: false,
        }
    }

    /// Pass the change through the update guard, yielding the new spec.
    pub fn into_guarded(self) -> Result<EndpointSpec> {
        guard::guard(self.changed)?;
        Ok(self.spec)
    }
}

/// Merge a target update into `current`.
pub fn build_target_update(current: &EndpointSpec, update: &TargetUpdate) -> SpecChange {
    let mut spec = current.clone();

    if let Some(namespace) = &update.namespace {
        spec.target_spec.namespace_id.clone_from(namespace);
    }
    if let Some(task_queue) = &update.task_queue {
        spec.target_spec.task_queue.clone_from(task_queue);
    }

    let changed = spec.target_spec != current.target_spec;
    SpecChange { spec, changed }
}

/// A single mutation of the caller-namespace allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowListChange {
    /// Allow one more namespace.
    Add(String),
    /// Replace the whole list with one namespace.
    Set(String),
    /// Stop allowing a namespace.
    Remove(String),
}

impl AllowListChange {
    /// The namespace the change is about.
    pub fn namespace(&self) -> &str {
        match self {
            Self::Add(ns) | Self::Set(ns) | Self::Remove(ns) => ns,
        }
    }

    /// Short verb for messages and prompts.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Set(_) => "set",
            Self::Remove(_) => "remove",
        }
    }
}

impl fmt::Display for AllowListChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} allowed namespace {}", self.verb(), self.namespace())
    }
}

/// Apply an allow-list change to `current`.
///
/// Namespaces are compared by membership only; list order is never
/// significant.
pub fn reconcile_allow_list(current: &EndpointSpec, change: &AllowListChange) -> SpecChange {
    match change {
        AllowListChange::Add(namespace) => {
            if current.allows(namespace) {
                return SpecChange::unchanged(current);
            }
            let mut spec = current.clone();
            spec.policy_specs.push(PolicySpec::new(namespace.as_str()));
            SpecChange {
                spec,
                changed: true,
            }
        }
        AllowListChange::Set(namespace) => {
            let mut spec = current.clone();
            spec.policy_specs = vec![PolicySpec::new(namespace.as_str())];
            let changed = namespace_set(&spec) != namespace_set(current);
            SpecChange { spec, changed }
        }
        AllowListChange::Remove(namespace) => {
            if !current.allows(namespace) {
                return SpecChange::unchanged(current);
            }
            let mut spec = current.clone();
            spec.policy_specs.retain(|p| &p.namespace_id != namespace);
            SpecChange {
                spec,
                changed: true,
            }
        }
    }
}

fn namespace_set(spec: &EndpointSpec) -> BTreeSet<&str> {
    spec.policy_specs
        .iter()
        .map(|p| p.namespace_id.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::TargetSpec;

    const A: &str = "test-caller-namespace.test-account-id";
    const B: &str = "test-caller-namespace-2.test-account-id";
    const C: &str = "test-another-caller-namespace.test-account-id";

    fn current() -> EndpointSpec {
        EndpointSpec::new(
            "test_name",
            TargetSpec::new("test-namespace-name.test-account-id", "test-task-queue"),
            [A, B],
        )
    }

    fn update(namespace: Option<&str>, task_queue: Option<&str>) -> TargetUpdate {
        TargetUpdate {
            namespace: namespace.map(str::to_string),
            task_queue: task_queue.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_target_update_never_changes() {
        let spec = current();
        let change = build_target_update(&spec, &TargetUpdate::default());
        assert!(!change.changed);
        assert_eq!(change.spec, spec);

        let bare = EndpointSpec::new("x", TargetSpec::new("", ""), Vec::<String>::new());
        let change = build_target_update(&bare, &TargetUpdate::default());
        assert!(!change.changed);
    }

    #[test]
    fn test_target_update_with_same_values() {
        let change = build_target_update(
            &current(),
            &update(
                Some("test-namespace-name.test-account-id"),
                Some("test-task-queue"),
            ),
        );
        assert!(!change.changed);
        assert!(matches!(change.into_guarded(), Err(Error::NoUpdate)));
    }

    #[test]
    fn test_target_update_task_queue_only() {
        let change =
            build_target_update(&current(), &update(None, Some("test-task-queue-updated")));
        assert!(change.changed);
        assert_eq!(
            change.spec.target_spec.task_queue,
            "test-task-queue-updated"
        );
        assert_eq!(
            change.spec.target_spec.namespace_id,
            "test-namespace-name.test-account-id"
        );
        assert_eq!(change.spec.policy_specs, current().policy_specs);
        assert_eq!(change.spec.name, "test_name");
    }

    #[test]
    fn test_target_update_namespace_only() {
        let change = build_target_update(
            &current(),
            &update(Some("test-namespace-name.test-account-id-updated"), None),
        );
        assert!(change.changed);
        assert_eq!(change.spec.target_spec.task_queue, "test-task-queue");
    }

    #[test]
    fn test_target_update_one_same_one_different() {
        let change = build_target_update(
            &current(),
            &update(
                Some("test-namespace-name.test-account-id"),
                Some("other-tq"),
            ),
        );
        assert!(change.changed);
        let spec = change.into_guarded().unwrap();
        assert_eq!(spec.target_spec.task_queue, "other-tq");
    }

    #[test]
    fn test_add_existing_namespace_is_noop() {
        let change = reconcile_allow_list(&current(), &AllowListChange::Add(A.to_string()));
        assert!(!change.changed);
        assert!(matches!(change.into_guarded(), Err(Error::NoUpdate)));
    }

    #[test]
    fn test_add_new_namespace_appends() {
        let change = reconcile_allow_list(&current(), &AllowListChange::Add(C.to_string()));
        assert!(change.changed);
        assert_eq!(change.spec.allowed_namespaces(), vec![A, B, C]);
        assert_eq!(change.spec.target_spec, current().target_spec);
    }

    #[test]
    fn test_remove_absent_namespace_is_noop() {
        let change = reconcile_allow_list(&current(), &AllowListChange::Remove(C.to_string()));
        assert!(!change.changed);
        assert_eq!(change.spec, current());
    }

    #[test]
    fn test_remove_present_namespace() {
        let change = reconcile_allow_list(&current(), &AllowListChange::Remove(A.to_string()));
        assert!(change.changed);
        assert_eq!(change.spec.allowed_namespaces(), vec![B]);
    }

    #[test]
    fn test_remove_is_case_sensitive() {
        let upper = A.to_uppercase();
        let change = reconcile_allow_list(&current(), &AllowListChange::Remove(upper));
        assert!(!change.changed);
    }

    #[test]
    fn test_set_to_member_of_larger_list_changes() {
        let change = reconcile_allow_list(&current(), &AllowListChange::Set(A.to_string()));
        assert!(change.changed);
        assert_eq!(change.spec.allowed_namespaces(), vec![A]);
    }

    #[test]
    fn test_set_to_same_single_namespace_is_noop() {
        let mut spec = current();
        spec.policy_specs = vec![PolicySpec::new(C)];
        let change = reconcile_allow_list(&spec, &AllowListChange::Set(C.to_string()));
        assert!(!change.changed);
    }

    #[test]
    fn test_set_on_empty_list_changes() {
        let mut spec = current();
        spec.policy_specs.clear();
        let change = reconcile_allow_list(&spec, &AllowListChange::Set(C.to_string()));
        assert!(change.changed);
        assert_eq!(change.spec.allowed_namespaces(), vec![C]);
    }

    #[test]
    fn test_add_then_remove_restores_membership() {
        let added = reconcile_allow_list(&current(), &AllowListChange::Add(C.to_string()));
        let removed = reconcile_allow_list(&added.spec, &AllowListChange::Remove(C.to_string()));
        assert!(removed.changed);
        assert_eq!(removed.spec, current());
    }

    #[test]
    fn test_allow_list_change_display() {
        let change = AllowListChange::Remove("ns.acct".to_string());
        assert_eq!(change.namespace(), "ns.acct");
        assert_eq!(change.to_string(), "remove allowed namespace ns.acct");
    }
}
