//! Owner-reference resolution for requesting ServiceAccounts
//!
//! The admission request carries the username of the principal creating the
//! object. ServiceAccount principals use the fixed form
//! `system:serviceaccount:<namespace>:<name>`; anything else (users, nodes,
//! controller identities) is not namespaced and never yields a patch.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use tracing::debug;

use crate::error::Error;
use crate::store::ServiceAccountStore;

/// Namespace and name parsed from a ServiceAccount username
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceAccountRef {
    /// Namespace the ServiceAccount lives in
    pub namespace: String,
    /// Name of the ServiceAccount
    pub name: String,
}

impl ServiceAccountRef {
    /// Parse a `system:serviceaccount:<namespace>:<name>` username
    ///
    /// Returns `None` for any other principal form, including usernames with
    /// extra colon-separated segments.
    pub fn parse(username: &str) -> Option<ServiceAccountRef> {
        let parts: Vec<&str> = username.split(':').collect();
        match parts.as_slice() {
            ["system", "serviceaccount", namespace, name] => Some(ServiceAccountRef {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            _ => None,
        }
    }
}

/// Resolve the owner reference to propagate for the given principal
///
/// Returns `Ok(None)` when the principal is not a ServiceAccount, when the
/// ServiceAccount does not exist, or when it carries no owner reference of
/// `target_kind`. Selection is first-match in list order. Store failures
/// other than "not found" propagate to the caller, which fails the request.
pub async fn resolve_owner(
    store: &dyn ServiceAccountStore,
    username: &str,
    target_kind: &str,
) -> Result<Option<OwnerReference>, Error> {
    let Some(sa_ref) = ServiceAccountRef::parse(username) else {
        debug!(username = %username, "Principal is not a ServiceAccount, skipping lookup");
        return Ok(None);
    };

    let Some(sa) = store.get(&sa_ref.namespace, &sa_ref.name).await? else {
        // A missing ServiceAccount is a normal outcome, not a failure
        debug!(
            namespace = %sa_ref.namespace,
            name = %sa_ref.name,
            "ServiceAccount not found, no owner to propagate"
        );
        return Ok(None);
    };

    Ok(sa
        .metadata
        .owner_references
        .unwrap_or_default()
        .into_iter()
        .find(|oref| oref.kind == target_kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fake::{owner_ref, FakeStore};

    // ==========================================================================
    // Unit Tests: username parsing
    // ==========================================================================

    #[test]
    fn parse_accepts_serviceaccount_usernames() {
        let sa_ref = ServiceAccountRef::parse("system:serviceaccount:ns1:svcA").unwrap();
        assert_eq!(sa_ref.namespace, "ns1");
        assert_eq!(sa_ref.name, "svcA");
    }

    #[test]
    fn parse_rejects_other_principals() {
        assert_eq!(ServiceAccountRef::parse("user:alice"), None);
        assert_eq!(ServiceAccountRef::parse("system:node:worker-1"), None);
        assert_eq!(ServiceAccountRef::parse("alice@example.com"), None);
        assert_eq!(ServiceAccountRef::parse(""), None);
    }

    #[test]
    fn parse_rejects_wrong_segment_counts() {
        // Three segments
        assert_eq!(ServiceAccountRef::parse("system:serviceaccount:ns1"), None);
        // Five segments
        assert_eq!(
            ServiceAccountRef::parse("system:serviceaccount:ns1:svcA:extra"),
            None
        );
    }

    #[test]
    fn parse_is_positional() {
        assert_eq!(
            ServiceAccountRef::parse("serviceaccount:system:ns1:svcA"),
            None
        );
    }

    // ==========================================================================
    // Unit Tests: resolution
    // ==========================================================================

    #[tokio::test]
    async fn resolves_matching_owner_reference() {
        let store = FakeStore::default().with_account(
            "ns1",
            "svcA",
            vec![owner_ref("Foo", "example-foo", "97388dad-0000")],
        );

        let owner = resolve_owner(&store, "system:serviceaccount:ns1:svcA", "Foo")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.kind, "Foo");
        assert_eq!(owner.name, "example-foo");
        assert_eq!(owner.uid, "97388dad-0000");
    }

    #[tokio::test]
    async fn non_serviceaccount_principal_resolves_to_none() {
        // The store would fail if queried; non-SA principals must short-circuit
        let store = FakeStore::failing("must not be queried");
        let owner = resolve_owner(&store, "user:alice", "Foo").await.unwrap();
        assert!(owner.is_none());
    }

    #[tokio::test]
    async fn missing_serviceaccount_resolves_to_none() {
        let store = FakeStore::default();
        let owner = resolve_owner(&store, "system:serviceaccount:ns1:svcB", "Foo")
            .await
            .unwrap();
        assert!(owner.is_none());
    }

    #[tokio::test]
    async fn no_matching_kind_resolves_to_none() {
        let store = FakeStore::default().with_account(
            "ns1",
            "svcA",
            vec![owner_ref("Bar", "some-bar", "11111111-0000")],
        );

        let owner = resolve_owner(&store, "system:serviceaccount:ns1:svcA", "Foo")
            .await
            .unwrap();
        assert!(owner.is_none());
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = FakeStore::failing("transient connectivity failure");
        let err = resolve_owner(&store, "system:serviceaccount:ns1:svcA", "Foo")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("transient connectivity failure"));
    }

    /// Regression: with two owner references of the target kind, the first in
    /// list order wins. There is no secondary ranking.
    #[tokio::test]
    async fn first_matching_reference_wins() {
        let store = FakeStore::default().with_account(
            "ns1",
            "svcA",
            vec![
                owner_ref("Bar", "not-the-target", "00000000-0000"),
                owner_ref("Foo", "first-foo", "11111111-0000"),
                owner_ref("Foo", "second-foo", "22222222-0000"),
            ],
        );

        let owner = resolve_owner(&store, "system:serviceaccount:ns1:svcA", "Foo")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.name, "first-foo");
    }
}
