//! ServiceAccount lookup abstraction
//!
//! The admission pipeline only ever reads ServiceAccounts, and it needs to
//! distinguish "not found" (a normal outcome, no patch) from every other
//! lookup failure (fail the request). The [`ServiceAccountStore`] trait is
//! that seam; [`KubeStore`] is the production implementation over the
//! Kubernetes API.

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ServiceAccount;
use kube::{Api, Client};

use crate::error::Error;

/// Read-only access to ServiceAccounts by namespace and name
#[async_trait]
pub trait ServiceAccountStore: Send + Sync {
    /// Fetch a ServiceAccount, returning `None` when it does not exist
    ///
    /// Any failure other than "not found" is an error and must not be
    /// swallowed: the caller fails the admission request rather than
    /// silently dropping the ownership patch.
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<ServiceAccount>, Error>;
}

/// ServiceAccount store backed by the cluster API
pub struct KubeStore {
    client: Client,
    timeout: Duration,
}

impl KubeStore {
    /// Create a store over the given client with a per-lookup timeout
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl ServiceAccountStore for KubeStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<ServiceAccount>, Error> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);

        // Bound the lookup so a stalled API server cannot hold the admission
        // request past the caller's deadline.
        match tokio::time::timeout(self.timeout, api.get(name)).await {
            Ok(Ok(sa)) => Ok(Some(sa)),
            Ok(Err(kube::Error::Api(e))) if e.code == 404 => Ok(None),
            Ok(Err(e)) => Err(Error::Kube(e)),
            Err(_) => Err(Error::resolver(format!(
                "timed out after {:?} fetching serviceaccount {}/{}",
                self.timeout, namespace, name
            ))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fake::{owner_ref, FakeStore};
    use super::*;

    #[tokio::test]
    async fn fake_store_returns_none_for_missing_accounts() {
        let store = FakeStore::default();
        let found = store.get("ns1", "svcB").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn fake_store_returns_stored_accounts() {
        let store = FakeStore::default().with_account(
            "ns1",
            "svcA",
            vec![owner_ref("Foo", "example-foo", "97388dad-0000")],
        );

        let sa = store.get("ns1", "svcA").await.unwrap().unwrap();
        assert_eq!(sa.metadata.name.as_deref(), Some("svcA"));
        let owners = sa.metadata.owner_references.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].kind, "Foo");
    }

    #[tokio::test]
    async fn fake_store_propagates_failures() {
        let store = FakeStore::failing("connection refused");
        let err = store.get("ns1", "svcA").await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
