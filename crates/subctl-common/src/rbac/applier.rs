//! kube-rs backed [`ResourceApplier`]

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use kube::api::Api;
use kube::Client;

use super::ResourceApplier;
use crate::kube_utils::{create_or_update, metadata_matches, Ensurable};
use crate::Error;

impl Ensurable for ServiceAccount {
    fn matches_live(&self, live: &Self) -> bool {
        metadata_matches(&self.metadata, &live.metadata)
    }
}

impl Ensurable for Role {
    fn matches_live(&self, live: &Self) -> bool {
        metadata_matches(&self.metadata, &live.metadata) && self.rules == live.rules
    }
}

impl Ensurable for RoleBinding {
    fn matches_live(&self, live: &Self) -> bool {
        metadata_matches(&self.metadata, &live.metadata)
            && self.role_ref == live.role_ref
            && self.subjects == live.subjects
    }
}

impl Ensurable for ClusterRole {
    fn matches_live(&self, live: &Self) -> bool {
        metadata_matches(&self.metadata, &live.metadata)
            && self.rules == live.rules
            && self.aggregation_rule == live.aggregation_rule
    }
}

impl Ensurable for ClusterRoleBinding {
    fn matches_live(&self, live: &Self) -> bool {
        metadata_matches(&self.metadata, &live.metadata)
            && self.role_ref == live.role_ref
            && self.subjects == live.subjects
    }
}

/// Applies RBAC objects to a live cluster
pub struct KubeApplier {
    client: Client,
}

impl KubeApplier {
    /// Create a new applier for the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn apply_namespaced<K: Ensurable>(&self, namespace: &str, obj: &K) -> Result<bool, Error>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    {
        let mut obj = obj.clone();
        obj.meta_mut().namespace = Some(namespace.to_string());
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        create_or_update(&api, &obj).await
    }

    async fn apply_cluster<K: Ensurable>(&self, obj: &K) -> Result<bool, Error>
    where
        K: kube::Resource<Scope = k8s_openapi::ClusterResourceScope>,
    {
        let api: Api<K> = Api::all(self.client.clone());
        create_or_update(&api, obj).await
    }
}

#[async_trait]
impl ResourceApplier for KubeApplier {
    async fn apply_service_account(
        &self,
        namespace: &str,
        sa: &ServiceAccount,
    ) -> Result<bool, Error> {
        self.apply_namespaced(namespace, sa).await
    }

    async fn apply_role(&self, namespace: &str, role: &Role) -> Result<bool, Error> {
        self.apply_namespaced(namespace, role).await
    }

    async fn apply_role_binding(
        &self,
        namespace: &str,
        role_binding: &RoleBinding,
    ) -> Result<bool, Error> {
        self.apply_namespaced(namespace, role_binding).await
    }

    async fn apply_cluster_role(&self, cluster_role: &ClusterRole) -> Result<bool, Error> {
        self.apply_cluster(cluster_role).await
    }

    async fn apply_cluster_role_binding(
        &self,
        cluster_role_binding: &ClusterRoleBinding,
    ) -> Result<bool, Error> {
        self.apply_cluster(cluster_role_binding).await
    }
}
