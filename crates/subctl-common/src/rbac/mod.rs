//! Ensure operations for the operator's identity and permission objects
//!
//! Each operation reads a compiled-in template, applies any creation-time
//! fix-up, and hands the object to a [`ResourceApplier`] for an idempotent
//! create-or-update. Failures are returned as-is: nothing is retried and
//! objects applied earlier in a sequence are left in place.

mod applier;

pub use applier::KubeApplier;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use tracing::info;

#[cfg(test)]
use mockall::automock;

use crate::embedded;
use crate::Error;

/// Trait abstracting create-or-update calls, one per RBAC kind
///
/// Every method returns `true` when the object was created or updated and
/// `false` when the live object already matched.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceApplier: Send + Sync {
    /// Create or update a ServiceAccount in `namespace`
    async fn apply_service_account(
        &self,
        namespace: &str,
        sa: &ServiceAccount,
    ) -> Result<bool, Error>;

    /// Create or update a Role in `namespace`
    async fn apply_role(&self, namespace: &str, role: &Role) -> Result<bool, Error>;

    /// Create or update a RoleBinding in `namespace`
    async fn apply_role_binding(
        &self,
        namespace: &str,
        role_binding: &RoleBinding,
    ) -> Result<bool, Error>;

    /// Create or update a cluster-scoped ClusterRole
    async fn apply_cluster_role(&self, cluster_role: &ClusterRole) -> Result<bool, Error>;

    /// Create or update a cluster-scoped ClusterRoleBinding
    async fn apply_cluster_role_binding(
        &self,
        cluster_role_binding: &ClusterRoleBinding,
    ) -> Result<bool, Error>;
}

/// Ensure the ServiceAccount described by template `key` exists in `namespace`
pub async fn ensure_service_account(
    applier: &dyn ResourceApplier,
    namespace: &str,
    key: &str,
) -> Result<bool, Error> {
    let sa: ServiceAccount = embedded::get_object(key)?;
    applier.apply_service_account(namespace, &sa).await
}

/// Ensure the Role described by template `key` exists in `namespace`
pub async fn ensure_role(
    applier: &dyn ResourceApplier,
    namespace: &str,
    key: &str,
) -> Result<bool, Error> {
    let role: Role = embedded::get_object(key)?;
    applier.apply_role(namespace, &role).await
}

/// Ensure the RoleBinding described by template `key` exists in `namespace`
pub async fn ensure_role_binding(
    applier: &dyn ResourceApplier,
    namespace: &str,
    key: &str,
) -> Result<bool, Error> {
    let role_binding: RoleBinding = embedded::get_object(key)?;
    applier.apply_role_binding(namespace, &role_binding).await
}

/// Ensure the ClusterRole described by template `key` exists
pub async fn ensure_cluster_role(applier: &dyn ResourceApplier, key: &str) -> Result<bool, Error> {
    let cluster_role: ClusterRole = embedded::get_object(key)?;
    applier.apply_cluster_role(&cluster_role).await
}

/// Ensure the ClusterRoleBinding described by template `key` exists.
///
/// The template's first subject is bound to `namespace` before applying.
pub async fn ensure_cluster_role_binding(
    applier: &dyn ResourceApplier,
    namespace: &str,
    key: &str,
) -> Result<bool, Error> {
    let mut crb: ClusterRoleBinding = embedded::get_object(key)?;
    let subject = crb
        .subjects
        .as_mut()
        .and_then(|subjects| subjects.first_mut())
        .ok_or_else(|| {
            Error::serialization_for(
                "ClusterRoleBinding",
                format!("template {} has no subjects", key),
            )
        })?;
    subject.namespace = Some(namespace.to_string());
    applier.apply_cluster_role_binding(&crb).await
}

/// Outcome of ensuring one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredResource {
    /// Kubernetes kind
    pub kind: &'static str,
    /// Template key the object came from
    pub key: &'static str,
    /// Whether the object was created or updated
    pub changed: bool,
}

/// Ensure the full operator permission set in `namespace`.
///
/// Objects are applied in dependency order: service account, role, role
/// binding, cluster role, cluster role binding. Stops at the first error.
pub async fn ensure_operator_rbac(
    applier: &dyn ResourceApplier,
    namespace: &str,
) -> Result<Vec<EnsuredResource>, Error> {
    let mut results = Vec::with_capacity(5);

    let changed =
        ensure_service_account(applier, namespace, embedded::OPERATOR_SERVICE_ACCOUNT).await?;
    results.push(ensured("ServiceAccount", embedded::OPERATOR_SERVICE_ACCOUNT, changed));

    let changed = ensure_role(applier, namespace, embedded::OPERATOR_ROLE).await?;
    results.push(ensured("Role", embedded::OPERATOR_ROLE, changed));

    let changed = ensure_role_binding(applier, namespace, embedded::OPERATOR_ROLE_BINDING).await?;
    results.push(ensured("RoleBinding", embedded::OPERATOR_ROLE_BINDING, changed));

    let changed = ensure_cluster_role(applier, embedded::OPERATOR_CLUSTER_ROLE).await?;
    results.push(ensured("ClusterRole", embedded::OPERATOR_CLUSTER_ROLE, changed));

    let changed =
        ensure_cluster_role_binding(applier, namespace, embedded::OPERATOR_CLUSTER_ROLE_BINDING)
            .await?;
    results.push(ensured(
        "ClusterRoleBinding",
        embedded::OPERATOR_CLUSTER_ROLE_BINDING,
        changed,
    ));

    info!(
        namespace = %namespace,
        changed = results.iter().filter(|r| r.changed).count(),
        "Ensured operator RBAC"
    );
    Ok(results)
}

fn ensured(kind: &'static str, key: &'static str, changed: bool) -> EnsuredResource {
    EnsuredResource { kind, key, changed }
}
