//! Compiled-in YAML templates
//!
//! Templates are embedded at build time and looked up by the path they live
//! under in the operator's config tree, e.g.
//! `config/rbac/submariner-operator/service_account.yaml`.

use serde::de::DeserializeOwned;

use crate::Error;

/// Operator ServiceAccount template key
pub const OPERATOR_SERVICE_ACCOUNT: &str = "config/rbac/submariner-operator/service_account.yaml";
/// Operator Role template key
pub const OPERATOR_ROLE: &str = "config/rbac/submariner-operator/role.yaml";
/// Operator RoleBinding template key
pub const OPERATOR_ROLE_BINDING: &str = "config/rbac/submariner-operator/role_binding.yaml";
/// Operator ClusterRole template key
pub const OPERATOR_CLUSTER_ROLE: &str = "config/rbac/submariner-operator/cluster_role.yaml";
/// Operator ClusterRoleBinding template key
pub const OPERATOR_CLUSTER_ROLE_BINDING: &str =
    "config/rbac/submariner-operator/cluster_role_binding.yaml";

static TEMPLATES: &[(&str, &str)] = &[
    (
        OPERATOR_SERVICE_ACCOUNT,
        include_str!("../templates/rbac/submariner-operator/service_account.yaml"),
    ),
    (
        OPERATOR_ROLE,
        include_str!("../templates/rbac/submariner-operator/role.yaml"),
    ),
    (
        OPERATOR_ROLE_BINDING,
        include_str!("../templates/rbac/submariner-operator/role_binding.yaml"),
    ),
    (
        OPERATOR_CLUSTER_ROLE,
        include_str!("../templates/rbac/submariner-operator/cluster_role.yaml"),
    ),
    (
        OPERATOR_CLUSTER_ROLE_BINDING,
        include_str!("../templates/rbac/submariner-operator/cluster_role_binding.yaml"),
    ),
];

/// Return the raw YAML registered under `key`.
pub fn get(key: &str) -> Result<&'static str, Error> {
    TEMPLATES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, yaml)| *yaml)
        .ok_or_else(|| Error::TemplateNotFound {
            key: key.to_string(),
        })
}

/// Deserialize the template registered under `key` into a typed Kubernetes object.
///
/// Fails with [`Error::Serialization`] when the YAML is malformed or describes
/// a different kind than `K`.
pub fn get_object<K>(key: &str) -> Result<K, Error>
where
    K: k8s_openapi::Resource + DeserializeOwned,
{
    let yaml = get(key)?;
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::serialization_for(K::KIND, format!("template {}: {}", key, e)))
}
