//! Shared Kubernetes utilities using kube-rs
//!
//! Client construction from kubeconfig paths and the idempotent
//! create-or-update primitive the RBAC ensure operations are built on.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::Error;

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a kube client from an optional kubeconfig path.
///
/// With no path, the config is inferred (`KUBECONFIG`, `~/.kube/config`, or
/// in-cluster service account).
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client, Error> {
    create_client_with_timeout(kubeconfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT).await
}

/// Create a kube client from an optional kubeconfig path with custom timeouts
pub async fn create_client_with_timeout(
    kubeconfig: Option<&Path>,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client, Error> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::internal_with_context(
                    "create_client",
                    format!("failed to read kubeconfig {}: {}", path.display(), e),
                )
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    Error::internal_with_context(
                        "create_client",
                        format!("failed to load kubeconfig: {}", e),
                    )
                })?
        }
        None => Config::infer().await.map_err(|e| {
            Error::internal_with_context("create_client", format!("failed to infer config: {}", e))
        })?,
    };
    config.connect_timeout = Some(connect_timeout);
    config.read_timeout = Some(read_timeout);
    Client::try_from(config).map_err(|e| {
        Error::internal_with_context("create_client", format!("failed to create client: {}", e))
    })
}

/// A typed object that can be compared against its live counterpart.
///
/// Only the fields the desired object sets are compared, so defaults filled
/// in by the API server never count as drift.
pub trait Ensurable:
    Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Debug + Send + Sync + 'static
{
    /// Returns true when `live` already carries everything `self` specifies.
    fn matches_live(&self, live: &Self) -> bool;
}

/// Returns true if every label and annotation in `desired` is present on `live`
/// with the same value.
pub fn metadata_matches(desired: &ObjectMeta, live: &ObjectMeta) -> bool {
    map_contains(&desired.labels, &live.labels)
        && map_contains(&desired.annotations, &live.annotations)
}

fn map_contains(
    desired: &Option<BTreeMap<String, String>>,
    live: &Option<BTreeMap<String, String>>,
) -> bool {
    let Some(desired) = desired else {
        return true;
    };
    desired
        .iter()
        .all(|(k, v)| live.as_ref().and_then(|l| l.get(k)) == Some(v))
}

/// Create `desired` if it doesn't exist, replace it if the live object differs.
///
/// Returns `true` when the object was created or updated and `false` when the
/// live object already matched. API errors are returned unchanged; conflicts
/// are not retried here.
pub async fn create_or_update<K: Ensurable>(api: &Api<K>, desired: &K) -> Result<bool, Error> {
    let name = desired.meta().name.clone().ok_or_else(|| {
        Error::serialization_for(K::kind(&()).to_string(), "object has no metadata.name")
    })?;

    match api.get(&name).await {
        Ok(live) => {
            if desired.matches_live(&live) {
                debug!(kind = %K::kind(&()), name = %name, "Resource unchanged");
                return Ok(false);
            }
            let mut updated = desired.clone();
            updated.meta_mut().resource_version = live.resource_version();
            api.replace(&name, &PostParams::default(), &updated).await?;
            info!(kind = %K::kind(&()), name = %name, "Updated resource");
            Ok(true)
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            api.create(&PostParams::default(), desired).await?;
            info!(kind = %K::kind(&()), name = %name, "Created resource");
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}
