//! Ensure-rbac command - create or update the operator's RBAC objects
//!
//! Usage: subctl ensure-rbac [--kubeconfig <path>] [--namespace <ns>]

use std::path::PathBuf;

use clap::Args;
use subctl_common::kube_utils;
use subctl_common::rbac::{ensure_operator_rbac, EnsuredResource, KubeApplier};
use subctl_common::DEFAULT_SUBMARINER_NAMESPACE;

use super::CommandErrorExt;
use crate::Result;

/// Ensure the operator's service account, roles and bindings exist
#[derive(Args, Debug, Clone)]
pub struct EnsureRbacArgs {
    /// Path to kubeconfig for the target cluster (defaults to kube config inference)
    #[arg(short = 'k', long = "kubeconfig")]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace the operator runs in
    #[arg(short = 'n', long, default_value = DEFAULT_SUBMARINER_NAMESPACE)]
    pub namespace: String,
}

pub async fn run(args: EnsureRbacArgs) -> Result<()> {
    let client = kube_utils::create_client(args.kubeconfig.as_deref())
        .await
        .cmd_err()?;
    let applier = KubeApplier::new(client);

    let results = ensure_operator_rbac(&applier, &args.namespace).await?;
    for line in summary(&results) {
        println!("{}", line);
    }
    Ok(())
}

fn summary(results: &[EnsuredResource]) -> Vec<String> {
    results
        .iter()
        .map(|r| {
            let state = if r.changed {
                "created or updated"
            } else {
                "unchanged"
            };
            format!("  {} ({}): {}", r.kind, r.key, state)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reports_change_state() {
        let results = vec![
            EnsuredResource {
                kind: "ServiceAccount",
                key: "config/rbac/submariner-operator/service_account.yaml",
                changed: true,
            },
            EnsuredResource {
                kind: "ClusterRole",
                key: "config/rbac/submariner-operator/cluster_role.yaml",
                changed: false,
            },
        ];
        let lines = summary(&results);
        assert_eq!(
            lines[0],
            "  ServiceAccount (config/rbac/submariner-operator/service_account.yaml): created or updated"
        );
        assert!(lines[1].ends_with("unchanged"));
    }
}
