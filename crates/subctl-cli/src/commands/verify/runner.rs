//! Hand-off to the e2e test engine
//!
//! The engine is a separate suite binary. It receives the selected focus
//! patterns plus the cluster connection settings as ginkgo-style flags and
//! reports pass/fail through its exit status.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use super::VerifyConfig;
use crate::{Error, Result};

/// Prefix for report files written by the engine
pub const REPORT_PREFIX: &str = "subctl";

/// Identifiers the engine registers the two clusters under
pub const CLUSTER_IDS: [&str; 2] = ["ClusterA", "ClusterB"];

/// Specs slower than this are flagged in the report
pub const SLOW_SPEC_THRESHOLD: Duration = Duration::from_secs(60);

/// Everything the e2e engine needs for one run
#[derive(Debug, Clone, PartialEq)]
pub struct TestContext {
    pub kubeconfigs: Vec<PathBuf>,
    pub operation_timeout: Duration,
    pub connection_timeout: Duration,
    pub connection_attempts: u32,
    pub report_dir: PathBuf,
    pub report_prefix: String,
    pub submariner_namespace: String,
    pub cluster_ids: Vec<String>,
    /// Selected patterns joined with `|`
    pub focus: String,
    pub verbose: bool,
    pub slow_spec_threshold: Duration,
}

impl TestContext {
    pub fn new(config: &VerifyConfig, patterns: &[&str]) -> Self {
        Self {
            kubeconfigs: config.kubeconfigs.to_vec(),
            operation_timeout: config.operation_timeout,
            connection_timeout: config.connection_timeout,
            connection_attempts: config.connection_attempts,
            report_dir: config.report_dir.clone(),
            report_prefix: REPORT_PREFIX.to_string(),
            submariner_namespace: config.submariner_namespace.clone(),
            cluster_ids: CLUSTER_IDS.iter().map(|id| id.to_string()).collect(),
            focus: patterns.join("|"),
            verbose: config.verbose,
            slow_spec_threshold: SLOW_SPEC_THRESHOLD,
        }
    }

    /// Render the context as command-line flags for the suite binary
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--ginkgo.focus={}", self.focus),
            format!(
                "--ginkgo.slow-spec-threshold={}s",
                self.slow_spec_threshold.as_secs()
            ),
        ];
        if self.verbose {
            args.push("--ginkgo.v".to_string());
        }
        for kubeconfig in &self.kubeconfigs {
            args.push(format!("--kubeconfig={}", kubeconfig.display()));
        }
        args.extend([
            format!("--operation-timeout={}", self.operation_timeout.as_secs()),
            format!("--connection-timeout={}", self.connection_timeout.as_secs()),
            format!("--connection-attempts={}", self.connection_attempts),
            format!("--report-dir={}", self.report_dir.display()),
            format!("--report-prefix={}", self.report_prefix),
            format!("--submariner-namespace={}", self.submariner_namespace),
            format!("--cluster-ids={}", self.cluster_ids.join(",")),
        ]);
        args
    }
}

/// Runs the e2e suite and reports whether it passed
#[cfg_attr(test, automock)]
#[async_trait]
pub trait E2eRunner: Send + Sync {
    async fn run(&self, context: &TestContext) -> Result<bool>;
}

/// Runs the suite as a child process sharing our stdio
pub struct ProcessRunner {
    binary: PathBuf,
}

impl ProcessRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl E2eRunner for ProcessRunner {
    async fn run(&self, context: &TestContext) -> Result<bool> {
        let args = context.to_args();
        debug!(binary = %self.binary.display(), ?args, "Starting e2e suite");

        let status = tokio::process::Command::new(&self.binary)
            .args(&args)
            .status()
            .await
            .map_err(|e| {
                Error::command_failed(format!(
                    "failed to run e2e suite {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        info!(status = %status, "e2e suite finished");
        Ok(status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::verify::tests::test_config;

    #[test]
    fn context_carries_config_and_fixed_values() {
        let config = test_config();
        let ctx = TestContext::new(&config, &[r"\[dataplane", r"\[discovery"]);

        assert_eq!(ctx.focus, r"\[dataplane|\[discovery");
        assert_eq!(ctx.cluster_ids, vec!["ClusterA", "ClusterB"]);
        assert_eq!(ctx.report_prefix, "subctl");
        assert_eq!(ctx.slow_spec_threshold, Duration::from_secs(60));
        assert_eq!(ctx.kubeconfigs.len(), 2);
        assert_eq!(ctx.operation_timeout, Duration::from_secs(240));
    }

    #[test]
    fn args_include_focus_and_every_kubeconfig() {
        let config = test_config();
        let args = TestContext::new(&config, &[r"\[dataplane"]).to_args();

        assert!(args.contains(&r"--ginkgo.focus=\[dataplane".to_string()));
        assert!(args.contains(&"--kubeconfig=/tmp/east.yaml".to_string()));
        assert!(args.contains(&"--kubeconfig=/tmp/west.yaml".to_string()));
        assert!(args.contains(&"--connection-attempts=2".to_string()));
        assert!(args.contains(&"--cluster-ids=ClusterA,ClusterB".to_string()));
        assert!(!args.contains(&"--ginkgo.v".to_string()));
    }

    #[test]
    fn verbose_adds_ginkgo_v() {
        let mut config = test_config();
        config.verbose = true;
        let args = TestContext::new(&config, &[r"\[dataplane"]).to_args();
        assert!(args.contains(&"--ginkgo.v".to_string()));
    }

    #[tokio::test]
    async fn missing_binary_is_an_error() {
        let runner = ProcessRunner::new("/nonexistent/subctl-e2e");
        let ctx = TestContext::new(&test_config(), &[r"\[dataplane"]);
        let err = runner.run(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("failed to run e2e suite"));
    }
}
