//! Verify command - run connectivity verifications between two clusters
//!
//! Usage: subctl verify <kubeConfig1> <kubeConfig2> [--only ...] [--enable-disruptive]
//!
//! Verifications listed in `--only` are resolved to e2e focus patterns and
//! handed to the e2e suite. Disruptive verifications need either
//! `--enable-disruptive` or an interactive confirmation; without a terminal
//! they are skipped with a warning.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use subctl_common::DEFAULT_SUBMARINER_NAMESPACE;
use tracing::{info, warn};

pub mod confirm;
pub mod runner;
pub mod selection;

use confirm::{confirmer_for_stdin, Confirmation, Confirmer};
use runner::{E2eRunner, ProcessRunner, TestContext};
use selection::{
    all_verification_names, check_verification_names, disruptive_verification_names,
    extract_disruptive_verifications, verify_patterns,
};

use crate::{Error, Result};

/// Lower bound for `--connection-timeout`, in seconds
pub const MIN_CONNECTION_TIMEOUT_SECS: u64 = 60;

/// Lower bound for `--connection-attempts`
pub const MIN_CONNECTION_ATTEMPTS: u32 = 1;

/// Suite binary used when `--e2e-binary` is not given
pub const DEFAULT_E2E_BINARY: &str = "subctl-e2e";

/// Run verifications between two clusters
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Kubeconfigs of the two clusters to verify
    #[arg(value_name = "KUBECONFIG")]
    pub kubeconfigs: Vec<PathBuf>,

    /// Comma separated verifications to be performed
    #[arg(long, default_value_t = all_verification_names().join(","))]
    pub only: String,

    /// Enable disruptive verifications like gateway-failover
    #[arg(long)]
    pub enable_disruptive: bool,

    /// Produce verbose logs during connectivity verification
    #[arg(long)]
    pub verbose: bool,

    /// Operation timeout for K8s API calls, in seconds
    #[arg(long, default_value_t = 240)]
    pub operation_timeout: u64,

    /// The timeout in seconds per connection attempt
    #[arg(long, default_value_t = MIN_CONNECTION_TIMEOUT_SECS)]
    pub connection_timeout: u64,

    /// The maximum number of connection attempts
    #[arg(long, default_value_t = 2)]
    pub connection_attempts: u32,

    /// XML report directory
    #[arg(long, default_value = ".")]
    pub report_dir: PathBuf,

    /// Namespace in which submariner is deployed
    #[arg(long, default_value = DEFAULT_SUBMARINER_NAMESPACE)]
    pub submariner_namespace: String,

    /// Path to the e2e suite binary
    #[arg(long, env = "SUBCTL_E2E_BINARY", default_value = DEFAULT_E2E_BINARY)]
    pub e2e_binary: PathBuf,
}

/// Validated verify settings, built once from [`VerifyArgs`]
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyConfig {
    pub kubeconfigs: [PathBuf; 2],
    pub only: String,
    pub enable_disruptive: bool,
    pub verbose: bool,
    pub operation_timeout: Duration,
    pub connection_timeout: Duration,
    pub connection_attempts: u32,
    pub report_dir: PathBuf,
    pub submariner_namespace: String,
    pub e2e_binary: PathBuf,
}

impl TryFrom<VerifyArgs> for VerifyConfig {
    type Error = Error;

    fn try_from(args: VerifyArgs) -> Result<Self> {
        validate_arguments(&args)?;
        check_verification_names(&args.only)?;

        let kubeconfigs = <[PathBuf; 2]>::try_from(args.kubeconfigs)
            .map_err(|_| Error::validation("two kubeconfigs must be specified"))?;

        Ok(Self {
            kubeconfigs,
            only: args.only,
            enable_disruptive: args.enable_disruptive,
            verbose: args.verbose,
            operation_timeout: Duration::from_secs(args.operation_timeout),
            connection_timeout: Duration::from_secs(args.connection_timeout),
            connection_attempts: args.connection_attempts,
            report_dir: args.report_dir,
            submariner_namespace: args.submariner_namespace,
            e2e_binary: args.e2e_binary,
        })
    }
}

/// Check argument count and connection retry bounds.
pub fn validate_arguments(args: &VerifyArgs) -> Result<()> {
    if args.kubeconfigs.len() != 2 {
        return Err(Error::validation("two kubeconfigs must be specified"));
    }
    if args.connection_attempts < MIN_CONNECTION_ATTEMPTS {
        return Err(Error::validation(format!(
            "--connection-attempts must be >={}",
            MIN_CONNECTION_ATTEMPTS
        )));
    }
    if args.connection_timeout < MIN_CONNECTION_TIMEOUT_SECS {
        return Err(Error::validation(format!(
            "--connection-timeout must be >={}",
            MIN_CONNECTION_TIMEOUT_SECS
        )));
    }
    Ok(())
}

/// Long help for the verify command, listing the disruptive verifications
pub fn long_about() -> String {
    format!(
        "This command performs various tests to verify that a Submariner deployment between two clusters
is functioning properly. The verifications performed are controlled by the --only and --enable-disruptive
flags. All verifications listed in --only are performed with special handling for those deemed as disruptive.
A disruptive verification is one that changes the state of the clusters as a side effect. If running the
command interactively, you will be prompted for confirmation to perform disruptive verifications unless
the --enable-disruptive flag is also specified. If running non-interactively (that is with no stdin),
--enable-disruptive must be specified otherwise disruptive verifications are skipped.

The following verifications are deemed disruptive:

    {}",
        disruptive_verification_names().join("\n    ")
    )
}

/// Decide whether disruptive verifications may run.
///
/// Asks the operator only when the selection contains disruptive
/// verifications and `--enable-disruptive` wasn't given.
pub async fn resolve_enable_disruptive(
    config: &VerifyConfig,
    confirmer: &dyn Confirmer,
) -> Result<bool> {
    if config.enable_disruptive {
        return Ok(true);
    }

    let disruptive = extract_disruptive_verifications(&config.only);
    if disruptive.is_empty() {
        return Ok(false);
    }
    let names = disruptive.join(",");

    let question = format!(
        "You have specified disruptive verifications ({}). Are you sure you want to run them?",
        names
    );
    match confirmer.confirm(&question).await? {
        Confirmation::Accepted => Ok(true),
        Confirmation::Declined => {
            info!(verifications = %names, "Skipping disruptive verifications");
            Ok(false)
        }
        Confirmation::Unavailable => {
            warn!(
                "You have specified disruptive verifications ({}) but subctl is running non-interactively \
                 and thus cannot prompt for confirmation therefore you must specify --enable-disruptive to run them.",
                names
            );
            Ok(false)
        }
    }
}

/// Confirm, resolve the selection and run the suite.
pub async fn execute(
    config: &VerifyConfig,
    confirmer: &dyn Confirmer,
    runner: &dyn E2eRunner,
) -> Result<()> {
    let enable_disruptive = resolve_enable_disruptive(config, confirmer).await?;
    let (patterns, verifications) = verify_patterns(&config.only, enable_disruptive)?;

    println!(
        "Performing the following verifications: {}",
        verifications.join(", ")
    );

    let context = TestContext::new(config, &patterns);
    if !runner.run(&context).await? {
        return Err(Error::E2eFailed);
    }

    info!("All verifications passed");
    Ok(())
}

pub async fn run(args: VerifyArgs) -> Result<()> {
    let config = VerifyConfig::try_from(args)?;
    let confirmer = confirmer_for_stdin();
    let runner = ProcessRunner::new(config.e2e_binary.clone());
    execute(&config, confirmer.as_ref(), &runner).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use super::confirm::MockConfirmer;
    use super::runner::MockE2eRunner;

    fn args(kubeconfigs: &[&str]) -> VerifyArgs {
        VerifyArgs {
            kubeconfigs: kubeconfigs.iter().map(PathBuf::from).collect(),
            only: all_verification_names().join(","),
            enable_disruptive: false,
            verbose: false,
            operation_timeout: 240,
            connection_timeout: 60,
            connection_attempts: 2,
            report_dir: PathBuf::from("."),
            submariner_namespace: DEFAULT_SUBMARINER_NAMESPACE.to_string(),
            e2e_binary: PathBuf::from(DEFAULT_E2E_BINARY),
        }
    }

    pub(crate) fn test_config() -> VerifyConfig {
        VerifyConfig::try_from(args(&["/tmp/east.yaml", "/tmp/west.yaml"])).unwrap()
    }

    fn config_with(only: &str, enable_disruptive: bool) -> VerifyConfig {
        VerifyConfig {
            only: only.to_string(),
            enable_disruptive,
            ..test_config()
        }
    }

    #[test]
    fn exactly_two_kubeconfigs_required() {
        assert!(validate_arguments(&args(&["a", "b"])).is_ok());
        for bad in [&[][..], &["a"][..], &["a", "b", "c"][..]] {
            let err = validate_arguments(&args(bad)).unwrap_err();
            assert_eq!(
                err.to_string(),
                "validation error: two kubeconfigs must be specified"
            );
        }
    }

    #[test]
    fn connection_attempts_must_be_positive() {
        let mut a = args(&["a", "b"]);
        a.connection_attempts = 0;
        assert!(validate_arguments(&a)
            .unwrap_err()
            .to_string()
            .contains("--connection-attempts must be >=1"));
        a.connection_attempts = 1;
        assert!(validate_arguments(&a).is_ok());
    }

    #[test]
    fn connection_timeout_has_floor_of_sixty() {
        let mut a = args(&["a", "b"]);
        a.connection_timeout = 59;
        assert!(validate_arguments(&a)
            .unwrap_err()
            .to_string()
            .contains("--connection-timeout must be >=60"));
        a.connection_timeout = 60;
        assert!(validate_arguments(&a).is_ok());
    }

    #[test]
    fn config_rejects_unknown_names_before_prompting() {
        let mut a = args(&["a", "b"]);
        a.only = "connectivity,warp-drive".to_string();
        let err = VerifyConfig::try_from(a).unwrap_err();
        assert!(matches!(err, Error::UnknownVerification { ref name } if name == "warp-drive"));
    }

    #[test]
    fn config_accepts_disruptive_only_selection() {
        let mut a = args(&["a", "b"]);
        a.only = "gateway-failover".to_string();
        let config = VerifyConfig::try_from(a).unwrap();
        assert_eq!(config.connection_timeout, Duration::from_secs(60));
        assert_eq!(config.kubeconfigs[1], PathBuf::from("b"));
    }

    #[test]
    fn long_about_lists_disruptive_verifications() {
        assert!(long_about().ends_with("    gateway-failover"));
    }

    #[tokio::test]
    async fn no_prompt_when_flag_already_set() {
        let confirmer = MockConfirmer::new();
        let config = config_with("gateway-failover", true);
        assert!(resolve_enable_disruptive(&config, &confirmer).await.unwrap());
    }

    #[tokio::test]
    async fn no_prompt_without_disruptive_selection() {
        let confirmer = MockConfirmer::new();
        let config = config_with("connectivity,service-discovery", false);
        assert!(!resolve_enable_disruptive(&config, &confirmer).await.unwrap());
    }

    #[tokio::test]
    async fn prompt_names_disruptive_verifications() {
        let mut confirmer = MockConfirmer::new();
        confirmer
            .expect_confirm()
            .withf(|q| q.contains("(gateway-failover)"))
            .times(1)
            .returning(|_| Ok(Confirmation::Accepted));
        let config = config_with("connectivity, Gateway-Failover", false);
        assert!(resolve_enable_disruptive(&config, &confirmer).await.unwrap());
    }

    #[tokio::test]
    async fn declined_or_unavailable_keeps_disruptive_off() {
        for outcome in [Confirmation::Declined, Confirmation::Unavailable] {
            let mut confirmer = MockConfirmer::new();
            confirmer
                .expect_confirm()
                .times(1)
                .returning(move |_| Ok(outcome));
            let config = config_with("gateway-failover", false);
            assert!(!resolve_enable_disruptive(&config, &confirmer).await.unwrap());
        }
    }

    #[tokio::test]
    async fn execute_runs_selected_patterns() {
        let mut confirmer = MockConfirmer::new();
        confirmer
            .expect_confirm()
            .returning(|_| Ok(Confirmation::Accepted));
        let mut runner = MockE2eRunner::new();
        runner
            .expect_run()
            .withf(|ctx| {
                ctx.focus == r"\[dataplane|\[redundancy"
                    && ctx.cluster_ids == vec!["ClusterA".to_string(), "ClusterB".to_string()]
            })
            .times(1)
            .returning(|_| Ok(true));

        let config = config_with("connectivity,gateway-failover", false);
        execute(&config, &confirmer, &runner).await.unwrap();
    }

    #[tokio::test]
    async fn execute_skips_unconfirmed_disruptive() {
        let mut confirmer = MockConfirmer::new();
        confirmer
            .expect_confirm()
            .returning(|_| Ok(Confirmation::Unavailable));
        let mut runner = MockE2eRunner::new();
        runner
            .expect_run()
            .withf(|ctx| ctx.focus == r"\[discovery")
            .times(1)
            .returning(|_| Ok(true));

        let config = config_with("gateway-failover,service-discovery", false);
        execute(&config, &confirmer, &runner).await.unwrap();
    }

    #[tokio::test]
    async fn execute_with_nothing_left_never_runs_suite() {
        let mut confirmer = MockConfirmer::new();
        confirmer
            .expect_confirm()
            .returning(|_| Ok(Confirmation::Declined));
        let mut runner = MockE2eRunner::new();
        runner.expect_run().never();

        let config = config_with("gateway-failover", false);
        let err = execute(&config, &confirmer, &runner).await.unwrap_err();
        assert!(matches!(err, Error::NothingToRun));
    }

    #[tokio::test]
    async fn failed_suite_is_an_error() {
        let confirmer = MockConfirmer::new();
        let mut runner = MockE2eRunner::new();
        runner.expect_run().times(1).returning(|_| Ok(false));

        let config = config_with("connectivity", false);
        let err = execute(&config, &confirmer, &runner).await.unwrap_err();
        assert!(matches!(err, Error::E2eFailed));
    }
}
