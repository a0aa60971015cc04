//! Verification registry and selection
//!
//! Turns the free-text `--only` list into the ordered filter patterns handed
//! to the e2e engine. Tokens are trimmed and lower-cased before lookup.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A named check mapped to the filter pattern that selects its tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Connectivity,
    ServiceDiscovery,
    /// Restarts the active gateway to exercise failover
    GatewayFailover,
}

impl Verification {
    pub const ALL: [Verification; 3] = [
        Verification::Connectivity,
        Verification::ServiceDiscovery,
        Verification::GatewayFailover,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Verification::Connectivity => "connectivity",
            Verification::ServiceDiscovery => "service-discovery",
            Verification::GatewayFailover => "gateway-failover",
        }
    }

    /// Regex fragment matched against test identifiers
    pub fn pattern(&self) -> &'static str {
        match self {
            Verification::Connectivity => r"\[dataplane",
            Verification::ServiceDiscovery => r"\[discovery",
            Verification::GatewayFailover => r"\[redundancy",
        }
    }

    /// Disruptive verifications change cluster state as a side effect
    pub fn is_disruptive(&self) -> bool {
        matches!(self, Verification::GatewayFailover)
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Verification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Verification::ALL
            .into_iter()
            .find(|v| v.name() == normalized)
            .ok_or(Error::UnknownVerification { name: normalized })
    }
}

/// Every known verification name, in declaration order
pub fn all_verification_names() -> Vec<&'static str> {
    Verification::ALL.iter().map(Verification::name).collect()
}

pub fn disruptive_verification_names() -> Vec<&'static str> {
    Verification::ALL
        .iter()
        .filter(|v| v.is_disruptive())
        .map(Verification::name)
        .collect()
}

/// Names of the disruptive verifications in `csv`, in input order.
///
/// Unknown names are ignored; [`check_verification_names`] reports them.
pub fn extract_disruptive_verifications(csv: &str) -> Vec<&'static str> {
    csv.split(',')
        .filter_map(|token| token.parse::<Verification>().ok())
        .filter(Verification::is_disruptive)
        .map(|v| v.name())
        .collect()
}

/// Fail on the first unknown name in `csv`.
pub fn check_verification_names(csv: &str) -> Result<()> {
    csv.split(',')
        .try_for_each(|token| token.parse::<Verification>().map(|_| ()))
}

/// Resolve `csv` into index-aligned (patterns, names) lists.
///
/// Disruptive verifications are dropped unless `enable_disruptive` is set.
/// Fails on any unknown name, or when nothing is left to run.
pub fn verify_patterns(
    csv: &str,
    enable_disruptive: bool,
) -> Result<(Vec<&'static str>, Vec<&'static str>)> {
    let mut patterns = Vec::new();
    let mut names = Vec::new();

    for token in csv.split(',') {
        let verification: Verification = token.parse()?;
        if verification.is_disruptive() && !enable_disruptive {
            continue;
        }
        patterns.push(verification.pattern());
        names.push(verification.name());
    }

    if patterns.is_empty() {
        return Err(Error::NothingToRun);
    }
    Ok((patterns, names))
}
