use std::fmt;
use std::str::FromStr;

/// Operating mode read from configuration at startup. Selects how a
/// validated BUY/SELL signal is routed; orthogonal
/// to a broker's own `auto_trading` flag, which is a separate safety gate
/// inside `prism-broker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Submit to the coordinator regardless of market hours; the broker
    /// itself decides whether to queue or reject an order placed while
    /// closed.
    Real,
    /// Submit immediately while the target market is open; defer to the
    /// scheduled-order store otherwise.
    Demo,
    /// Never call a broker. Every signal is logged and nothing else
    /// happens.
    DryRun,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Real => "real",
            Mode::Demo => "demo",
            Mode::DryRun => "dry-run",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown dispatcher mode: {0:?}")]
pub struct UnknownMode(String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "real" => Ok(Mode::Real),
            "demo" => Ok(Mode::Demo),
            "dry-run" | "dry_run" | "dryrun" => Ok(Mode::DryRun),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}
