use thiserror::Error;

/// Errors raised while constructing engines or driving an editor session.
///
/// Per-call analysis and highlighting never fail; everything here is either a
/// construction-time problem or a host calling the session out of order.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid pattern for rule `{rule}`: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_yaml::Error),

    #[error("illegal session transition: `{event}` while {state}")]
    IllegalTransition {
        state: &'static str,
        event: &'static str,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
