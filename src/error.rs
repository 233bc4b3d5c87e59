//! Error types for rstcheck.
//!
//! Only a handful of conditions are hard errors. Missing configuration,
//! unrecognized prolog lines and code directives without a language all
//! degrade silently instead.

use std::path::PathBuf;

/// Error raised by the checker library.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An optional toolchain was explicitly requested but is not available.
    #[error("{feature} is not installed; rebuild rstcheck with the `{feature}` feature")]
    FeatureUnavailable {
        /// Name of the missing toolchain.
        feature: &'static str,
    },

    /// A checked file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// Path of the file that failed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `ignore_messages` is not a valid regular expression.
    #[error("invalid ignore_messages pattern")]
    InvalidRegex(#[from] regex::Error),

    /// Settings could not be assembled.
    #[error("configuration error")]
    Config(#[from] config::ConfigError),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
