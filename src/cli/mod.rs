//! CLI support for trellis
//!
//! Provides programmatic access to the `trellis` commands so they can be
//! embedded in other tools.

mod eval;

pub use eval::{EvalOptions, describe_operators, execute_eval};

use std::{io, sync::Once};

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Operator registry error: {0}")]
    Registry(#[from] crate::RegistryError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input, --file or pipe JSON to stdin.")]
    NoInput,
}

/// How chatty the diagnostic output is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Whatever `RUST_LOG` asks for (warnings by default)
    #[default]
    Env,
    Debug,
    Trace,
}

static TRACING_INIT: Once = Once::new();

/// Initialise tracing output on stderr.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_tracing(verbosity: Verbosity) {
    TRACING_INIT.call_once(|| {
        let filter = match verbosity {
            Verbosity::Env => {
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
            }
            Verbosity::Debug => EnvFilter::new("trellis=debug"),
            Verbosity::Trace => EnvFilter::new("trellis=trace"),
        };

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true).with_level(true))
            .with(filter)
            .init();
    });
}
