//! Evaluate operator calls in a JSON document

use tracing::debug;

use super::CliError;
use crate::{Evaluator, OperatorRegistry, Phase, Value};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// JSON document to evaluate
    pub input: Option<String>,
    /// Only check that every `(( ... ))` call parses and names a known
    /// operator; leave the document untouched
    pub skip_eval: bool,
}

/// Parse the input document, run every eval-phase operator and return
/// the resulting document.
pub fn execute_eval(
    options: &EvalOptions,
    registry: &OperatorRegistry,
) -> Result<serde_json::Value, CliError> {
    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let json_value: serde_json::Value = serde_json::from_str(json_str)?;

    let mut evaluator = Evaluator::new(Value::from(json_value), registry);
    if options.skip_eval {
        let found = evaluator.check()?;
        debug!(found, "operator calls checked, evaluation skipped");
    } else {
        evaluator.evaluate(Phase::Eval)?;
    }

    Ok(serde_json::Value::from(evaluator.into_tree()))
}

/// `name (phase)` lines for every registered operator
pub fn describe_operators(registry: &OperatorRegistry) -> Vec<String> {
    registry
        .names()
        .into_iter()
        .filter_map(|name| registry.get(name).map(|op| format!("{} ({})", name, op.phase())))
        .collect()
}
