//! The operator contract and the registry operators are looked up in.
//!
//! Every `(( name args... ))` call in a document is dispatched to the
//! [`Operator`] registered under `name`. Operators are stateless: all
//! they see is the [`Evaluator`] (for the tree and the current location)
//! and their parsed arguments.

use std::{collections::HashMap, fmt};

use thiserror::Error;
use tracing::debug;

use crate::{
    cursor::{Cursor, TreeError},
    evaluator::Evaluator,
    expr::Expr,
    operators::CartesianProduct,
    value::Value,
};

/// When in the evaluation pipeline an operator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// While documents are being merged together
    Merge,
    /// After merging, once the whole document is known
    Eval,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Merge => write!(f, "merge"),
            Phase::Eval => write!(f, "eval"),
        }
    }
}

/// What the evaluator should do with a [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Substitute the call site with the value
    Replace,
}

/// Result of a successful operator run.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub action: Action,
    pub value: Value,
}

impl Response {
    pub fn replace(value: Value) -> Self {
        Response {
            action: Action::Replace,
            value,
        }
    }
}

/// Errors an operator can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpError {
    /// Wrong number of arguments
    #[error("{0}")]
    Arity(String),

    /// An argument has a shape the operator cannot work with
    #[error("{0}")]
    Type(String),

    /// A reference argument does not exist in the tree
    #[error("Unable to resolve `{path}`: {source}")]
    Resolution {
        path: Cursor,
        #[source]
        source: TreeError,
    },

    #[error("Environment variable ${0} is not set")]
    UndefinedEnvVar(String),
}

/// A named unit of evaluation logic.
pub trait Operator: Send + Sync {
    /// One-time initialisation, called when the operator is registered.
    fn setup(&self) -> Result<(), OpError>;

    fn phase(&self) -> Phase;

    /// Which of `candidates` must be evaluated before this call can run.
    fn dependencies(&self, ev: &Evaluator<'_>, args: &[Expr], candidates: &[Cursor]) -> Vec<Cursor>;

    fn run(&self, ev: &Evaluator<'_>, args: &[Expr]) -> Result<Response, OpError>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("operator `{0}` is already registered")]
    Duplicate(String),

    #[error("setup of operator `{name}` failed: {source}")]
    Setup {
        name: String,
        #[source]
        source: OpError,
    },
}

/// Name → operator lookup table.
///
/// Built once at startup and only read afterwards; evaluators borrow it.
#[derive(Default)]
pub struct OperatorRegistry {
    operators: HashMap<&'static str, Box<dyn Operator>>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every operator this crate ships.
    pub fn builtin() -> Result<Self, RegistryError> {
        OperatorRegistry::new().register("cartesian-product", CartesianProduct)
    }

    /// Runs `setup` for `op` and adds it under `name`.
    pub fn register(
        mut self,
        name: &'static str,
        op: impl Operator + 'static,
    ) -> Result<Self, RegistryError> {
        if self.operators.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        op.setup().map_err(|source| RegistryError::Setup {
            name: name.to_string(),
            source,
        })?;

        debug!(operator = name, phase = %op.phase(), "registered operator");
        self.operators.insert(name, Box::new(op));
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Operator> {
        self.operators.get(name).map(|op| op.as_ref())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operators.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}
