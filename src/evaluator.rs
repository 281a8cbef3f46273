use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    cursor::{Cursor, PathSegment, TreeError},
    expr::Expr,
    operator::{Action, OpError, Operator, OperatorRegistry, Phase},
    parser::{OpCall, ParseError, parse_call},
    value::Value,
};

/// Errors that can occur while evaluating a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("$.{location}: {source}")]
    Parse {
        location: Cursor,
        #[source]
        source: ParseError,
    },

    #[error("$.{location}: unknown operator `{name}`")]
    UnknownOperator { location: Cursor, name: String },

    #[error("cycle detected between operator calls at {}", join_locations(.0))]
    Cycle(Vec<Cursor>),

    #[error("$.{location}: {source}")]
    Operator {
        location: Cursor,
        operator: String,
        #[source]
        source: OpError,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

fn join_locations(locations: &[Cursor]) -> String {
    locations
        .iter()
        .map(|c| format!("$.{}", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// An operator call waiting to run.
struct PendingCall<'r> {
    location: Cursor,
    name: String,
    op: &'r dyn Operator,
    args: Vec<Expr>,
}

/// Finds `(( ... ))` calls in a document and replaces them with their results.
///
/// Calls run in data-flow order: a call runs only after every call
/// located at, under, or above one of its references.
pub struct Evaluator<'r> {
    tree: Value,
    /// Location of the call currently running
    here: Cursor,
    registry: &'r OperatorRegistry,
}

impl<'r> Evaluator<'r> {
    pub fn new(tree: Value, registry: &'r OperatorRegistry) -> Self {
        Evaluator {
            tree,
            here: Cursor::root(),
            registry,
        }
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn here(&self) -> &Cursor {
        &self.here
    }

    pub fn into_tree(self) -> Value {
        self.tree
    }

    /// Runs every call belonging to `phase`, returning how many ran.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis::{Evaluator, OperatorRegistry, Phase, Value};
    /// use std::collections::HashMap;
    ///
    /// let mut doc = HashMap::new();
    /// doc.insert("zones".to_string(), Value::String("(( cartesian-product \"z\" 1 ))".into()));
    ///
    /// let registry = OperatorRegistry::builtin().unwrap();
    /// let mut ev = Evaluator::new(Value::Object(doc), &registry);
    /// assert_eq!(ev.evaluate(Phase::Eval).unwrap(), 1);
    /// ```
    pub fn evaluate(&mut self, phase: Phase) -> Result<usize, EvalError> {
        let calls = self.collect_calls(phase)?;
        debug!(%phase, count = calls.len(), "collected operator calls");

        let deps = self.data_flow(&calls);
        let order = schedule(&calls, &deps)?;

        for idx in order {
            let call = &calls[idx];
            self.here = call.location.clone();
            trace!(here = %self.here, operator = %call.name, "running operator");

            let response = call
                .op
                .run(self, &call.args)
                .map_err(|source| EvalError::Operator {
                    location: call.location.clone(),
                    operator: call.name.clone(),
                    source,
                })?;

            match response.action {
                Action::Replace => call.location.set(&mut self.tree, response.value)?,
            }
        }

        self.here = Cursor::root();
        Ok(calls.len())
    }

    /// Parses every operator call in the document, whatever its phase,
    /// without running any. Returns how many were found.
    pub fn check(&self) -> Result<usize, EvalError> {
        Ok(self.find_calls()?.len())
    }

    fn find_calls(&self) -> Result<Vec<(Cursor, OpCall, &'r dyn Operator)>, EvalError> {
        let mut found = Vec::new();
        walk_strings(&self.tree, Cursor::root(), &mut found);

        let mut calls = Vec::new();
        for (location, src) in found {
            let parsed = parse_call(src).map_err(|source| EvalError::Parse {
                location: location.clone(),
                source,
            })?;
            let Some(call) = parsed else {
                continue;
            };

            let op = self
                .registry
                .get(&call.name)
                .ok_or_else(|| EvalError::UnknownOperator {
                    location: location.clone(),
                    name: call.name.clone(),
                })?;
            calls.push((location, call, op));
        }

        Ok(calls)
    }

    fn collect_calls(&self, phase: Phase) -> Result<Vec<PendingCall<'r>>, EvalError> {
        let mut calls = Vec::new();
        for (location, call, op) in self.find_calls()? {
            if op.phase() != phase {
                continue;
            }

            let args = call.args.iter().map(|arg| self.canonical_arg(arg)).collect();
            calls.push(PendingCall {
                location,
                name: call.name,
                op,
                args,
            });
        }

        Ok(calls)
    }

    // References that do not resolve yet are kept as written; the
    // operator reports them when it runs.
    fn canonical_arg(&self, arg: &Expr) -> Expr {
        match arg {
            Expr::Reference(cursor) => {
                Expr::Reference(cursor.canonical(&self.tree).unwrap_or_else(|_| cursor.clone()))
            }
            Expr::LogicalOr(left, right) => Expr::LogicalOr(
                Box::new(self.canonical_arg(left)),
                Box::new(self.canonical_arg(right)),
            ),
            other => other.clone(),
        }
    }

    /// For each call, the indices of the calls it waits on.
    fn data_flow(&self, calls: &[PendingCall<'r>]) -> Vec<Vec<usize>> {
        let candidates: Vec<Cursor> = calls.iter().map(|c| c.location.clone()).collect();
        let index_of = |path: &Cursor| candidates.iter().position(|c| c.same_as(path));

        calls
            .iter()
            .map(|call| {
                let mut paths = call.op.dependencies(self, &call.args, &candidates);
                for reference in call.args.iter().flat_map(Expr::references) {
                    paths.extend(candidates.iter().filter(|c| touches(reference, c)).cloned());
                }

                let mut deps: Vec<usize> = paths.iter().filter_map(index_of).collect();
                deps.sort_unstable();
                deps.dedup();
                trace!(here = %call.location, ?deps, "data flow");
                deps
            })
            .collect()
    }
}

/// A call at `location` has to run before anything reading `reference`
/// when it sits at, under, or above the referenced path.
fn touches(reference: &Cursor, location: &Cursor) -> bool {
    location.same_as(reference) || location.under(reference) || reference.under(location)
}

/// Stable topological order: among ready calls the earliest found runs first.
fn schedule(calls: &[PendingCall<'_>], deps: &[Vec<usize>]) -> Result<Vec<usize>, EvalError> {
    let mut done = vec![false; calls.len()];
    let mut order = Vec::with_capacity(calls.len());

    while order.len() < calls.len() {
        let next = (0..calls.len()).find(|&i| !done[i] && deps[i].iter().all(|&d| done[d]));
        match next {
            Some(i) => {
                done[i] = true;
                order.push(i);
            }
            None => {
                let stuck = (0..calls.len())
                    .filter(|&i| !done[i])
                    .map(|i| calls[i].location.clone())
                    .collect();
                return Err(EvalError::Cycle(stuck));
            }
        }
    }

    Ok(order)
}

/// Every string leaf with its location; map keys in sorted order.
fn walk_strings<'a>(value: &'a Value, at: Cursor, out: &mut Vec<(Cursor, &'a str)>) {
    match value {
        Value::String(s) => out.push((at, s)),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk_strings(item, at.push(PathSegment::Index(i as i64)), out);
            }
        }
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            for key in keys {
                walk_strings(&map[key], at.push(PathSegment::Field(key.clone())), out);
            }
        }
        Value::Null | Value::Boolean(_) | Value::Integer(_) | Value::Float(_) => {}
    }
}
