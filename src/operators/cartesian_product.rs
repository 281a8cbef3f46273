//! `(( cartesian-product a b ... ))`
//!
//! Combines every element of each argument with every element of the
//! next one, concatenating them into strings:
//!
//! ```text
//! meta:
//!   hosts: [a, b]
//!   ports: [80, 443]
//! urls: (( cartesian-product meta.hosts ":" meta.ports ))
//! # urls: [a:80, a:443, b:80, b:443]
//! ```

use tracing::{debug, trace};

use crate::{
    cursor::Cursor,
    evaluator::Evaluator,
    expr::Expr,
    operator::{OpError, Operator, Phase, Response},
    value::Value,
};

const NESTED_LIST: &str = "cartesian-product operator can only operate on lists of scalar values";
const MAP_ARGUMENT: &str = "cartesian-product operator only accepts arrays and string values";
const BAD_ARGUMENT: &str = "cartesian-product operator only accepts key reference arguments";

#[derive(Debug, Clone, Copy, Default)]
pub struct CartesianProduct;

impl Operator for CartesianProduct {
    fn setup(&self) -> Result<(), OpError> {
        Ok(())
    }

    fn phase(&self) -> Phase {
        Phase::Eval
    }

    fn dependencies(&self, _ev: &Evaluator<'_>, args: &[Expr], candidates: &[Cursor]) -> Vec<Cursor> {
        let mut deps = Vec::new();

        for arg in args {
            let Expr::Reference(target) = arg else {
                continue;
            };
            deps.extend(candidates.iter().filter(|c| c.under(target)).cloned());
        }

        deps
    }

    fn run(&self, ev: &Evaluator<'_>, args: &[Expr]) -> Result<Response, OpError> {
        debug!(here = %ev.here(), "running (( cartesian-product ... ))");

        let lists = resolve_args(ev.tree(), args)?;
        let product = combine(lists)?;

        debug!(here = %ev.here(), count = product.len(), "done with (( cartesian-product ... ))");
        Ok(Response::replace(Value::Array(
            product.into_iter().map(Value::String).collect(),
        )))
    }
}

/// Shape of a resolved argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Scalar(String),
    /// Flat list of scalars, already stringified
    List(Vec<String>),
}

impl Resolved {
    /// Rejects maps and lists that contain containers.
    pub fn classify(value: &Value) -> Result<Self, OpError> {
        match value {
            Value::Array(items) => {
                let mut strs = Vec::with_capacity(items.len());
                for (j, item) in items.iter().enumerate() {
                    match item {
                        Value::Array(_) => {
                            trace!(j, "list item is itself a list");
                            return Err(OpError::Type(NESTED_LIST.to_string()));
                        }
                        Value::Object(_) => {
                            trace!(j, "list item is a map");
                            return Err(OpError::Type(NESTED_LIST.to_string()));
                        }
                        Value::Null
                        | Value::Boolean(_)
                        | Value::Integer(_)
                        | Value::Float(_)
                        | Value::String(_) => strs.push(item.stringify()),
                    }
                }
                Ok(Resolved::List(strs))
            }
            Value::Object(_) => Err(OpError::Type(MAP_ARGUMENT.to_string())),
            Value::Null
            | Value::Boolean(_)
            | Value::Integer(_)
            | Value::Float(_)
            | Value::String(_) => Ok(Resolved::Scalar(value.stringify())),
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            Resolved::Scalar(s) => vec![s],
            Resolved::List(strs) => strs,
        }
    }
}

/// Turns each argument into a list of strings, in argument order.
///
/// Stops at the first argument that fails.
pub fn resolve_args(tree: &Value, args: &[Expr]) -> Result<Vec<Vec<String>>, OpError> {
    let mut lists = Vec::with_capacity(args.len());

    for (i, arg) in args.iter().enumerate() {
        let resolved = arg.resolve(tree).inspect_err(|e| {
            debug!(i, error = %e, "argument resolution failed");
        })?;

        let list = match resolved {
            Expr::Literal(v) => {
                trace!(i, literal = %v.stringify(), "found literal");
                Resolved::Scalar(v.stringify())
            }
            Expr::Reference(cursor) => {
                trace!(i, reference = %cursor, "resolving reference");
                let value = cursor.resolve(tree).map_err(|source| {
                    debug!(i, error = %source, "reference resolution failed");
                    OpError::Resolution {
                        path: cursor.clone(),
                        source,
                    }
                })?;
                Resolved::classify(value)?
            }
            other => {
                debug!(i, arg = %other, "unsupported argument");
                return Err(OpError::Type(BAD_ARGUMENT.to_string()));
            }
        };

        lists.push(list.into_list());
    }

    Ok(lists)
}

/// Folds the lists left to right with [`cartesian`].
///
/// A single list is returned as-is.
pub fn combine(lists: Vec<Vec<String>>) -> Result<Vec<String>, OpError> {
    let mut lists = lists.into_iter();

    let Some(first) = lists.next() else {
        debug!("no arguments supplied to (( cartesian-product ... ))");
        return Err(OpError::Arity(
            "no arguments specified to (( cartesian-product ... ))".to_string(),
        ));
    };

    Ok(lists.fold(first, cartesian))
}

/// Every element of `a` followed by every element of `b`, `a` varying
/// slowest. An empty side empties the product.
pub fn cartesian(a: Vec<String>, b: Vec<String>) -> Vec<String> {
    if a.is_empty() {
        return a;
    }
    if b.is_empty() {
        return b;
    }

    let mut out = Vec::with_capacity(a.len() * b.len());
    for x in &a {
        for y in &b {
            out.push(format!("{}{}", x, y));
        }
    }
    out
}
