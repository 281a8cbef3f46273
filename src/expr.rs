use std::{env, fmt};

use tracing::trace;

use crate::{cursor::Cursor, operator::OpError, value::Value};

/// A parsed operator argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Scalar literal
    ///
    /// # Examples
    /// ```text
    /// "web"   42   1.5   true   nil
    /// ```
    Literal(Value),

    /// Reference to another location in the document
    ///
    /// # Examples
    /// ```text
    /// meta.azs
    /// $.jobs.web.instances
    /// ```
    Reference(Cursor),

    /// Environment variable, resolved to a string literal
    ///
    /// # Example
    /// ```text
    /// $DEPLOY_ENV
    /// ```
    EnvVar(String),

    /// First alternative that resolves
    ///
    /// # Example
    /// ```text
    /// meta.zones || "z1"
    /// ```
    LogicalOr(Box<Expr>, Box<Expr>),

    /// Parenthesised operator call used as an argument
    ///
    /// # Example
    /// ```text
    /// (cartesian-product a b)
    /// ```
    OperatorCall { name: String, args: Vec<Expr> },
}

impl Expr {
    /// Reduces the expression to a `Literal` or a `Reference` that exists
    /// in `tree`. Operator calls come back unchanged; it is up to the
    /// operator whether it accepts them.
    pub fn resolve(&self, tree: &Value) -> Result<Expr, OpError> {
        match self {
            Expr::Literal(_) => Ok(self.clone()),
            Expr::Reference(cursor) => {
                cursor.resolve(tree).map_err(|source| OpError::Resolution {
                    path: cursor.clone(),
                    source,
                })?;
                Ok(self.clone())
            }
            Expr::EnvVar(name) => match env::var(name) {
                Ok(val) => Ok(Expr::Literal(Value::String(val))),
                Err(_) => Err(OpError::UndefinedEnvVar(name.clone())),
            },
            Expr::LogicalOr(left, right) => match left.resolve(tree) {
                Ok(resolved) => Ok(resolved),
                Err(e) => {
                    trace!(%e, "left side of || did not resolve, trying right side");
                    right.resolve(tree)
                }
            },
            Expr::OperatorCall { .. } => Ok(self.clone()),
        }
    }

    /// References this expression mentions directly or through `||`.
    pub fn references(&self) -> Vec<&Cursor> {
        match self {
            Expr::Reference(cursor) => vec![cursor],
            Expr::LogicalOr(left, right) => {
                let mut refs = left.references();
                refs.extend(right.references());
                refs
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::String(s)) => write!(f, "{:?}", s),
            Expr::Literal(Value::Null) => write!(f, "nil"),
            Expr::Literal(v) => write!(f, "{}", v.stringify()),
            Expr::Reference(cursor) => write!(f, "{}", cursor),
            Expr::EnvVar(name) => write!(f, "${}", name),
            Expr::LogicalOr(left, right) => write!(f, "{} || {}", left, right),
            Expr::OperatorCall { name, args } => {
                write!(f, "({}", name)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
