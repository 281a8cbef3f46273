pub mod cursor;
pub mod evaluator;
pub mod expr;
pub mod lexer;
pub mod operator;
pub mod operators;
pub mod parser;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use cursor::{Cursor, PathSegment, TreeError};
pub use evaluator::{EvalError, Evaluator};
pub use expr::Expr;
pub use lexer::{LexError, Lexer, Token};
pub use operator::{Action, OpError, Operator, OperatorRegistry, Phase, RegistryError, Response};
pub use operators::CartesianProduct;
pub use parser::{OpCall, ParseError, Parser, parse_call};
pub use value::Value;
