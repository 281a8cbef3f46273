//! Operators shipped with trellis.

mod cartesian_product;

pub use cartesian_product::{CartesianProduct, Resolved, cartesian, combine, resolve_args};
