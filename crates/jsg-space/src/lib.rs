//! Expansion of validated experiment configurations into invocation tables.

mod product;
mod table;

pub use product::{span_cartesian_product, span_parameter_space};
pub use table::{InvocationRow, InvocationTable};
