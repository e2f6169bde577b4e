pub mod apply;
pub mod ast;
pub mod parser;

pub use apply::{apply_filters, matches_filter};
pub use ast::{FilterCondition, FilterExpr, FilterField, FilterOperator};
pub use parser::parse_filter;
