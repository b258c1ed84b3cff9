//! Utility modules

pub mod text;

pub use text::{indentation, natural_cmp, quote_literal};
