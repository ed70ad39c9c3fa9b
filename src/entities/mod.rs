//! Resource definition macros

pub mod macros;
