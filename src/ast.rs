//! # Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the query
//! language: JMESPath extended with `let`/`in` scoping and `$name`
//! parameters supplied by the caller.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer, with their binding powers
//! - **[expressions]** - Expression nodes (access, projections, operators, functions, `let`)
//! - **[operators]** - Comparison operators
//!
//! ## Quick Start
//!
//! ```text
//! people[?age > `20`].[name, age]
//! ```
//!
//! This query keeps people older than 20 and returns their name and age.
//!
//! ## Core Concepts
//!
//! ### Projections
//!
//! `[*]`, `*`, `[]`, `[?...]` and slices start a projection: everything to
//! their right up to a pipe, `||`, `&&`, a comparison or a flatten is applied
//! to each element, and `null` results are dropped.
//!
//! ```text
//! people[*].name | [0]
//! ```
//!
//! ### Scoping
//!
//! `let` binds variables for the duration of its body. Session parameters
//! live in the outermost scope and are referenced the same way.
//!
//! ```text
//! let $min = `21` in people[?age >= $min].name
//! results[*].[name, $hostname]
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::Comparator;
pub use tokens::{PROJECTION_STOP, Token};
