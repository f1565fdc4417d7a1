//! OPLAW — runtime-defined operator laws.
//!
//! A small rule-defining language: directive text declares named binary
//! operations ("laws") at runtime, and expressions of the form `a OP b`
//! are evaluated against them.
//!
//! Core pieces:
//!   - alias: three-tier operator-token canonicalization (exact,
//!     case-folded ASCII fallback, legacy-with-warning)
//!   - law: a closed expression grammar compiled to an AST — arithmetic,
//!     one comparison, a ternary, and a fixed helper allow-list
//!   - engine: directive parsing (DEFINE/REPLACE/DELETE/ENABLE/DISABLE/
//!     SELECT), the operation registry, and the expression evaluator
//!   - provider: the `{dsl, evals, final}` collaborator seam plus a
//!     payload sanitizer for messy provider output

pub mod alias;
pub mod engine;
pub mod errors;
pub mod law;
pub mod provider;
