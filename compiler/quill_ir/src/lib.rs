//! Quill IR - AST substrate for the compiler middle-end.
//!
//! This crate contains the data structures middle-end passes operate on:
//! - Spans for source locations
//! - Names for interned identifiers
//! - Symbol tables (variables, labels, functions)
//! - The type pool with error-subtype queries
//! - Statement/expression trees with structural editing
//! - A read-only visitor with enter/exit hooks for compound nodes
//!
//! # Design Philosophy
//!
//! - **Intern everything**: strings → `Name(u32)`, types → `TypeId(u32)`
//! - **Owned mutable trees**: lowering passes edit bodies in place by
//!   detaching, splicing, and replacing nodes
//! - **Symbols by id**: variables and labels live in a per-module table;
//!   tree nodes reference them by compact id

mod ast;
mod interner;
mod name;
mod span;
mod symbol;
mod types;
pub mod visit;

pub use ast::{
    Block, Callee, CatchClause, Expr, ExprKind, FnFlags, Function, GotoKind, Module, Stmt,
    StmtKind, TryStmt,
};
pub use interner::StringInterner;
pub use name::Name;
pub use span::Span;
pub use symbol::{FuncId, Intent, LabelId, LabelSymbol, SymbolTable, VarId, VarSymbol};
pub use types::{TypeDef, TypeId, TypePool};
