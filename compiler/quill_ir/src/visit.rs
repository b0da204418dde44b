//! Read-only AST traversal.
//!
//! A single [`Visitor`] trait with enter/exit hooks for compound nodes.
//! Default implementations call `walk_*` functions that traverse children;
//! override hooks to add behavior at specific nodes, and call the matching
//! `walk_*` to continue into children.
//!
//! # Traversal order
//!
//! For a try statement the order is fixed and deliberate:
//!
//! 1. `enter_try`
//! 2. the try body
//! 3. `exit_try`
//! 4. each catch clause in source order (`enter_catch`, body,
//!    `exit_catch` with an is-last marker)
//!
//! Catch clauses are visited *after* `exit_try`, so hooks that maintain a
//! try-scope stack see catch bodies against the enclosing scope — an
//! error raised inside a catch body belongs to the outer try (or the
//! function), never to the try whose error it is handling.

use crate::ast::{Block, Callee, CatchClause, Expr, ExprKind, Function, Stmt, StmtKind, TryStmt};
use crate::Span;

/// AST visitor trait.
pub trait Visitor {
    fn visit_function(&mut self, func: &Function) {
        self.visit_block(&func.body);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    /// Called before a try's body. Return `false` to skip the subtree.
    fn enter_try(&mut self, node: &TryStmt) -> bool {
        let _ = node;
        true
    }

    /// Called after a try's body, before its catch clauses.
    fn exit_try(&mut self, node: &TryStmt) {
        let _ = node;
    }

    /// Called before a catch clause's body. Return `false` to skip it.
    fn enter_catch(&mut self, clause: &CatchClause) -> bool {
        let _ = clause;
        true
    }

    /// Called after a catch clause's body. `is_last` marks the final
    /// clause of the list.
    fn exit_catch(&mut self, clause: &CatchClause, is_last: bool) {
        let _ = (clause, is_last);
    }

    /// Called for every call expression, outermost first.
    fn visit_call(&mut self, callee: &Callee, args: &[Expr], span: Span) {
        let _ = (callee, span);
        walk_call(self, args);
    }

    /// Called for every throw statement.
    fn visit_throw(&mut self, value: &Expr, span: Span) {
        let _ = span;
        self.visit_expr(value);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

/// Traverse all statements of a block.
pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

/// Traverse a statement's children.
pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Try(node) => walk_try(v, node),
        StmtKind::Throw { value } => v.visit_throw(value, stmt.span),
        StmtKind::Expr(expr)
        | StmtKind::Move { src: expr, .. }
        | StmtKind::Assign { src: expr, .. } => v.visit_expr(expr),
        StmtKind::Return { value: Some(expr) } => v.visit_expr(expr),
        StmtKind::If {
            cond,
            then_block,
            else_block,
        } => {
            v.visit_expr(cond);
            v.visit_block(then_block);
            if let Some(else_block) = else_block {
                v.visit_block(else_block);
            }
        }
        StmtKind::Block(block) => v.visit_block(block),
        StmtKind::Decl(_)
        | StmtKind::Label(_)
        | StmtKind::Goto { .. }
        | StmtKind::Return { value: None }
        | StmtKind::DeleteError(_)
        | StmtKind::Halt { .. } => {}
    }
}

/// Traverse a try statement: body, exit hook, then catch clauses.
pub fn walk_try<V: Visitor + ?Sized>(v: &mut V, node: &TryStmt) {
    if !v.enter_try(node) {
        return;
    }
    v.visit_block(&node.body);
    v.exit_try(node);

    let last = node.catches.len().saturating_sub(1);
    for (i, clause) in node.catches.iter().enumerate() {
        if v.enter_catch(clause) {
            v.visit_block(&clause.body);
        }
        v.exit_catch(clause, i == last);
    }
}

/// Traverse a call's arguments.
pub fn walk_call<V: Visitor + ?Sized>(v: &mut V, args: &[Expr]) {
    for arg in args {
        v.visit_expr(arg);
    }
}

/// Traverse an expression's children.
pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Call { callee, args } => v.visit_call(callee, args, expr.span),
        ExprKind::NotNil(value)
        | ExprKind::Cast { value, .. }
        | ExprKind::DynCast { value, .. } => v.visit_expr(value),
        ExprKind::Var(_) | ExprKind::Nil => {}
    }
}
