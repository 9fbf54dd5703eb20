use std::collections::BTreeSet;

use crate::{
    expr::{BufferId, Expr, MemRef},
    stmt::Stmt,
};

/// Every buffer read by a `Load` anywhere inside `expr`.
pub fn buffers_in_expr(expr: &Expr) -> BTreeSet<BufferId> {
    let mut buffers = BTreeSet::new();
    collect_expr(expr, &mut buffers);
    buffers
}

/// Every buffer loaded from or stored to anywhere inside `stmt`.
///
/// The result is ordered by id, which is the entry function's parameter order.
pub fn buffers_in_stmt(stmt: &Stmt) -> BTreeSet<BufferId> {
    let mut buffers = BTreeSet::new();
    collect_stmt(stmt, &mut buffers);
    buffers
}

fn collect_stmt(stmt: &Stmt, out: &mut BTreeSet<BufferId>) {
    match stmt {
        Stmt::Store { value, target } | Stmt::Reduce { value, target, .. } => {
            collect_memref(target, out);
            collect_expr(value, out);
        }
        Stmt::Map { var, body } | Stmt::For { var, body } => {
            collect_expr(&var.min, out);
            collect_expr(&var.max, out);
            collect_stmt(body, out);
        }
        Stmt::Block(stmts) => {
            for s in stmts {
                collect_stmt(s, out);
            }
        }
        Stmt::If { cond, body } => {
            collect_expr(cond, out);
            collect_stmt(body, out);
        }
        Stmt::IfElse {
            cond,
            then,
            otherwise,
        } => {
            collect_expr(cond, out);
            collect_stmt(then, out);
            collect_stmt(otherwise, out);
        }
    }
}

fn collect_memref(mem: &MemRef, out: &mut BTreeSet<BufferId>) {
    out.insert(mem.buffer);
    collect_expr(&mem.index, out);
}

fn collect_expr(expr: &Expr, out: &mut BTreeSet<BufferId>) {
    match expr {
        Expr::IntImm(_) | Expr::UIntImm(_) | Expr::FloatImm(_) | Expr::Var(..) => {}
        Expr::Load(_, mem) => collect_memref(mem, out),
        Expr::Cast(_, inner) | Expr::Not(inner) => collect_expr(inner, out),
        Expr::Arith(_, lhs, rhs) | Expr::Cmp(_, lhs, rhs) | Expr::Logic(_, lhs, rhs) => {
            collect_expr(lhs, out);
            collect_expr(rhs, out);
        }
        Expr::Select(cond, then_val, else_val) => {
            collect_expr(cond, out);
            collect_expr(then_val, out);
            collect_expr(else_val, out);
        }
    }
}
