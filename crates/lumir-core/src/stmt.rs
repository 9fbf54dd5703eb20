use crate::expr::{Expr, MemRef};
use serde::{Deserialize, Serialize};

/// Induction variable of a bounded loop over `[min, max)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopVar {
    pub name: String,
    pub min: Expr,
    pub max: Expr,
}

impl LoopVar {
    pub fn new(name: impl Into<String>, min: Expr, max: Expr) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReduceOp {
    Add,
    Mul,
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Store {
        value: Expr,
        target: MemRef,
    },
    /// Bounded iteration whose iterations are independent of each other.
    Map {
        var: LoopVar,
        body: Box<Stmt>,
    },
    /// Bounded iteration in increasing order.
    For {
        var: LoopVar,
        body: Box<Stmt>,
    },
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        body: Box<Stmt>,
    },
    IfElse {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Box<Stmt>,
    },
    Reduce {
        op: ReduceOp,
        value: Expr,
        target: MemRef,
    },
}

impl Stmt {
    pub fn kind(&self) -> &'static str {
        match self {
            Stmt::Store { .. } => "Store",
            Stmt::Map { .. } => "Map",
            Stmt::For { .. } => "For",
            Stmt::Block(_) => "Block",
            Stmt::If { .. } => "If",
            Stmt::IfElse { .. } => "IfElse",
            Stmt::Reduce { .. } => "Reduce",
        }
    }

    pub fn store(value: Expr, buffer: u32, index: Expr) -> Self {
        Stmt::Store {
            value,
            target: MemRef::new(buffer, index),
        }
    }

    pub fn for_loop(var: LoopVar, body: Stmt) -> Self {
        Stmt::For {
            var,
            body: Box::new(body),
        }
    }

    pub fn map_loop(var: LoopVar, body: Stmt) -> Self {
        Stmt::Map {
            var,
            body: Box::new(body),
        }
    }
}
