use crate::types::ValType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle for one of the pipeline's external buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BufferId(pub u32);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// Element address inside a buffer. Indexing is linear and counted in elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemRef {
    pub buffer: BufferId,
    pub index: Box<Expr>,
}

impl MemRef {
    pub fn new(buffer: u32, index: Expr) -> Self {
        Self {
            buffer: BufferId(buffer),
            index: Box::new(index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    EQ,
    NE,
    LT,
    LE,
    GT,
    GE,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOp {
    And,
    Or,
}

/// Type both operands of a binary node are computed at.
///
/// This is the left operand's type, except that an immediate facing a non-immediate takes the
/// other side's type, the way an untyped literal would.
pub fn operand_type(lhs: &Expr, rhs: &Expr) -> ValType {
    if lhs.is_immediate() && !rhs.is_immediate() {
        rhs.ty()
    } else {
        lhs.ty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    IntImm(i64),
    UIntImm(u64),
    FloatImm(f64),
    Cast(ValType, Box<Expr>),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    Logic(LogicOp, Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Select(Box<Expr>, Box<Expr>, Box<Expr>),
    Load(ValType, MemRef),
    Var(ValType, String),
}

impl Expr {
    /// Type of the value this node produces.
    pub fn ty(&self) -> ValType {
        match self {
            Expr::IntImm(_) => ValType::Int(32),
            Expr::UIntImm(_) => ValType::UInt(32),
            Expr::FloatImm(_) => ValType::Float(32),
            Expr::Cast(ty, _) | Expr::Load(ty, _) | Expr::Var(ty, _) => ty.clone(),
            Expr::Arith(_, lhs, rhs) | Expr::Logic(_, lhs, rhs) => operand_type(lhs, rhs),
            Expr::Cmp(_, lhs, rhs) => operand_type(lhs, rhs).with_element(ValType::BOOL),
            Expr::Not(operand) => operand.ty(),
            Expr::Select(_, then_val, else_val) => operand_type(then_val, else_val),
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, Expr::IntImm(_) | Expr::UIntImm(_) | Expr::FloatImm(_))
    }

    /// Short tag used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::IntImm(_) => "IntImm",
            Expr::UIntImm(_) => "UIntImm",
            Expr::FloatImm(_) => "FloatImm",
            Expr::Cast(..) => "Cast",
            Expr::Arith(..) => "Arith",
            Expr::Cmp(..) => "Cmp",
            Expr::Logic(..) => "Logic",
            Expr::Not(_) => "Not",
            Expr::Select(..) => "Select",
            Expr::Load(..) => "Load",
            Expr::Var(..) => "Var",
        }
    }

    pub fn var(name: impl Into<String>, ty: ValType) -> Self {
        Expr::Var(ty, name.into())
    }

    pub fn load(ty: ValType, buffer: u32, index: Expr) -> Self {
        Expr::Load(ty, MemRef::new(buffer, index))
    }

    pub fn cast(ty: ValType, value: Expr) -> Self {
        Expr::Cast(ty, Box::new(value))
    }

    pub fn arith(op: ArithOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Arith(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::arith(ArithOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::arith(ArithOp::Sub, lhs, rhs)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::arith(ArithOp::Mul, lhs, rhs)
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Self::arith(ArithOp::Div, lhs, rhs)
    }

    pub fn cmp(op: CmpOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Cmp(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Expr::Logic(LogicOp::And, Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Expr::Logic(LogicOp::Or, Box::new(lhs), Box::new(rhs))
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Not(Box::new(operand))
    }

    pub fn select(cond: Expr, then_val: Expr, else_val: Expr) -> Self {
        Expr::Select(Box::new(cond), Box::new(then_val), Box::new(else_val))
    }
}
