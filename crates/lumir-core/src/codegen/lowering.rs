use indexmap::IndexMap;
use tracing::trace;

use crate::{
    codegen::{
        emitter::{BinaryInst, FloatCond, InstEmitter, IntCond},
        machine::machine_type,
        symbols::SymbolTable,
    },
    expr::{operand_type, ArithOp, BufferId, CmpOp, Expr, LogicOp},
    stmt::Stmt,
    types::{Category, ValType},
    CompileError, Result,
};

/// Buffer parameters of the function currently being generated.
#[derive(Debug, Clone)]
pub struct EntryFrame<V> {
    buffers: IndexMap<BufferId, V>,
}

impl<V: Copy> EntryFrame<V> {
    pub fn new(buffers: impl IntoIterator<Item = (BufferId, V)>) -> Self {
        Self {
            buffers: buffers.into_iter().collect(),
        }
    }

    pub fn buffer(&self, id: BufferId) -> Option<V> {
        self.buffers.get(&id).copied()
    }
}

/// Lowers one statement tree into an [`InstEmitter`].
///
/// Owns the symbol table for the duration of the compile. Instructions are always appended at
/// the emitter's current block, which only ever moves forward.
pub struct Lowering<'e, E: InstEmitter> {
    pub(crate) emitter: &'e mut E,
    pub(crate) symbols: SymbolTable<E::Value>,
    pub(crate) frame: Option<EntryFrame<E::Value>>,
}

impl<'e, E: InstEmitter> Lowering<'e, E> {
    /// A lowering with no enclosing entry function; memory references fail to resolve.
    pub fn new(emitter: &'e mut E) -> Self {
        Self {
            emitter,
            symbols: SymbolTable::new(),
            frame: None,
        }
    }

    pub fn with_frame(emitter: &'e mut E, frame: EntryFrame<E::Value>) -> Self {
        Self {
            emitter,
            symbols: SymbolTable::new(),
            frame: Some(frame),
        }
    }

    pub fn symbols(&self) -> &SymbolTable<E::Value> {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable<E::Value> {
        &mut self.symbols
    }

    pub fn compile_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Store { value, target } => {
                let ty = value.ty();
                if is_lane_mask(&ty) {
                    return Err(CompileError::UnimplementedInstruction(format!(
                        "store of {} lane mask",
                        ty
                    )));
                }
                let val = self.compile_expr(value)?;
                let addr = self.resolve_address(target, &ty)?;
                self.emitter.store(val, addr);
                Ok(())
            }
            Stmt::Map { var, body } | Stmt::For { var, body } => self.compile_for(var, body),
            Stmt::Block(stmts) => {
                if stmts.is_empty() {
                    return Err(CompileError::InvalidIr("empty statement block".to_string()));
                }
                for s in stmts {
                    self.compile_stmt(s)?;
                }
                Ok(())
            }
            Stmt::If { .. } | Stmt::IfElse { .. } | Stmt::Reduce { .. } => Err(
                CompileError::UnimplementedInstruction(format!("{} statement", stmt.kind())),
            ),
        }
    }

    pub fn compile_expr(&mut self, expr: &Expr) -> Result<E::Value> {
        trace!(kind = expr.kind(), "lowering expression");
        match expr {
            Expr::IntImm(_) | Expr::UIntImm(_) | Expr::FloatImm(_) => {
                self.compile_immediate(expr, &expr.ty())
            }
            Expr::Cast(to, inner) => {
                let value = self.compile_expr(inner)?;
                self.compile_cast(&inner.ty(), to, value)
            }
            Expr::Arith(op, lhs, rhs) => {
                let ty = operand_type(lhs, rhs);
                if *op == ArithOp::Div && ty.is_vector() && !ty.is_float() {
                    return Err(CompileError::UnimplementedInstruction(format!(
                        "Div on {}",
                        ty
                    )));
                }
                let (l, r, ty) = self.compile_operands(lhs, rhs)?;
                Ok(self.emitter.binary(arith_inst(*op, ty.category()), l, r))
            }
            Expr::Cmp(op, lhs, rhs) => {
                let (l, r, ty) = self.compile_operands(lhs, rhs)?;
                Ok(match ty.category() {
                    Category::Float => self.emitter.fcmp(float_cond(*op), l, r),
                    category => self.emitter.icmp(int_cond(*op, category), l, r),
                })
            }
            Expr::Logic(op, lhs, rhs) => {
                let (l, r, ty) = self.compile_operands(lhs, rhs)?;
                if ty.is_float() {
                    return Err(CompileError::UnimplementedInstruction(format!(
                        "logical {:?} on {}",
                        op, ty
                    )));
                }
                let inst = match op {
                    LogicOp::And => BinaryInst::Band,
                    LogicOp::Or => BinaryInst::Bor,
                };
                Ok(self.emitter.binary(inst, l, r))
            }
            Expr::Not(inner) => {
                let ty = inner.ty();
                let value = self.compile_expr(inner)?;
                if ty.is_float() {
                    return Err(CompileError::UnimplementedInstruction(format!(
                        "logical Not on {}",
                        ty
                    )));
                }
                // Vector comparisons yield all-ones lane masks, so they invert bitwise.
                if ty.bits() == 1 && !ty.is_vector() {
                    let one = self.emitter.iconst(machine_type(&ty)?, 1)?;
                    Ok(self.emitter.binary(BinaryInst::Bxor, value, one))
                } else {
                    Ok(self.emitter.bnot(value))
                }
            }
            Expr::Select(cond, then_val, else_val) => {
                let c = self.compile_expr(cond)?;
                let (t, f, _) = self.compile_operands(then_val, else_val)?;
                Ok(self.emitter.select(c, t, f))
            }
            Expr::Load(ty, mem) => {
                if is_lane_mask(ty) {
                    return Err(CompileError::UnimplementedInstruction(format!(
                        "load of {} lane mask",
                        ty
                    )));
                }
                let addr = self.resolve_address(mem, ty)?;
                self.emitter.load(machine_type(ty)?, addr)
            }
            Expr::Var(_, name) => self.symbols.lookup(name),
        }
    }

    /// Compile both sides of a binary node at their shared operand type.
    pub(crate) fn compile_operands(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<(E::Value, E::Value, ValType)> {
        let ty = operand_type(lhs, rhs);
        let l = self.compile_operand(lhs, &ty)?;
        let r = self.compile_operand(rhs, &ty)?;
        Ok((l, r, ty))
    }

    pub(crate) fn compile_operand(&mut self, expr: &Expr, ty: &ValType) -> Result<E::Value> {
        if expr.is_immediate() {
            self.compile_immediate(expr, ty)
        } else {
            self.compile_expr(expr)
        }
    }

    /// Materialize an immediate as a constant of `ty`.
    pub(crate) fn compile_immediate(&mut self, expr: &Expr, ty: &ValType) -> Result<E::Value> {
        if is_lane_mask(ty) {
            return Err(CompileError::UnimplementedInstruction(format!(
                "{} immediate of type {}",
                expr, ty
            )));
        }
        let mt = machine_type(ty)?;
        if ty.is_float() {
            let imm = match expr {
                Expr::IntImm(v) => *v as f64,
                Expr::UIntImm(v) => *v as f64,
                Expr::FloatImm(v) => *v,
                _ => return Err(not_an_immediate(expr)),
            };
            return self.emitter.fconst(mt, imm);
        }

        let imm = match expr {
            Expr::IntImm(v) => *v,
            Expr::UIntImm(v) => *v as i64,
            Expr::FloatImm(v) => *v as i64,
            _ => return Err(not_an_immediate(expr)),
        };
        let imm = if ty.bits() == 1 { imm & 1 } else { imm };
        self.emitter.iconst(mt, imm)
    }
}

/// Vector booleans only exist as comparison results, whose lanes are as wide as the compared
/// lanes. They have no in-memory form.
fn is_lane_mask(ty: &ValType) -> bool {
    ty.is_vector() && ty.bits() == 1
}

fn not_an_immediate(expr: &Expr) -> CompileError {
    CompileError::InvalidIr(format!("{} is not an immediate", expr.kind()))
}

pub(crate) fn arith_inst(op: ArithOp, category: Category) -> BinaryInst {
    match (category, op) {
        (Category::Float, ArithOp::Add) => BinaryInst::Fadd,
        (Category::Float, ArithOp::Sub) => BinaryInst::Fsub,
        (Category::Float, ArithOp::Mul) => BinaryInst::Fmul,
        (Category::Float, ArithOp::Div) => BinaryInst::Fdiv,
        (_, ArithOp::Add) => BinaryInst::Iadd,
        (_, ArithOp::Sub) => BinaryInst::Isub,
        (_, ArithOp::Mul) => BinaryInst::Imul,
        (Category::Signed, ArithOp::Div) => BinaryInst::Sdiv,
        (Category::Unsigned, ArithOp::Div) => BinaryInst::Udiv,
    }
}

pub(crate) fn int_cond(op: CmpOp, category: Category) -> IntCond {
    let signed = category == Category::Signed;
    match op {
        CmpOp::EQ => IntCond::Equal,
        CmpOp::NE => IntCond::NotEqual,
        CmpOp::LT if signed => IntCond::SignedLessThan,
        CmpOp::LE if signed => IntCond::SignedLessThanOrEqual,
        CmpOp::GT if signed => IntCond::SignedGreaterThan,
        CmpOp::GE if signed => IntCond::SignedGreaterThanOrEqual,
        CmpOp::LT => IntCond::UnsignedLessThan,
        CmpOp::LE => IntCond::UnsignedLessThanOrEqual,
        CmpOp::GT => IntCond::UnsignedGreaterThan,
        CmpOp::GE => IntCond::UnsignedGreaterThanOrEqual,
    }
}

pub(crate) fn float_cond(op: CmpOp) -> FloatCond {
    match op {
        CmpOp::EQ => FloatCond::Equal,
        CmpOp::NE => FloatCond::NotEqual,
        CmpOp::LT => FloatCond::LessThan,
        CmpOp::LE => FloatCond::LessThanOrEqual,
        CmpOp::GT => FloatCond::GreaterThan,
        CmpOp::GE => FloatCond::GreaterThanOrEqual,
    }
}
