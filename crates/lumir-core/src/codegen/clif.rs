use cranelift_codegen::ir::condcodes::{FloatCC, IntCC};
use cranelift_codegen::ir::{self as clif_ir, types, InstBuilder, MemFlags};
use cranelift_frontend::FunctionBuilder;

use crate::{
    codegen::{
        emitter::{BinaryInst, ConvertInst, FloatCond, InstEmitter, IntCond},
        machine::{MachineType, ScalarType},
    },
    CompileError, Result,
};

/// [`InstEmitter`] over a Cranelift [`FunctionBuilder`].
pub struct ClifEmitter<'b, 'f> {
    builder: &'b mut FunctionBuilder<'f>,
    pointer_type: clif_ir::Type,
}

impl<'b, 'f> ClifEmitter<'b, 'f> {
    pub fn new(builder: &'b mut FunctionBuilder<'f>, pointer_type: clif_ir::Type) -> Self {
        Self {
            builder,
            pointer_type,
        }
    }
}

pub fn clif_scalar(ty: ScalarType) -> clif_ir::Type {
    match ty {
        ScalarType::I8 => types::I8,
        ScalarType::I16 => types::I16,
        ScalarType::I32 => types::I32,
        ScalarType::I64 => types::I64,
        ScalarType::F32 => types::F32,
        ScalarType::F64 => types::F64,
    }
}

pub fn clif_type(ty: MachineType) -> Result<clif_ir::Type> {
    match ty {
        MachineType::Scalar(s) => Ok(clif_scalar(s)),
        MachineType::Vector { lane, lanes } => clif_scalar(lane)
            .by(lanes as u32)
            .ok_or_else(|| CompileError::UnsupportedType(ty.to_string())),
    }
}

fn int_cc(cond: IntCond) -> IntCC {
    match cond {
        IntCond::Equal => IntCC::Equal,
        IntCond::NotEqual => IntCC::NotEqual,
        IntCond::SignedLessThan => IntCC::SignedLessThan,
        IntCond::SignedLessThanOrEqual => IntCC::SignedLessThanOrEqual,
        IntCond::SignedGreaterThan => IntCC::SignedGreaterThan,
        IntCond::SignedGreaterThanOrEqual => IntCC::SignedGreaterThanOrEqual,
        IntCond::UnsignedLessThan => IntCC::UnsignedLessThan,
        IntCond::UnsignedLessThanOrEqual => IntCC::UnsignedLessThanOrEqual,
        IntCond::UnsignedGreaterThan => IntCC::UnsignedGreaterThan,
        IntCond::UnsignedGreaterThanOrEqual => IntCC::UnsignedGreaterThanOrEqual,
    }
}

fn float_cc(cond: FloatCond) -> FloatCC {
    match cond {
        FloatCond::Equal => FloatCC::Equal,
        FloatCond::NotEqual => FloatCC::NotEqual,
        FloatCond::LessThan => FloatCC::LessThan,
        FloatCond::LessThanOrEqual => FloatCC::LessThanOrEqual,
        FloatCond::GreaterThan => FloatCC::GreaterThan,
        FloatCond::GreaterThanOrEqual => FloatCC::GreaterThanOrEqual,
    }
}

impl InstEmitter for ClifEmitter<'_, '_> {
    type Value = clif_ir::Value;
    type Block = clif_ir::Block;

    fn pointer_type(&self) -> MachineType {
        if self.pointer_type == types::I32 {
            MachineType::I32
        } else {
            MachineType::I64
        }
    }

    fn create_block(&mut self) -> Self::Block {
        self.builder.create_block()
    }

    fn switch_to_block(&mut self, block: Self::Block) {
        self.builder.switch_to_block(block);
    }

    fn seal_block(&mut self, block: Self::Block) {
        self.builder.seal_block(block);
    }

    fn append_block_param(&mut self, block: Self::Block, ty: MachineType) -> Result<Self::Value> {
        Ok(self.builder.append_block_param(block, clif_type(ty)?))
    }

    fn iconst(&mut self, ty: MachineType, imm: i64) -> Result<Self::Value> {
        let lane = ty.lane();
        if lane.is_float() {
            return Err(CompileError::InvalidIr(format!(
                "integer constant of type {}",
                ty
            )));
        }
        let bits = lane.bits();
        let imm = if bits < 64 {
            imm & ((1i64 << bits) - 1)
        } else {
            imm
        };
        let scalar = self.builder.ins().iconst(clif_scalar(lane), imm);
        if ty.is_vector() {
            Ok(self.builder.ins().splat(clif_type(ty)?, scalar))
        } else {
            Ok(scalar)
        }
    }

    fn fconst(&mut self, ty: MachineType, imm: f64) -> Result<Self::Value> {
        let scalar = match ty.lane() {
            ScalarType::F32 => self.builder.ins().f32const(imm as f32),
            ScalarType::F64 => self.builder.ins().f64const(imm),
            _ => {
                return Err(CompileError::InvalidIr(format!(
                    "float constant of type {}",
                    ty
                )))
            }
        };
        if ty.is_vector() {
            Ok(self.builder.ins().splat(clif_type(ty)?, scalar))
        } else {
            Ok(scalar)
        }
    }

    fn binary(&mut self, inst: BinaryInst, lhs: Self::Value, rhs: Self::Value) -> Self::Value {
        let ins = self.builder.ins();
        match inst {
            BinaryInst::Iadd => ins.iadd(lhs, rhs),
            BinaryInst::Isub => ins.isub(lhs, rhs),
            BinaryInst::Imul => ins.imul(lhs, rhs),
            BinaryInst::Sdiv => ins.sdiv(lhs, rhs),
            BinaryInst::Udiv => ins.udiv(lhs, rhs),
            BinaryInst::Fadd => ins.fadd(lhs, rhs),
            BinaryInst::Fsub => ins.fsub(lhs, rhs),
            BinaryInst::Fmul => ins.fmul(lhs, rhs),
            BinaryInst::Fdiv => ins.fdiv(lhs, rhs),
            BinaryInst::Band => ins.band(lhs, rhs),
            BinaryInst::Bor => ins.bor(lhs, rhs),
            BinaryInst::Bxor => ins.bxor(lhs, rhs),
        }
    }

    fn bnot(&mut self, value: Self::Value) -> Self::Value {
        self.builder.ins().bnot(value)
    }

    fn icmp(&mut self, cond: IntCond, lhs: Self::Value, rhs: Self::Value) -> Self::Value {
        self.builder.ins().icmp(int_cc(cond), lhs, rhs)
    }

    fn fcmp(&mut self, cond: FloatCond, lhs: Self::Value, rhs: Self::Value) -> Self::Value {
        self.builder.ins().fcmp(float_cc(cond), lhs, rhs)
    }

    fn select(
        &mut self,
        cond: Self::Value,
        then_val: Self::Value,
        else_val: Self::Value,
    ) -> Self::Value {
        // Lane masks from vector comparisons pick bit by bit.
        if self.builder.func.dfg.value_type(cond).is_vector() {
            self.builder.ins().bitselect(cond, then_val, else_val)
        } else {
            self.builder.ins().select(cond, then_val, else_val)
        }
    }

    fn convert(
        &mut self,
        inst: ConvertInst,
        to: MachineType,
        value: Self::Value,
    ) -> Result<Self::Value> {
        let to = clif_type(to)?;
        let ins = self.builder.ins();
        Ok(match inst {
            ConvertInst::Reduce => ins.ireduce(to, value),
            ConvertInst::Uextend => ins.uextend(to, value),
            ConvertInst::Sextend => ins.sextend(to, value),
            ConvertInst::FromSint => ins.fcvt_from_sint(to, value),
            ConvertInst::FromUint => ins.fcvt_from_uint(to, value),
            ConvertInst::ToSint => ins.fcvt_to_sint_sat(to, value),
            ConvertInst::ToUint => ins.fcvt_to_uint_sat(to, value),
            ConvertInst::Fpromote => ins.fpromote(to, value),
            ConvertInst::Fdemote => ins.fdemote(to, value),
        })
    }

    fn load(&mut self, ty: MachineType, addr: Self::Value) -> Result<Self::Value> {
        let ty = clif_type(ty)?;
        Ok(self.builder.ins().load(ty, MemFlags::new(), addr, 0))
    }

    fn store(&mut self, value: Self::Value, addr: Self::Value) {
        self.builder.ins().store(MemFlags::new(), value, addr, 0);
    }

    fn jump(&mut self, dest: Self::Block, args: &[Self::Value]) {
        self.builder.ins().jump(dest, args);
    }

    fn brif(
        &mut self,
        cond: Self::Value,
        then_dest: Self::Block,
        then_args: &[Self::Value],
        else_dest: Self::Block,
        else_args: &[Self::Value],
    ) {
        self.builder
            .ins()
            .brif(cond, then_dest, then_args, else_dest, else_args);
    }

    fn return_void(&mut self) {
        self.builder.ins().return_(&[]);
    }
}
