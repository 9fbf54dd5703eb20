use std::fmt::Debug;

use crate::{codegen::machine::MachineType, Result};

/// Category-resolved binary instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryInst {
    Iadd,
    Isub,
    Imul,
    Sdiv,
    Udiv,
    Fadd,
    Fsub,
    Fmul,
    Fdiv,
    Band,
    Bor,
    Bxor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntCond {
    Equal,
    NotEqual,
    SignedLessThan,
    SignedLessThanOrEqual,
    SignedGreaterThan,
    SignedGreaterThanOrEqual,
    UnsignedLessThan,
    UnsignedLessThanOrEqual,
    UnsignedGreaterThan,
    UnsignedGreaterThanOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatCond {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvertInst {
    Reduce,
    Uextend,
    Sextend,
    FromSint,
    FromUint,
    ToSint,
    ToUint,
    Fpromote,
    Fdemote,
}

/// Code-generation capabilities the lowering needs from a backend.
///
/// Every instruction is appended at the current insertion block. Blocks carry parameters in
/// place of phi nodes: a jump or branch passes one argument per parameter of its destination.
pub trait InstEmitter {
    type Value: Copy + Debug;
    type Block: Copy + Debug + PartialEq;

    /// Type of the opaque pointers buffers are passed as.
    fn pointer_type(&self) -> MachineType;

    fn create_block(&mut self) -> Self::Block;
    fn switch_to_block(&mut self, block: Self::Block);
    /// Declare that every predecessor of `block` is now known.
    fn seal_block(&mut self, block: Self::Block);
    fn append_block_param(&mut self, block: Self::Block, ty: MachineType) -> Result<Self::Value>;

    /// Integer constant; vector types splat `imm` into every lane.
    fn iconst(&mut self, ty: MachineType, imm: i64) -> Result<Self::Value>;
    fn fconst(&mut self, ty: MachineType, imm: f64) -> Result<Self::Value>;

    fn binary(&mut self, inst: BinaryInst, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    fn bnot(&mut self, value: Self::Value) -> Self::Value;
    fn icmp(&mut self, cond: IntCond, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    fn fcmp(&mut self, cond: FloatCond, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    fn select(
        &mut self,
        cond: Self::Value,
        then_val: Self::Value,
        else_val: Self::Value,
    ) -> Self::Value;
    fn convert(
        &mut self,
        inst: ConvertInst,
        to: MachineType,
        value: Self::Value,
    ) -> Result<Self::Value>;

    fn load(&mut self, ty: MachineType, addr: Self::Value) -> Result<Self::Value>;
    fn store(&mut self, value: Self::Value, addr: Self::Value);

    fn jump(&mut self, dest: Self::Block, args: &[Self::Value]);
    fn brif(
        &mut self,
        cond: Self::Value,
        then_dest: Self::Block,
        then_args: &[Self::Value],
        else_dest: Self::Block,
        else_args: &[Self::Value],
    );
    fn return_void(&mut self);
}
