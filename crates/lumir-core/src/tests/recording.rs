use std::collections::HashMap;

use crate::{
    codegen::{
        emitter::{BinaryInst, ConvertInst, FloatCond, InstEmitter, IntCond},
        machine::{MachineType, ScalarType},
        EntryFrame,
    },
    expr::BufferId,
    Result,
};

pub type V = u32;
pub type B = u32;

/// One emitted instruction, as the recording emitter saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Rec {
    Arg { value: V },
    BlockParam { block: B, value: V, ty: MachineType },
    Switch(B),
    Seal(B),
    Iconst { value: V, ty: MachineType, imm: i64 },
    Fconst { value: V, ty: MachineType, imm: f64 },
    Binary { value: V, inst: BinaryInst, lhs: V, rhs: V },
    Bnot { value: V, arg: V },
    Icmp { value: V, cond: IntCond, lhs: V, rhs: V },
    Fcmp { value: V, cond: FloatCond, lhs: V, rhs: V },
    Select { value: V, cond: V, then_val: V, else_val: V },
    Convert { value: V, inst: ConvertInst, to: MachineType, arg: V },
    Load { value: V, ty: MachineType, addr: V },
    Store { value: V, addr: V },
    Jump { dest: B, args: Vec<V> },
    Brif { cond: V, then_dest: B, then_args: Vec<V>, else_dest: B, else_args: Vec<V> },
    Return,
}

/// Backend fake that numbers values and blocks and logs every call.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    pub log: Vec<Rec>,
    pub types: HashMap<V, MachineType>,
    next_value: V,
    next_block: B,
}

impl RecordingEmitter {
    /// An emitter positioned in a fresh entry block.
    pub fn new() -> Self {
        let mut emitter = Self::default();
        emitter.create_block();
        emitter
    }

    fn value(&mut self, ty: Option<MachineType>) -> V {
        let v = self.next_value;
        self.next_value += 1;
        if let Some(ty) = ty {
            self.types.insert(v, ty);
        }
        v
    }

    /// A pointer-typed function argument.
    pub fn arg(&mut self) -> V {
        let value = self.value(Some(MachineType::I64));
        self.log.push(Rec::Arg { value });
        value
    }

    /// Entry frame binding each buffer id to a fresh argument.
    pub fn frame(&mut self, buffers: &[u32]) -> EntryFrame<V> {
        let args: Vec<(BufferId, V)> = buffers.iter().map(|b| (BufferId(*b), self.arg())).collect();
        EntryFrame::new(args)
    }

    pub fn binaries(&self) -> Vec<BinaryInst> {
        self.log
            .iter()
            .filter_map(|r| match r {
                Rec::Binary { inst, .. } => Some(*inst),
                _ => None,
            })
            .collect()
    }

    pub fn converts(&self) -> Vec<(ConvertInst, MachineType)> {
        self.log
            .iter()
            .filter_map(|r| match r {
                Rec::Convert { inst, to, .. } => Some((*inst, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Rec) -> bool) -> usize {
        self.log.iter().filter(|r| pred(r)).count()
    }

    pub fn ty(&self, v: V) -> Option<MachineType> {
        self.types.get(&v).copied()
    }

    /// Scalar compares give a byte; vector compares give an integer mask of the operand's lanes.
    fn compare_type(&self, operand: V) -> MachineType {
        match self.ty(operand) {
            Some(MachineType::Vector { lane, lanes }) => {
                let lane = match lane.bits() {
                    8 => ScalarType::I8,
                    16 => ScalarType::I16,
                    32 => ScalarType::I32,
                    _ => ScalarType::I64,
                };
                MachineType::Vector { lane, lanes }
            }
            _ => MachineType::I8,
        }
    }
}

impl InstEmitter for RecordingEmitter {
    type Value = V;
    type Block = B;

    fn pointer_type(&self) -> MachineType {
        MachineType::I64
    }

    fn create_block(&mut self) -> B {
        let b = self.next_block;
        self.next_block += 1;
        b
    }

    fn switch_to_block(&mut self, block: B) {
        self.log.push(Rec::Switch(block));
    }

    fn seal_block(&mut self, block: B) {
        self.log.push(Rec::Seal(block));
    }

    fn append_block_param(&mut self, block: B, ty: MachineType) -> Result<V> {
        let value = self.value(Some(ty));
        self.log.push(Rec::BlockParam { block, value, ty });
        Ok(value)
    }

    fn iconst(&mut self, ty: MachineType, imm: i64) -> Result<V> {
        let value = self.value(Some(ty));
        self.log.push(Rec::Iconst { value, ty, imm });
        Ok(value)
    }

    fn fconst(&mut self, ty: MachineType, imm: f64) -> Result<V> {
        let value = self.value(Some(ty));
        self.log.push(Rec::Fconst { value, ty, imm });
        Ok(value)
    }

    fn binary(&mut self, inst: BinaryInst, lhs: V, rhs: V) -> V {
        let ty = self.ty(lhs);
        let value = self.value(ty);
        self.log.push(Rec::Binary {
            value,
            inst,
            lhs,
            rhs,
        });
        value
    }

    fn bnot(&mut self, arg: V) -> V {
        let ty = self.ty(arg);
        let value = self.value(ty);
        self.log.push(Rec::Bnot { value, arg });
        value
    }

    fn icmp(&mut self, cond: IntCond, lhs: V, rhs: V) -> V {
        let ty = self.compare_type(lhs);
        let value = self.value(Some(ty));
        self.log.push(Rec::Icmp {
            value,
            cond,
            lhs,
            rhs,
        });
        value
    }

    fn fcmp(&mut self, cond: FloatCond, lhs: V, rhs: V) -> V {
        let ty = self.compare_type(lhs);
        let value = self.value(Some(ty));
        self.log.push(Rec::Fcmp {
            value,
            cond,
            lhs,
            rhs,
        });
        value
    }

    fn select(&mut self, cond: V, then_val: V, else_val: V) -> V {
        let ty = self.ty(then_val);
        let value = self.value(ty);
        self.log.push(Rec::Select {
            value,
            cond,
            then_val,
            else_val,
        });
        value
    }

    fn convert(&mut self, inst: ConvertInst, to: MachineType, arg: V) -> Result<V> {
        let value = self.value(Some(to));
        self.log.push(Rec::Convert {
            value,
            inst,
            to,
            arg,
        });
        Ok(value)
    }

    fn load(&mut self, ty: MachineType, addr: V) -> Result<V> {
        let value = self.value(Some(ty));
        self.log.push(Rec::Load { value, ty, addr });
        Ok(value)
    }

    fn store(&mut self, value: V, addr: V) {
        self.log.push(Rec::Store { value, addr });
    }

    fn jump(&mut self, dest: B, args: &[V]) {
        self.log.push(Rec::Jump {
            dest,
            args: args.to_vec(),
        });
    }

    fn brif(&mut self, cond: V, then_dest: B, then_args: &[V], else_dest: B, else_args: &[V]) {
        self.log.push(Rec::Brif {
            cond,
            then_dest,
            then_args: then_args.to_vec(),
            else_dest,
            else_args: else_args.to_vec(),
        });
    }

    fn return_void(&mut self) {
        self.log.push(Rec::Return);
    }
}
