use std::fmt;

use crate::{types::ValType, CompileError, Result};

/// Width of the SIMD registers vector values live in. Narrower vectors do not lower.
pub const VECTOR_BITS: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ScalarType {
    pub fn bits(&self) -> u32 {
        match self {
            ScalarType::I8 => 8,
            ScalarType::I16 => 16,
            ScalarType::I32 | ScalarType::F32 => 32,
            ScalarType::I64 | ScalarType::F64 => 64,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }
}

/// Backend-neutral machine type of a generated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineType {
    Scalar(ScalarType),
    Vector { lane: ScalarType, lanes: u16 },
}

impl MachineType {
    pub const I8: MachineType = MachineType::Scalar(ScalarType::I8);
    pub const I16: MachineType = MachineType::Scalar(ScalarType::I16);
    pub const I32: MachineType = MachineType::Scalar(ScalarType::I32);
    pub const I64: MachineType = MachineType::Scalar(ScalarType::I64);
    pub const F32: MachineType = MachineType::Scalar(ScalarType::F32);
    pub const F64: MachineType = MachineType::Scalar(ScalarType::F64);

    pub fn lane(&self) -> ScalarType {
        match self {
            MachineType::Scalar(s) => *s,
            MachineType::Vector { lane, .. } => *lane,
        }
    }

    pub fn lanes(&self) -> u16 {
        match self {
            MachineType::Scalar(_) => 1,
            MachineType::Vector { lanes, .. } => *lanes,
        }
    }

    pub fn bytes(&self) -> u32 {
        self.lane().bits() / 8 * self.lanes() as u32
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, MachineType::Vector { .. })
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lane = match self.lane() {
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
        };
        match self {
            MachineType::Scalar(_) => f.write_str(lane),
            MachineType::Vector { lanes, .. } => write!(f, "{}x{}", lane, lanes),
        }
    }
}

/// Machine type that holds values of `ty`.
///
/// One-bit integers live in a byte, the same representation scalar comparisons produce.
/// Vectors must fill a whole SIMD register.
pub fn machine_type(ty: &ValType) -> Result<MachineType> {
    match ty {
        ValType::Vector(elem, lanes) => {
            if elem.is_vector() {
                return Err(CompileError::UnsupportedType(format!(
                    "nested vector type {}",
                    ty
                )));
            }
            let lane = scalar_type(elem)?;
            let total = lane.bits() * *lanes as u32;
            if total != VECTOR_BITS {
                return Err(CompileError::UnsupportedType(format!(
                    "vector type {} ({} lanes, {} bits)",
                    ty, lanes, total
                )));
            }
            Ok(MachineType::Vector {
                lane,
                lanes: *lanes,
            })
        }
        _ => scalar_type(ty).map(MachineType::Scalar),
    }
}

fn scalar_type(ty: &ValType) -> Result<ScalarType> {
    match ty {
        ValType::Int(1 | 8) | ValType::UInt(1 | 8) => Ok(ScalarType::I8),
        ValType::Int(16) | ValType::UInt(16) => Ok(ScalarType::I16),
        ValType::Int(32) | ValType::UInt(32) => Ok(ScalarType::I32),
        ValType::Int(64) | ValType::UInt(64) => Ok(ScalarType::I64),
        ValType::Float(32) => Ok(ScalarType::F32),
        ValType::Float(64) => Ok(ScalarType::F64),
        _ => Err(CompileError::UnsupportedType(ty.to_string())),
    }
}
