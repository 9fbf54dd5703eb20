use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract numeric type of an IR value.
///
/// `Vector` never nests another `Vector` in the supported subset; the mapper rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValType {
    Int(u8),
    UInt(u8),
    Float(u8),
    Vector(Box<ValType>, u16),
}

/// Numeric category used to pick signed, unsigned or floating-point instruction variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Signed,
    Unsigned,
    Float,
}

impl ValType {
    pub const BOOL: ValType = ValType::UInt(1);

    pub fn vector(element: ValType, lanes: u16) -> Self {
        ValType::Vector(Box::new(element), lanes)
    }

    /// Element type for vectors, the type itself for scalars.
    pub fn element(&self) -> &ValType {
        match self {
            ValType::Vector(elem, _) => elem,
            _ => self,
        }
    }

    pub fn lanes(&self) -> u16 {
        match self {
            ValType::Vector(_, lanes) => *lanes,
            _ => 1,
        }
    }

    pub fn bits(&self) -> u8 {
        match self {
            ValType::Int(bits) | ValType::UInt(bits) | ValType::Float(bits) => *bits,
            ValType::Vector(elem, _) => elem.bits(),
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, ValType::Vector(..))
    }

    pub fn is_float(&self) -> bool {
        self.category() == Category::Float
    }

    pub fn category(&self) -> Category {
        match self {
            ValType::Int(_) => Category::Signed,
            ValType::UInt(_) => Category::Unsigned,
            ValType::Float(_) => Category::Float,
            ValType::Vector(elem, _) => elem.category(),
        }
    }

    /// Same lane count as `self`, with `element` as the scalar.
    pub fn with_element(&self, element: ValType) -> ValType {
        match self {
            ValType::Vector(_, lanes) => ValType::vector(element, *lanes),
            _ => element,
        }
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValType::Int(bits) => write!(f, "int{}", bits),
            ValType::UInt(bits) => write!(f, "uint{}", bits),
            ValType::Float(bits) => write!(f, "float{}", bits),
            ValType::Vector(elem, lanes) => write!(f, "{}x{}", elem, lanes),
        }
    }
}
