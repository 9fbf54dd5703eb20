/*! Numeric casts.
 *
 * The rules follow the source language's casting semantics bit for bit, including the two
 * unsigned/signed crossings that clear the sign bit of the result. Cranelift has no odd-width
 * integers, so "truncate to k bits then zero-extend" is emitted as "keep the low k bits".
 */

use crate::{
    codegen::{
        emitter::{BinaryInst, ConvertInst, InstEmitter},
        lowering::Lowering,
        machine::machine_type,
    },
    types::ValType,
    CompileError, Result,
};

/// Integer width float conversions are routed through when the integer side is narrower.
const CONVERT_BITS: u8 = 32;

impl<'e, E: InstEmitter> Lowering<'e, E> {
    pub fn compile_cast(
        &mut self,
        from: &ValType,
        to: &ValType,
        value: E::Value,
    ) -> Result<E::Value> {
        if from.is_vector() || to.is_vector() {
            return Err(unimplemented_cast(from, to));
        }
        if from == to {
            return Ok(value);
        }
        let to_mt = machine_type(to)?;
        machine_type(from)?;

        use ValType::*;
        match (from, to) {
            (UInt(f), Int(t)) if f > t => {
                let narrowed = self.truncate(value, from, to)?;
                self.keep_low_bits(narrowed, to, t - 1)
            }
            (UInt(f), Int(t) | UInt(t)) if f < t => self.zero_extend(value, from, to),
            (Int(f), UInt(t)) if f > t => self.truncate(value, from, to),
            (Int(f), UInt(t)) if f < t => {
                let masked = self.keep_low_bits(value, from, f - 1)?;
                self.zero_extend(masked, from, to)
            }
            (Int(f) | UInt(f), Int(t) | UInt(t)) if f == t => Ok(value),
            (UInt(f), UInt(t)) if f > t => self.truncate(value, from, to),
            (Int(_), Float(_)) => {
                let widened = self.widen_for_convert(value, from)?;
                self.emitter.convert(ConvertInst::FromSint, to_mt, widened)
            }
            (UInt(_), Float(_)) => {
                let widened = self.widen_for_convert(value, from)?;
                self.emitter.convert(ConvertInst::FromUint, to_mt, widened)
            }
            (Float(_), Int(_)) => self.float_to_int(value, to, ConvertInst::ToSint),
            (Float(_), UInt(_)) => self.float_to_int(value, to, ConvertInst::ToUint),
            (Int(f), Int(t)) => {
                if f < t {
                    self.sign_extend(value, from, to)
                } else {
                    self.truncate(value, from, to)
                }
            }
            (Float(f), Float(t)) => {
                if f < t {
                    self.emitter.convert(ConvertInst::Fpromote, to_mt, value)
                } else {
                    self.emitter.convert(ConvertInst::Fdemote, to_mt, value)
                }
            }
            _ => Err(unimplemented_cast(from, to)),
        }
    }

    /// Drop high bits down to `to`'s width.
    fn truncate(&mut self, value: E::Value, from: &ValType, to: &ValType) -> Result<E::Value> {
        let from_mt = machine_type(from)?;
        let to_mt = machine_type(to)?;
        let narrowed = if from_mt == to_mt {
            value
        } else {
            self.emitter.convert(ConvertInst::Reduce, to_mt, value)?
        };
        if to.bits() == 1 {
            self.keep_low_bits(narrowed, to, 1)
        } else {
            Ok(narrowed)
        }
    }

    fn zero_extend(&mut self, value: E::Value, from: &ValType, to: &ValType) -> Result<E::Value> {
        let from_mt = machine_type(from)?;
        let to_mt = machine_type(to)?;
        if from_mt == to_mt {
            Ok(value)
        } else {
            self.emitter.convert(ConvertInst::Uextend, to_mt, value)
        }
    }

    fn sign_extend(&mut self, value: E::Value, from: &ValType, to: &ValType) -> Result<E::Value> {
        let from_mt = machine_type(from)?;
        let to_mt = machine_type(to)?;
        // A one-bit value is stored as 0 or 1; its sign extension is 0 or -1.
        let value = if from.bits() == 1 {
            let zero = self.emitter.iconst(from_mt, 0)?;
            self.emitter.binary(BinaryInst::Isub, zero, value)
        } else {
            value
        };
        if from_mt == to_mt {
            Ok(value)
        } else {
            self.emitter.convert(ConvertInst::Sextend, to_mt, value)
        }
    }

    /// Clear every bit of `value` above the low `keep` bits. `ty` is the value's type.
    fn keep_low_bits(&mut self, value: E::Value, ty: &ValType, keep: u8) -> Result<E::Value> {
        let mask = if keep == 0 { 0 } else { (1u64 << keep) - 1 };
        let mask = self.emitter.iconst(machine_type(ty)?, mask as i64)?;
        Ok(self.emitter.binary(BinaryInst::Band, value, mask))
    }

    fn widen_for_convert(&mut self, value: E::Value, from: &ValType) -> Result<E::Value> {
        if from.bits() >= CONVERT_BITS {
            return Ok(value);
        }
        match from {
            ValType::Int(_) => self.sign_extend(value, from, &ValType::Int(CONVERT_BITS)),
            _ => self.zero_extend(value, from, &ValType::UInt(CONVERT_BITS)),
        }
    }

    fn float_to_int(
        &mut self,
        value: E::Value,
        to: &ValType,
        inst: ConvertInst,
    ) -> Result<E::Value> {
        if to.bits() >= CONVERT_BITS {
            return self.emitter.convert(inst, machine_type(to)?, value);
        }
        let wide = match to {
            ValType::Int(_) => ValType::Int(CONVERT_BITS),
            _ => ValType::UInt(CONVERT_BITS),
        };
        let converted = self.emitter.convert(inst, machine_type(&wide)?, value)?;
        self.truncate(converted, &wide, to)
    }
}

fn unimplemented_cast(from: &ValType, to: &ValType) -> CompileError {
    CompileError::UnimplementedInstruction(format!("cast from {} to {}", from, to))
}
