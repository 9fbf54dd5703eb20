use crate::{
    codegen::{
        emitter::{BinaryInst, InstEmitter},
        lowering::Lowering,
        machine::machine_type,
    },
    expr::MemRef,
    types::ValType,
    CompileError, Result,
};

impl<'e, E: InstEmitter> Lowering<'e, E> {
    /// Address of the element `mem` names, read or written as `ty`.
    ///
    /// Buffers are flat and element-indexed. Indices are not bounds checked; keeping them in
    /// range is the calling pipeline's job.
    pub fn resolve_address(&mut self, mem: &MemRef, ty: &ValType) -> Result<E::Value> {
        let frame = self.frame.as_ref().ok_or_else(|| {
            CompileError::MissingEntrypoint(format!("{} outside of any entry function", mem))
        })?;
        let base = frame.buffer(mem.buffer).ok_or_else(|| {
            CompileError::MissingEntrypoint(format!(
                "buffer {} is not a parameter of the entry function",
                mem.buffer
            ))
        })?;

        let element = machine_type(ty)?;
        let pointer = self.emitter.pointer_type();
        let index_ty = mem.index.ty();
        if index_ty.is_vector() || index_ty.is_float() {
            return Err(CompileError::UnimplementedInstruction(format!(
                "memory index of type {}",
                index_ty
            )));
        }

        let index = self.compile_expr(&mem.index)?;
        let pointer_int = ValType::Int(pointer.lane().bits() as u8);
        let index = self.compile_cast(&index_ty, &pointer_int, index)?;
        let stride = self.emitter.iconst(pointer, element.bytes() as i64)?;
        let offset = self.emitter.binary(BinaryInst::Imul, index, stride);
        Ok(self.emitter.binary(BinaryInst::Iadd, base, offset))
    }
}
