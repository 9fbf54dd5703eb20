use cranelift_codegen::ir::{AbiParam, InstBuilder, MemFlags};
use cranelift_frontend::FunctionBuilder;
use cranelift_module::Module;
use tracing::debug;

use crate::{
    codegen::module::{EntryFunction, PipelineCompiler},
    Result,
};

impl<M: Module> PipelineCompiler<M> {
    /// Define `<entry>_host`, which takes host buffer objects instead of raw pointers.
    ///
    /// Each argument points at a host object whose data pointer sits
    /// `CodegenConfig::host_data_offset` bytes in; that layout belongs to the host runtime. The
    /// wrapper loads every data pointer, calls `entry` with them and returns nothing. Only
    /// useful when the code is embedded in such a runtime.
    pub fn wrap(&mut self, entry: &EntryFunction) -> Result<EntryFunction> {
        let name = format!("{}_host", entry.name);
        let pointer = self.module.target_config().pointer_type();
        let offset = self.config.host_data_offset;
        debug!(function = %name, target = %entry.name, offset, "emitting host wrapper");

        let mut sig = self.module.make_signature();
        sig.params
            .extend(entry.buffers.iter().map(|_| AbiParam::new(pointer)));

        self.module.clear_context(&mut self.ctx);
        self.ctx.func.signature = sig.clone();
        let callee = self
            .module
            .declare_func_in_func(entry.id, &mut self.ctx.func);

        {
            let mut builder = FunctionBuilder::new(&mut self.ctx.func, &mut self.builder_context);
            let block = builder.create_block();
            builder.append_block_params_for_function_params(block);
            builder.switch_to_block(block);
            builder.seal_block(block);

            let objects = builder.block_params(block).to_vec();
            let raw: Vec<_> = objects
                .into_iter()
                .map(|object| {
                    builder
                        .ins()
                        .load(pointer, MemFlags::trusted(), object, offset)
                })
                .collect();
            builder.ins().call(callee, &raw);
            builder.ins().return_(&[]);
            builder.finalize();
        }

        let (id, ir) = self.define(&name, &sig)?;
        Ok(EntryFunction {
            id,
            name,
            buffers: entry.buffers.clone(),
            param_names: entry
                .param_names
                .iter()
                .map(|p| format!("{}_obj", p))
                .collect(),
            ir,
        })
    }
}
