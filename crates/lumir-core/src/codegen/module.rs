use std::fs;
use std::path::Path;

use cranelift_codegen::ir::{AbiParam, Function, Signature, Type, UserFuncName};
use cranelift_codegen::print_errors::pretty_verifier_error;
use cranelift_codegen::{verify_function, CodegenError, Context};
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{default_libcall_names, FuncId, Linkage, Module, ModuleError};
use cranelift_object::{ObjectBuilder, ObjectModule};
use tracing::{debug, info};

use crate::{
    analysis::buffers_in_stmt,
    codegen::{
        clif::ClifEmitter,
        emitter::InstEmitter,
        isa::{build_isa, Residence},
        lowering::{EntryFrame, Lowering},
    },
    config::CodegenConfig,
    expr::BufferId,
    pipeline::Pipeline,
    stmt::Stmt,
    CompileError, Result,
};

/// A function defined in a [`PipelineCompiler`]'s module.
#[derive(Debug, Clone)]
pub struct EntryFunction {
    pub id: FuncId,
    pub name: String,
    /// Buffer bound to each parameter, in parameter order.
    pub buffers: Vec<BufferId>,
    pub param_names: Vec<String>,
    /// Cranelift IR text of the function as verified.
    pub ir: String,
}

impl EntryFunction {
    pub fn arity(&self) -> usize {
        self.buffers.len()
    }

    /// Parameter position that receives `buffer`.
    pub fn param_for(&self, buffer: BufferId) -> Option<usize> {
        self.buffers.iter().position(|b| *b == buffer)
    }
}

/// Assembles pipeline entry functions into one Cranelift module.
///
/// The compiler owns its module exclusively; compile independent pipelines in parallel with
/// independent compilers.
pub struct PipelineCompiler<M: Module> {
    pub(crate) module: M,
    pub(crate) config: CodegenConfig,
    pub(crate) ctx: Context,
    pub(crate) builder_context: FunctionBuilderContext,
}

pub type ObjectCompiler = PipelineCompiler<ObjectModule>;
pub type JitCompiler = PipelineCompiler<JITModule>;

impl<M: Module> PipelineCompiler<M> {
    pub fn from_module(module: M, config: CodegenConfig) -> Self {
        let ctx = module.make_context();
        Self {
            module,
            config,
            ctx,
            builder_context: FunctionBuilderContext::new(),
        }
    }

    pub fn assemble_pipeline(&mut self, pipeline: &Pipeline) -> Result<EntryFunction> {
        self.assemble(&pipeline.name, &pipeline.body)
    }

    /// Build the exported entry function `name` running `body`.
    ///
    /// Takes one pointer parameter per buffer `body` references, ordered by buffer id.
    pub fn assemble(&mut self, name: &str, body: &Stmt) -> Result<EntryFunction> {
        let buffers: Vec<BufferId> = buffers_in_stmt(body).into_iter().collect();
        let param_names = (1..=buffers.len()).map(|i| format!("buf{}", i)).collect();
        debug!(function = name, buffers = buffers.len(), "assembling entry function");

        let pointer = self.module.target_config().pointer_type();
        let mut sig = self.module.make_signature();
        sig.params
            .extend(buffers.iter().map(|_| AbiParam::new(pointer)));

        self.module.clear_context(&mut self.ctx);
        self.ctx.func.signature = sig.clone();
        let lowered = lower_body(
            &mut self.ctx.func,
            &mut self.builder_context,
            pointer,
            &buffers,
            body,
        );
        if let Err(e) = lowered {
            self.discard_function();
            return Err(e);
        }

        let (id, ir) = self.define(name, &sig)?;
        Ok(EntryFunction {
            id,
            name: name.to_string(),
            buffers,
            param_names,
            ir,
        })
    }

    /// Verify the function in `self.ctx` and define it in the module as `name`.
    pub(crate) fn define(&mut self, name: &str, sig: &Signature) -> Result<(FuncId, String)> {
        self.ctx.func.name = UserFuncName::testcase(name);
        let ir = self.ctx.func.display().to_string();
        if self.config.dump_ir {
            info!(function = name, "generated IR:\n{}", ir);
        }

        if let Err(errors) = verify_function(&self.ctx.func, self.module.isa()) {
            let message = pretty_verifier_error(&self.ctx.func, None, errors);
            self.discard_function();
            return Err(CompileError::CodegenFailed(message));
        }

        let id = match self.module.declare_function(name, Linkage::Export, sig) {
            Ok(id) => id,
            Err(e) => {
                self.discard_function();
                return Err(CompileError::Backend(format!(
                    "Failed to declare function {}: {}",
                    name, e
                )));
            }
        };
        self.ctx.func.name = UserFuncName::user(0, id.as_u32());
        let defined = self
            .module
            .define_function(id, &mut self.ctx)
            .map_err(|e| define_error(&self.ctx.func, name, e));
        self.module.clear_context(&mut self.ctx);
        defined?;

        debug!(function = name, "defined");
        Ok((id, ir))
    }

    fn discard_function(&mut self) {
        self.module.clear_context(&mut self.ctx);
        self.builder_context = FunctionBuilderContext::new();
    }
}

/// Verifier failures raised while compiling keep their diagnostics.
fn define_error(func: &Function, name: &str, err: ModuleError) -> CompileError {
    match err {
        ModuleError::Compilation(CodegenError::Verifier(errors)) => {
            CompileError::CodegenFailed(pretty_verifier_error(func, None, errors))
        }
        other => CompileError::Backend(format!("Failed to define function {}: {}", name, other)),
    }
}

fn lower_body(
    func: &mut Function,
    builder_context: &mut FunctionBuilderContext,
    pointer: Type,
    buffers: &[BufferId],
    body: &Stmt,
) -> Result<()> {
    let mut builder = FunctionBuilder::new(func, builder_context);
    let entry = builder.create_block();
    builder.append_block_params_for_function_params(entry);
    builder.switch_to_block(entry);
    builder.seal_block(entry);
    let params = builder.block_params(entry).to_vec();

    let mut emitter = ClifEmitter::new(&mut builder, pointer);
    {
        let frame = EntryFrame::new(buffers.iter().copied().zip(params));
        let mut lowering = Lowering::with_frame(&mut emitter, frame);
        lowering.compile_stmt(body)?;
    }
    emitter.return_void();

    builder.seal_all_blocks();
    builder.finalize();
    Ok(())
}

impl PipelineCompiler<ObjectModule> {
    pub fn new(config: CodegenConfig) -> Result<Self> {
        Self::with_name("pipeline", config)
    }

    /// Compiler for an object file whose module is called `name`.
    pub fn with_name(name: &str, config: CodegenConfig) -> Result<Self> {
        let isa = build_isa(&config, Residence::Object)?;
        let object_builder = ObjectBuilder::new(isa, name, default_libcall_names())
            .map_err(|e| CompileError::Backend(format!("Failed to create object: {}", e)))?;
        Ok(Self::from_module(ObjectModule::new(object_builder), config))
    }

    /// Serialize every defined function into a relocatable object.
    pub fn finish(self) -> Result<Vec<u8>> {
        let product = self.module.finish();
        product
            .emit()
            .map_err(|e| CompileError::Backend(format!("Failed to emit object: {}", e)))
    }

    pub fn write_object(self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let bytes = self.finish()?;
        fs::write(path, &bytes).map_err(|source| CompileError::ArtifactWriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "wrote object");
        Ok(bytes.len())
    }
}

impl PipelineCompiler<JITModule> {
    pub fn new(config: CodegenConfig) -> Result<Self> {
        let isa = build_isa(&config, Residence::Jit)?;
        let builder = JITBuilder::with_isa(isa, default_libcall_names());
        Ok(Self::from_module(JITModule::new(builder), config))
    }

    /// Make every defined function executable.
    pub fn finalize(mut self) -> Result<CompiledPipeline> {
        self.module
            .finalize_definitions()
            .map_err(|e| CompileError::Backend(format!("Failed to finalize module: {}", e)))?;
        Ok(CompiledPipeline {
            module: Some(self.module),
        })
    }
}

/// Executable code produced by a [`JitCompiler`].
pub struct CompiledPipeline {
    module: Option<JITModule>,
}

impl CompiledPipeline {
    /// Address of a finalized function. The code is freed when `self` is dropped.
    pub fn entry_address(&self, function: &EntryFunction) -> Option<*const u8> {
        self.module
            .as_ref()
            .map(|m| m.get_finalized_function(function.id))
    }

    /// Call `function` with one raw pointer per parameter.
    ///
    /// # Safety
    ///
    /// `function` must belong to this module and every pointer must be valid for all the
    /// elements the pipeline reads or writes through it.
    pub unsafe fn invoke(&self, function: &EntryFunction, args: &[*mut u8]) -> Result<()> {
        if args.len() != function.arity() {
            return Err(CompileError::InvalidIr(format!(
                "{} takes {} buffers, got {}",
                function.name,
                function.arity(),
                args.len()
            )));
        }
        let code = self.entry_address(function).ok_or_else(|| {
            CompileError::Backend(format!("{} has been freed", function.name))
        })?;

        type P = *mut u8;
        match *args {
            [] => std::mem::transmute::<*const u8, extern "C" fn()>(code)(),
            [a] => std::mem::transmute::<*const u8, extern "C" fn(P)>(code)(a),
            [a, b] => std::mem::transmute::<*const u8, extern "C" fn(P, P)>(code)(a, b),
            [a, b, c] => std::mem::transmute::<*const u8, extern "C" fn(P, P, P)>(code)(a, b, c),
            [a, b, c, d] => {
                std::mem::transmute::<*const u8, extern "C" fn(P, P, P, P)>(code)(a, b, c, d)
            }
            [a, b, c, d, e] => {
                std::mem::transmute::<*const u8, extern "C" fn(P, P, P, P, P)>(code)(
                    a, b, c, d, e,
                )
            }
            [a, b, c, d, e, f] => {
                std::mem::transmute::<*const u8, extern "C" fn(P, P, P, P, P, P)>(code)(
                    a, b, c, d, e, f,
                )
            }
            _ => {
                return Err(CompileError::UnimplementedInstruction(format!(
                    "invoking an entry function with {} buffers",
                    args.len()
                )))
            }
        }
        Ok(())
    }
}

impl Drop for CompiledPipeline {
    fn drop(&mut self) {
        if let Some(module) = self.module.take() {
            // SAFETY: entry addresses are documented as dead once the pipeline is dropped.
            unsafe { module.free_memory() };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cranelift_codegen::ir::entities::AnyEntity;
    use cranelift_codegen::verifier::{VerifierError, VerifierErrors};

    #[test]
    fn test_define_error_keeps_verifier_text() {
        let errors = VerifierErrors(vec![VerifierError {
            location: AnyEntity::Function,
            context: None,
            message: "lane mask width mismatch".to_string(),
        }]);
        let err = define_error(
            &Function::new(),
            "kernel",
            ModuleError::Compilation(CodegenError::Verifier(errors)),
        );
        match err {
            CompileError::CodegenFailed(text) => {
                assert!(text.contains("lane mask width mismatch"), "{}", text)
            }
            other => panic!("expected CodegenFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_define_error_other_failures_are_backend() {
        let err = define_error(
            &Function::new(),
            "kernel",
            ModuleError::Undeclared("kernel".to_string()),
        );
        match err {
            CompileError::Backend(text) => {
                assert!(text.starts_with("Failed to define function kernel"), "{}", text)
            }
            other => panic!("expected Backend, got {:?}", other),
        }
    }
}
