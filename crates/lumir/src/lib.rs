/*! Native back end for scheduled image-processing pipelines.
 *
 * Single import for the pipeline IR, its text and JSON forms, and the Cranelift compilers that
 * turn a pipeline into JIT code, an object file or a host-callable wrapper.
 */

pub use lumir_core as core;

pub use lumir_core::{
    buffers_in_stmt,
    codegen::{CompiledPipeline, EntryFunction, JitCompiler, ObjectCompiler, PipelineCompiler},
    expr::{ArithOp, BufferId, CmpOp, Expr, LogicOp, MemRef},
    pipeline::Pipeline,
    stmt::{LoopVar, ReduceOp, Stmt},
    types::ValType,
    CodegenConfig, CompileError, OptLevel, Result, Target,
};

pub use lumir_core::format::format_pipeline;
pub use lumir_core::ir_persist::{load_pipeline, save_pipeline};
