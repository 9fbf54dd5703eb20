/*! Pipeline IR and native lowering for scheduled image-processing pipelines.
 *
 * The front end hands this crate a finished statement tree: loops over flat buffers, stores, and
 * numeric expressions whose casts must follow the source language's rules exactly. This crate
 * turns that tree into a Cranelift function taking one opaque pointer per referenced buffer, and
 * packages the result as an in-memory JIT module, an object file, or a host-callable wrapper.
 */

pub mod analysis;
pub mod codegen;
pub mod config;
pub mod expr;
pub mod format;
pub mod ir_persist;
pub mod pipeline;
pub mod stmt;
pub mod types;

pub use analysis::{buffers_in_expr, buffers_in_stmt};
pub use codegen::{
    CompiledPipeline, EntryFunction, JitCompiler, ObjectCompiler, PipelineCompiler,
};
pub use config::{CodegenConfig, OptLevel, Target};
pub use expr::{ArithOp, BufferId, CmpOp, Expr, LogicOp, MemRef};
pub use pipeline::Pipeline;
pub use stmt::{LoopVar, ReduceOp, Stmt};
pub use types::{Category, ValType};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    #[error("No entry function for memory reference: {0}")]
    MissingEntrypoint(String),
    #[error("Unimplemented instruction: {0}")]
    UnimplementedInstruction(String),
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("Code generation failed:\n{0}")]
    CodegenFailed(String),
    #[error("Failed to write artifact to {}: {source}", path.display())]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid IR: {0}")]
    InvalidIr(String),
    #[error("Cranelift error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests;
