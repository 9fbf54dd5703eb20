/*! Lower pipeline IR to Cranelift.
 *
 * The lowering itself only talks to an [`InstEmitter`], the handful of code-generation
 * capabilities a statement tree needs. [`ClifEmitter`] backs it with a Cranelift function
 * builder, and [`PipelineCompiler`] wraps the result into an entry function of a JIT or object
 * module.
 */

pub mod cast;
pub mod clif;
pub mod emitter;
pub mod isa;
pub mod loops;
pub mod lowering;
pub mod machine;
pub mod memory;
pub mod module;
pub mod symbols;
pub mod wrapper;

pub use clif::ClifEmitter;
pub use emitter::InstEmitter;
pub use lowering::{EntryFrame, Lowering};
pub use machine::{machine_type, MachineType, ScalarType};
pub use module::{
    CompiledPipeline, EntryFunction, JitCompiler, ObjectCompiler, PipelineCompiler,
};
pub use symbols::SymbolTable;
