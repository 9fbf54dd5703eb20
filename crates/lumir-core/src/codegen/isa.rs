use cranelift_codegen::isa::{self, OwnedTargetIsa};
use cranelift_codegen::settings::{self, Configurable};

use crate::{
    config::{CodegenConfig, Target},
    CompileError, Result,
};

/// How the finished code is going to be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residence {
    /// Relocatable object file linked by a system linker.
    Object,
    /// Executable memory inside this process.
    Jit,
}

pub fn build_isa(config: &CodegenConfig, residence: Residence) -> Result<OwnedTargetIsa> {
    let mut flag_builder = settings::builder();
    set_flag(&mut flag_builder, "opt_level", config.opt_level.as_setting())?;
    set_flag(
        &mut flag_builder,
        "enable_verifier",
        if config.enable_verifier { "true" } else { "false" },
    )?;
    let pic = residence == Residence::Object;
    set_flag(&mut flag_builder, "is_pic", if pic { "true" } else { "false" })?;
    set_flag(&mut flag_builder, "use_colocated_libcalls", "false")?;
    let flags = settings::Flags::new(flag_builder);

    let isa_builder = match &config.target {
        Target::Host => cranelift_native::builder().map_err(|msg| {
            CompileError::Backend(format!("Host machine is not supported: {}", msg))
        })?,
        Target::Triple(triple) => {
            if residence == Residence::Jit {
                return Err(CompileError::Backend(format!(
                    "JIT compilation requires the host target, not {}",
                    triple
                )));
            }
            isa::lookup_by_name(triple)
                .map_err(|e| CompileError::Backend(format!("Failed to lookup ISA: {}", e)))?
        }
    };

    isa_builder
        .finish(flags)
        .map_err(|e| CompileError::Backend(format!("Failed to create ISA: {}", e)))
}

fn set_flag(builder: &mut settings::Builder, name: &str, value: &str) -> Result<()> {
    builder
        .set(name, value)
        .map_err(|e| CompileError::Backend(format!("Invalid setting {}={}: {}", name, value, e)))
}
