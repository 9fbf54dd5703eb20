use serde::{Deserialize, Serialize};

/// Settings shared by every function a compiler emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    pub target: Target,
    pub opt_level: OptLevel,
    pub enable_verifier: bool,
    /// Log the Cranelift IR of every function before it is verified.
    pub dump_ir: bool,
    /// Byte offset of the raw data pointer inside a host buffer object.
    pub host_data_offset: i32,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            target: Target::Host,
            opt_level: OptLevel::Speed,
            enable_verifier: true,
            dump_ir: false,
            host_data_offset: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Host,
    Triple(String),
}

impl Target {
    pub fn parse(s: &str) -> Self {
        match s {
            "host" | "native" => Target::Host,
            triple => Target::Triple(triple.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptLevel {
    None,
    Speed,
    SpeedAndSize,
}

impl OptLevel {
    pub fn as_setting(&self) -> &'static str {
        match self {
            OptLevel::None => "none",
            OptLevel::Speed => "speed",
            OptLevel::SpeedAndSize => "speed_and_size",
        }
    }
}
