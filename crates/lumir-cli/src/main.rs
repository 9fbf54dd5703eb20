use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lumir")]
#[command(about = "lumir - compile scheduled image-processing pipelines to native code")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON pipeline to a relocatable object file
    Compile {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// `host` or a target triple such as `aarch64-unknown-linux-gnu`
        #[arg(long, default_value = "host")]
        target: String,

        #[arg(long, value_enum, default_value = "speed")]
        opt: Opt,

        /// Also emit `<name>_host`, taking host buffer objects
        #[arg(long)]
        host_wrapper: bool,

        /// Write the Cranelift IR of every emitted function to this file
        #[arg(long)]
        emit_clif: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Print a pipeline as IR text
    Print { input: PathBuf },

    /// List the buffers a pipeline touches and the parameter each one binds to
    Buffers { input: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Opt {
    None,
    Speed,
    SpeedAndSize,
}

impl From<Opt> for lumir_core::OptLevel {
    fn from(opt: Opt) -> Self {
        match opt {
            Opt::None => lumir_core::OptLevel::None,
            Opt::Speed => lumir_core::OptLevel::Speed,
            Opt::SpeedAndSize => lumir_core::OptLevel::SpeedAndSize,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Compile { verbose: true, .. });
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }),
    )
    .init();

    match cli.command {
        Commands::Compile {
            input,
            output,
            target,
            opt,
            host_wrapper,
            emit_clif,
            verbose,
        } => cmd_compile(
            input,
            output,
            target,
            opt,
            host_wrapper,
            emit_clif,
            verbose,
        ),
        Commands::Print { input } => cmd_print(input),
        Commands::Buffers { input } => cmd_buffers(input),
    }
}

fn read_pipeline(input: &Path) -> Result<lumir_core::Pipeline> {
    lumir_core::ir_persist::load_pipeline(input)
        .with_context(|| format!("Failed to read pipeline from {}", input.display()))
}

fn cmd_compile(
    input: PathBuf,
    output: Option<PathBuf>,
    target: String,
    opt: Opt,
    host_wrapper: bool,
    emit_clif: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    use colored::*;
    use lumir_core::{CodegenConfig, ObjectCompiler, Target};
    use std::fs;
    use std::time::Instant;

    let output = output.unwrap_or_else(|| input.with_extension("o"));

    if verbose {
        println!("{}", " lumir Compiler".bright_blue().bold());
        println!("{}", "=".repeat(50).bright_blue());
        println!(" Input: {}", input.display());
        println!(" Output: {}", output.display());
        println!(" Target: {}", target);
        println!(" Optimization: {:?}", opt);
        if host_wrapper {
            println!(" Host wrapper: enabled");
        }
        println!();
    }

    let start = Instant::now();
    let pipeline = read_pipeline(&input)?;
    tracing::debug!(pipeline = %pipeline.name, target = %target, "loaded pipeline");

    let config = CodegenConfig {
        target: Target::parse(&target),
        opt_level: opt.into(),
        dump_ir: verbose,
        ..CodegenConfig::default()
    };
    let mut compiler = ObjectCompiler::with_name(&pipeline.name, config)
        .context("Failed to set up code generation")?;

    let entry = compiler
        .assemble_pipeline(&pipeline)
        .with_context(|| format!("Failed to compile pipeline {}", pipeline.name))?;
    let mut functions = vec![entry];
    if host_wrapper {
        let wrapper = compiler
            .wrap(&functions[0])
            .with_context(|| format!("Failed to emit host wrapper for {}", pipeline.name))?;
        functions.push(wrapper);
    }

    if let Some(path) = emit_clif {
        let text = functions
            .iter()
            .map(|f| f.ir.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(&path, text)
            .with_context(|| format!("Failed to write Cranelift IR to {}", path.display()))?;
        if verbose {
            println!(" Cranelift IR written to {}", path.display());
        }
    }

    let bytes = compiler
        .write_object(&output)
        .context("Failed to write object file")?;

    println!(
        "{} {} ({} bytes) in {:.2?}",
        " Compiled".bright_green().bold(),
        output.display(),
        bytes,
        start.elapsed()
    );
    for function in &functions {
        println!(
            "   {}({})",
            function.name.bright_yellow(),
            function.param_names.join(", ")
        );
    }

    Ok(())
}

fn cmd_print(input: PathBuf) -> Result<()> {
    let pipeline = read_pipeline(&input)?;
    print!("{}", lumir_core::format::format_pipeline(&pipeline));
    Ok(())
}

fn cmd_buffers(input: PathBuf) -> Result<()> {
    use colored::*;

    let pipeline = read_pipeline(&input)?;
    let buffers = pipeline.buffers();

    if buffers.is_empty() {
        println!("  No buffers referenced");
        return Ok(());
    }

    println!(
        "{}",
        format!(" Pipeline {}: {} buffer(s)", pipeline.name, buffers.len())
            .bright_green()
            .bold()
    );
    for (idx, buffer) in buffers.iter().enumerate() {
        println!("   buf{} = {}", idx + 1, buffer);
    }

    Ok(())
}
