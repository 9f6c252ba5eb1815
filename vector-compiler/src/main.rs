//! `vectorc`: compiles annotated SH4 assembly into `TEST_SH4(...)` descriptors.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use vector_compiler::{compile_batch, Toolchain, SH4};

/// Vectorc command line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Annotated assembly sources, compiled in the order given.
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<PathBuf>,
    /// Path to sh-elf-as.
    #[arg(long = "as", env = "SH4_AS", value_name = "PATH")]
    assembler: PathBuf,
    /// Path to sh-elf-ld.
    #[arg(long = "ld", env = "SH4_LD", value_name = "PATH")]
    linker: PathBuf,
    /// Path to sh-elf-nm.
    #[arg(long, env = "SH4_NM", value_name = "PATH")]
    nm: PathBuf,
    /// Path to sh-elf-objcopy.
    #[arg(long, env = "SH4_OBJCOPY", value_name = "PATH")]
    objcopy: PathBuf,
    /// Descriptor include file to (re)write.
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
    /// Increase output verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let toolchain = Toolchain {
        assembler: cli.assembler,
        linker: cli.linker,
        symbol_dump: cli.nm,
        objcopy: cli.objcopy,
        target: SH4,
    };
    debug!("toolchain {:?}", toolchain);

    compile_batch(&toolchain, &cli.inputs, &cli.output)
        .with_context(|| format!("failed to generate {}", cli.output.display()))?;
    Ok(())
}
