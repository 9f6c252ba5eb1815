// vector-compiler/src/toolchain.rs
// External binutils driver: as -> ld -> nm -> objcopy

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{CompileError, Result};
use crate::target::Target;

/// Paths to the four external tools plus the layout they link for.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub assembler: PathBuf,
    pub linker: PathBuf,
    pub symbol_dump: PathBuf,
    pub objcopy: PathBuf,
    pub target: Target,
}

/// Raw toolchain output for one source file.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    /// Symbol table of the object file, in `nm` text format.
    pub symbols: String,
    /// Flat image of the linked text, starting at the link base.
    pub binary: Vec<u8>,
}

impl Toolchain {
    /// Assemble, link and flatten `source`, returning its symbols and image.
    ///
    /// Intermediates live in a private temporary directory that is removed
    /// when this returns, on success or failure.
    pub fn compile(&self, source: &Path) -> Result<CompiledUnit> {
        let workdir = TempDir::new().map_err(|e| CompileError::io(std::env::temp_dir(), e))?;
        let obj = workdir.path().join("unit.obj");
        let srec = workdir.path().join("unit.srec");
        let bin = workdir.path().join("unit.bin");

        let base = format!("{:#x}", self.target.text_base);
        let entry = format!("{:#x}", self.target.entry);

        run_tool(
            "as",
            &self.assembler,
            source,
            [
                OsStr::new("-little"),
                OsStr::new("-o"),
                obj.as_os_str(),
                source.as_os_str(),
            ],
        )?;

        run_tool(
            "ld",
            &self.linker,
            source,
            [
                OsStr::new("--oformat"),
                OsStr::new("srec"),
                OsStr::new("-Ttext"),
                OsStr::new(&base),
                OsStr::new("-e"),
                OsStr::new(&entry),
                OsStr::new("-o"),
                srec.as_os_str(),
                obj.as_os_str(),
            ],
        )?;

        let listing = run_tool("nm", &self.symbol_dump, source, [obj.as_os_str()])?;
        let symbols = String::from_utf8(listing.stdout).map_err(|_| CompileError::Toolchain {
            tool: "nm",
            input: source.to_path_buf(),
            status: "exit status: 0".into(),
            stderr: "symbol table is not valid UTF-8".into(),
        })?;

        run_tool(
            "objcopy",
            &self.objcopy,
            source,
            [
                OsStr::new("-I"),
                OsStr::new("srec"),
                OsStr::new("-O"),
                OsStr::new("binary"),
                OsStr::new("-R"),
                OsStr::new(self.target.stripped_section),
                srec.as_os_str(),
                bin.as_os_str(),
            ],
        )?;

        let binary = fs::read(&bin).map_err(|e| CompileError::io(&bin, e))?;
        debug!(
            "compiled {}: {} symbol bytes, {} image bytes",
            source.display(),
            symbols.len(),
            binary.len()
        );

        Ok(CompiledUnit { symbols, binary })
    }
}

/// Run one tool to completion, failing on spawn errors or non-zero exit.
fn run_tool<'a, I>(tool: &'static str, program: &Path, input: &Path, args: I) -> Result<Output>
where
    I: IntoIterator<Item = &'a OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    debug!("running {:?}", command);

    let output = command.output().map_err(|e| CompileError::Toolchain {
        tool,
        input: input.to_path_buf(),
        status: format!("could not run {}", program.display()),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(CompileError::tool_exit(tool, input, output.status, &output.stderr));
    }
    Ok(output)
}
