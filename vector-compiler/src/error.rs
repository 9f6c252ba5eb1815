// vector-compiler/src/error.rs
// Error taxonomy for the test-vector pipeline

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result alias used throughout the compiler.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors raised while turning annotated assembly into descriptors.
///
/// Every variant is fatal for the whole batch.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Reading a source or intermediate artifact, or writing the output, failed.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external tool could not be spawned or exited abnormally.
    #[error("{tool} failed on {}: {status}{}", .input.display(), format_stderr(.stderr))]
    Toolchain {
        tool: &'static str,
        input: PathBuf,
        status: String,
        stderr: String,
    },

    /// A symbol table line looked like a test symbol but could not be read.
    #[error("symbol table line {line}: {message}")]
    Symbol { line: usize, message: String },

    /// The same test symbol appeared twice in one symbol table.
    #[error("duplicate test symbol `{name}`")]
    DuplicateSymbol { name: String },

    /// A test entry point lies outside the extracted binary.
    #[error("test `{name}` starts at {offset:#x} but the binary is only {len} bytes")]
    OffsetOutOfBounds { name: String, offset: u64, len: usize },

    /// An annotation is attributed to a label the symbol table does not know.
    #[error("{}:{line}: annotation for unknown test `{label}`", .file.display())]
    UnknownTest {
        file: PathBuf,
        line: usize,
        label: String,
    },

    /// A register annotation is malformed or addresses an invalid slot.
    #[error("{}:{line}: {}{message}", .file.display(), format_label(.label))]
    Annotation {
        file: PathBuf,
        line: usize,
        label: Option<String>,
        message: String,
    },
}

impl CompileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn tool_exit(
        tool: &'static str,
        input: impl Into<PathBuf>,
        status: ExitStatus,
        stderr: &[u8],
    ) -> Self {
        CompileError::Toolchain {
            tool,
            input: input.into(),
            status: status.to_string(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

fn format_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr)
    }
}

fn format_label(label: &Option<String>) -> String {
    match label {
        Some(label) => format!("in `{}`: ", label),
        None => String::new(),
    }
}
