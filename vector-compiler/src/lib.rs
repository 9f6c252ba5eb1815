//! SH4 test-vector compiler.
//!
//! Assembles annotated test routines with the real binutils, pairs each
//! `test_*` symbol with the register state declared in its
//! `# REGISTER_IN` / `# REGISTER_OUT` comments, and emits one harness macro
//! invocation per test.

pub mod annotations;
pub mod batch;
pub mod descriptor;
pub mod error;
pub mod record;
pub mod registers;
pub mod symbols;
pub mod target;
pub mod toolchain;

pub use batch::{compile_batch, compile_unit, render_batch, BatchSummary};
pub use error::{CompileError, Result};
pub use record::{TestRecord, TestSet};
pub use target::{Target, SH4};
pub use toolchain::{CompiledUnit, Toolchain};
