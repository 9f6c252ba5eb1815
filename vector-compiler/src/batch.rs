// vector-compiler/src/batch.rs
// Batch driver: every input file into one descriptor include file

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::annotations::apply_annotations;
use crate::descriptor::format_descriptor;
use crate::error::{CompileError, Result};
use crate::record::TestSet;
use crate::symbols::extract_tests;
use crate::toolchain::Toolchain;

/// Counts reported after a successful batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub tests: usize,
}

/// Compile one source file into its fully annotated test records.
pub fn compile_unit(toolchain: &Toolchain, source: &Path) -> Result<TestSet> {
    let unit = toolchain.compile(source)?;
    let mut tests = extract_tests(&unit.symbols, unit.binary)?;

    let text = fs::read_to_string(source).map_err(|e| CompileError::io(source, e))?;
    apply_annotations(source, &text, &mut tests)?;

    debug!("{}: {} tests", source.display(), tests.len());
    Ok(tests)
}

/// Render descriptors for all inputs, in file order then symbol order.
pub fn render_batch(toolchain: &Toolchain, inputs: &[PathBuf]) -> Result<(String, BatchSummary)> {
    let mut out = String::new();
    let mut summary = BatchSummary::default();

    for input in inputs {
        info!("compiling {}", input.display());
        for record in compile_unit(toolchain, input)? {
            out.push_str(&format_descriptor(&toolchain.target, &record));
            out.push('\n');
            summary.tests += 1;
        }
        summary.files += 1;
    }

    Ok((out, summary))
}

/// Compile every input and replace `output` with the descriptor lines.
///
/// Every line is rendered before `output` is opened, so a failing input
/// leaves it untouched. The file is truncated in place, keeping its mode and
/// any symlink.
pub fn compile_batch(toolchain: &Toolchain, inputs: &[PathBuf], output: &Path) -> Result<BatchSummary> {
    let (text, summary) = render_batch(toolchain, inputs)?;
    fs::write(output, text).map_err(|e| CompileError::io(output, e))?;

    info!(
        "wrote {} {} tests from {} files to {}",
        summary.tests,
        toolchain.target.name,
        summary.files,
        output.display()
    );
    Ok(summary)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::target::SH4;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Stand-in binutils: the symbol table is whatever `#nm ` lines the
    /// source carries, and the image is eight fixed bytes.
    fn fake_toolchain(dir: &Path) -> Toolchain {
        Toolchain {
            assembler: script(dir, "as", r#"cp "$4" "$3""#),
            linker: script(dir, "ld", r#"cp "$9" "$8""#),
            symbol_dump: script(dir, "nm", r#"sed -n 's/^#nm //p' "$1""#),
            objcopy: script(dir, "objcopy", r#"printf '\011\000\013\000\011\000\013\000' > "$8""#),
            target: SH4,
        }
    }

    const FIRST: &str = "\
#nm 00000000 t test_one
#nm 00000004 t test_two
test_one:
  # REGISTER_IN r1 1
  rts
  nop
test_two:
  # REGISTER_OUT r1 2
  rts
  nop
";

    const SECOND: &str = "\
#nm 00000002 t test_three
test_three:
  rts
";

    #[test]
    fn writes_one_line_per_test_in_file_then_symbol_order() {
        let dir = tempfile::tempdir().unwrap();
        let tools = fake_toolchain(dir.path());
        let first = dir.path().join("first.s");
        let second = dir.path().join("second.s");
        fs::write(&first, FIRST).unwrap();
        fs::write(&second, SECOND).unwrap();
        let output = dir.path().join("tests.inc");

        let summary = compile_batch(&tools, &[first, second], &output).unwrap();
        assert_eq!(summary, BatchSummary { files: 2, tests: 3 });

        let written = fs::read_to_string(&output).unwrap();
        let names: Vec<_> = written
            .lines()
            .map(|l| l.trim_start_matches("TEST_SH4(").split(',').next().unwrap())
            .collect();
        assert_eq!(names, ["test_one", "test_two", "test_three"]);
        assert!(written.ends_with(")\n"));
    }

    #[test]
    fn output_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let tools = fake_toolchain(dir.path());
        let source = dir.path().join("first.s");
        fs::write(&source, FIRST).unwrap();
        let output = dir.path().join("tests.inc");

        compile_batch(&tools, &[source.clone()], &output).unwrap();
        let once = fs::read(&output).unwrap();
        compile_batch(&tools, &[source], &output).unwrap();
        assert_eq!(once, fs::read(&output).unwrap());
    }

    #[test]
    fn rewriting_keeps_the_output_mode() {
        let dir = tempfile::tempdir().unwrap();
        let tools = fake_toolchain(dir.path());
        let source = dir.path().join("first.s");
        fs::write(&source, FIRST).unwrap();
        let output = dir.path().join("tests.inc");
        fs::write(&output, "stale\nlines\nfrom\nan\nolder\nrun\n").unwrap();
        fs::set_permissions(&output, fs::Permissions::from_mode(0o644)).unwrap();

        compile_batch(&tools, &[source], &output).unwrap();

        let mode = fs::metadata(&output).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(!written.contains("stale"));
    }

    #[test]
    fn output_through_a_symlink_updates_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let tools = fake_toolchain(dir.path());
        let source = dir.path().join("first.s");
        fs::write(&source, FIRST).unwrap();
        let target = dir.path().join("real.inc");
        fs::write(&target, "").unwrap();
        let link = dir.path().join("tests.inc");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        compile_batch(&tools, &[source], &link).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap().lines().count(), 2);
    }

    #[test]
    fn failure_leaves_previous_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let tools = fake_toolchain(dir.path());
        let good = dir.path().join("first.s");
        let bad = dir.path().join("bad.s");
        fs::write(&good, FIRST).unwrap();
        fs::write(&bad, "#nm 00000000 t test_bad\ntest_bda:\n  # REGISTER_IN r0 1\n").unwrap();
        let output = dir.path().join("tests.inc");
        fs::write(&output, "previous\n").unwrap();

        let err = compile_batch(&tools, &[good, bad], &output).unwrap_err();
        assert!(matches!(err, CompileError::UnknownTest { .. }));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous\n");

        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        // as, ld, nm, objcopy, two sources, the old output
        assert_eq!(leftovers, 7);
    }
}
