// vector-compiler/src/annotations.rs
// Source scan for test labels and `# REGISTER_IN/OUT` comments

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{CompileError, Result};
use crate::record::TestSet;
use crate::registers::{Direction, RegisterBank, RegisterWrite};

static LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(test_[^:\s]+):").expect("valid regex"));

/// Anything that claims to be an annotation, well formed or not.
static ANNOTATION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*#\s*REGISTER_").expect("valid regex"));

/// `# REGISTER_<IN|OUT> <bank><index?> <value>`
static ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#\s*REGISTER_(IN|OUT)\s+([A-Za-z]+)(\d*)\s+(\S+)\s*$").expect("valid regex")
});

/// One register assertion read from a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    pub direction: Direction,
    pub write: RegisterWrite,
}

/// Classification of a single source line.
#[derive(Debug, PartialEq, Eq)]
enum SourceLine<'a> {
    Label(&'a str),
    Annotation(Annotation),
    Other,
}

/// Parser state carried from one line to the next.
#[derive(Debug, Default)]
struct AnnotationCursor {
    /// Most recent test label seen above the current line.
    label: Option<String>,
    applied: usize,
}

/// Apply every annotation in `source` to the matching record in `tests`.
///
/// Returns the number of annotations applied.
pub fn apply_annotations(file: &Path, source: &str, tests: &mut TestSet) -> Result<usize> {
    let cursor = source
        .lines()
        .enumerate()
        .try_fold(AnnotationCursor::default(), |cursor, (i, text)| {
            cursor.advance(file, i + 1, text, tests)
        })?;

    debug!("{}: applied {} annotations", file.display(), cursor.applied);
    Ok(cursor.applied)
}

impl AnnotationCursor {
    fn advance(mut self, file: &Path, line: usize, text: &str, tests: &mut TestSet) -> Result<Self> {
        let parsed = classify(text).map_err(|message| CompileError::Annotation {
            file: file.to_path_buf(),
            line,
            label: self.label.clone(),
            message,
        })?;

        match parsed {
            SourceLine::Label(name) => self.label = Some(name.to_string()),
            SourceLine::Annotation(annotation) => {
                let Some(label) = self.label.as_deref() else {
                    return Err(CompileError::Annotation {
                        file: file.to_path_buf(),
                        line,
                        label: None,
                        message: "annotation outside of a test".into(),
                    });
                };
                let record = tests.get_mut(label).ok_or_else(|| CompileError::UnknownTest {
                    file: file.to_path_buf(),
                    line,
                    label: label.to_string(),
                })?;
                let context = match annotation.direction {
                    Direction::In => &mut record.input,
                    Direction::Out => &mut record.output,
                };
                let write = annotation.write;
                trace!(
                    "{}: {:?} {}{} = {:#x}",
                    label,
                    annotation.direction,
                    write.bank(),
                    write.index().map(|i| i.to_string()).unwrap_or_default(),
                    write.value()
                );
                context.apply(write);
                self.applied += 1;
            }
            SourceLine::Other => {}
        }
        Ok(self)
    }
}

fn classify(text: &str) -> std::result::Result<SourceLine<'_>, String> {
    if let Some(caps) = LABEL.captures(text) {
        return Ok(SourceLine::Label(caps.get(1).map_or("", |m| m.as_str())));
    }
    if !ANNOTATION_PREFIX.is_match(text) {
        return Ok(SourceLine::Other);
    }

    let caps = ANNOTATION
        .captures(text)
        .ok_or_else(|| format!("malformed register annotation `{}`", text.trim()))?;

    let direction = Direction::from_keyword(&caps[1])
        .ok_or_else(|| format!("unknown direction `{}`", &caps[1]))?;
    let bank = RegisterBank::lookup(&caps[2])
        .ok_or_else(|| format!("unknown register bank `{}`", &caps[2]))?;
    let index = match &caps[3] {
        "" => None,
        digits => Some(
            digits
                .parse::<usize>()
                .map_err(|_| format!("{}{} index out of range", bank, digits))?,
        ),
    };
    let value = parse_value(&caps[4])?;

    let write = RegisterWrite::new(bank, index, value)?;
    Ok(SourceLine::Annotation(Annotation { direction, write }))
}

/// Decimal or `0x`-prefixed hexadecimal integer literal.
pub fn parse_value(literal: &str) -> std::result::Result<u64, String> {
    let (digits, radix) = match literal.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => (literal, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(format!("unsupported value literal `{}`", literal));
    }
    u64::from_str_radix(digits, radix)
        .map_err(|_| format!("value `{}` does not fit in 64 bits", literal))
}
