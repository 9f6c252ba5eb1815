// vector-compiler/src/symbols.rs
// Symbol table scan: text symbols named test_* become test records

use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::error::{CompileError, Result};
use crate::record::{TestRecord, TestSet};

/// `<address> <type> <name>` for local or global text symbols named test_*.
static TEST_SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9A-Fa-f]+)\s+[tT]\s+(test_\S+)\s*$").expect("valid regex"));

/// Build one poisoned record per test symbol, in listing order.
pub fn extract_tests(symbols: &str, binary: Vec<u8>) -> Result<TestSet> {
    let binary: Rc<[u8]> = Rc::from(binary);
    let mut tests = TestSet::new();

    for (i, line) in symbols.lines().enumerate() {
        let Some(caps) = TEST_SYMBOL.captures(line) else {
            continue;
        };
        let name = &caps[2];
        let offset = u64::from_str_radix(&caps[1], 16).map_err(|e| CompileError::Symbol {
            line: i + 1,
            message: format!("bad address for {}: {}", name, e),
        })?;

        if offset >= binary.len() as u64 {
            return Err(CompileError::OffsetOutOfBounds {
                name: name.to_string(),
                offset,
                len: binary.len(),
            });
        }

        trace!("symbol {} at {:#x}", name, offset);
        tests
            .insert(TestRecord::new(name, binary.clone(), offset))
            .map_err(|dup| CompileError::DuplicateSymbol { name: dup.name })?;
    }

    Ok(tests)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
00000010 t test_add
00000000 t test_mov
         U _external
00000020 d test_data
00000004 t helper
00000008 T test_global
";

    #[test]
    fn collects_text_test_symbols_in_listing_order() {
        let tests = extract_tests(LISTING, vec![0; 0x20]).unwrap();
        let found: Vec<_> = tests.iter().map(|t| (t.name.as_str(), t.offset)).collect();
        assert_eq!(found, [("test_add", 0x10), ("test_mov", 0), ("test_global", 8)]);
    }

    #[test]
    fn records_share_the_unit_binary() {
        let tests = extract_tests(LISTING, vec![0xaa; 0x20]).unwrap();
        let first = tests.get("test_add").unwrap();
        let second = tests.get("test_mov").unwrap();
        assert!(Rc::ptr_eq(&first.binary, &second.binary));
        assert_eq!(first.binary.len(), 0x20);
    }

    #[test]
    fn empty_listing_yields_no_tests() {
        let tests = extract_tests("", vec![0; 4]).unwrap();
        assert!(tests.is_empty());
    }

    #[test]
    fn offset_past_binary_is_rejected() {
        let err = extract_tests("00000004 t test_tail\n", vec![0; 4]).unwrap_err();
        assert!(matches!(err, CompileError::OffsetOutOfBounds { offset: 4, len: 4, .. }));
    }

    #[test]
    fn duplicate_symbol_is_rejected() {
        let err = extract_tests("00000000 t test_x\n00000002 t test_x\n", vec![0; 4]).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateSymbol { name } if name == "test_x"));
    }

    #[test]
    fn oversized_address_is_a_symbol_error() {
        let err = extract_tests("123456789abcdef01 t test_big\n", vec![0; 4]).unwrap_err();
        assert!(matches!(err, CompileError::Symbol { line: 1, .. }));
    }
}
