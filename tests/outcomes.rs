use std::fs;

use evmrt::util::ToHexString;

mod util;

// ============================================================================
// Generated fixture tests
// ============================================================================

include!(concat!(env!("OUT_DIR"), "/hex_tests.rs"));

// ============================================================================
// Helpers
// ============================================================================

/// Check that executing a given bytecode fixture produces its
/// recorded return data.  A fixture holds the code hex on its first
/// line and the expected output hex on its second.
fn check(name: &str) {
    let path = format!("tests/files/{name}.hex");
    let contents = fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    let code = lines.next().unwrap().trim();
    let expected = lines.next().unwrap_or("0x").trim();
    // Execute against a fresh host with a generous budget.
    let result = util::run(code, 10_000_000);
    assert!(result.success, "fixture {name} failed");
    assert_eq!(expected, result.output.to_hex_string());
}
