use std::fs;
use std::io::Write;
use std::path::Path;

pub static TESTS_DIR: &str = "tests/files";
pub static HEX_EXT: &str = "hex";

fn gentests(testdir: &str, ext: &str, target: &Path) {
    let mut f = fs::File::create(target).unwrap();
    // Open reference test directory
    let dir = fs::read_dir(testdir).unwrap();

    for e in dir {
        let p = e.as_ref().unwrap().path();
        let n = p.file_stem().unwrap().to_str().unwrap();
        //
        if p.extension().unwrap() == ext {
            writeln!(f).unwrap();
            writeln!(f, "#[test]").unwrap();
            writeln!(f, "fn test_{n}() {{ check(\"{n}\"); }}").unwrap();
        }
    }
}

/// The purpose of this script is to generate a test for each of the
/// bytecode fixtures.  Every fixture is analysed, compiled and then
/// executed end-to-end with its return data compared against the
/// expected value recorded in the fixture itself.
fn main() {
    // Create destination file
    let out_dir = std::env::var("OUT_DIR").unwrap();
    // Bytecode => Outcome tests
    let hex_file = std::path::Path::new(&out_dir).join("hex_tests.rs");
    gentests(TESTS_DIR, HEX_EXT, &hex_file);
}
