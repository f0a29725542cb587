use evmrt::bytecode::{
    analyze, find_metadata, initcode_gas, opcode, AnalysisConfig, AnalysisError, CodeAnalyzer,
    CodeBitmap, CodeKind, MAX_CODE_SIZE, MAX_INITCODE_SIZE,
};
use evmrt::execution::Word;

mod util;
use util::bytes;

// ============================================================================
// Boundary behaviours
// ============================================================================

#[test]
pub fn test_empty_input() {
    let analysis = analyze(&[]).unwrap();
    assert_eq!(analysis.runtime_code().len(), 0);
    assert!(analysis.metadata().is_none());
    assert_eq!(analysis.jumpdest_count(), 0);
    assert_eq!(analysis.next_pc(0), None);
}

#[test]
pub fn test_single_stop() {
    let analysis = analyze(&[0x00]).unwrap();
    assert_eq!(analysis.runtime_code(), &[0x00]);
    assert!(analysis.is_op_start(0));
    assert!(!analysis.is_push_data(0));
    assert_eq!(analysis.jumpdest_count(), 0);
}

#[test]
pub fn test_push32_exact_fit() {
    // Opcode plus exactly 32 immediate bytes.
    let mut code = vec![0x7f];
    code.extend_from_slice(&[0xab; 32]);
    let analysis = analyze(&code).unwrap();
    assert!(analysis.is_op_start(0));
    for i in 1..33 {
        assert!(analysis.is_push_data(i));
        assert!(!analysis.is_op_start(i));
    }
}

#[test]
pub fn test_push32_truncated() {
    // Opcode plus only 31 immediate bytes.
    let mut code = vec![0x7f];
    code.extend_from_slice(&[0xab; 31]);
    assert_eq!(
        analyze(&code),
        Err(AnalysisError::TruncatedPush { offset: 0 })
    );
}

#[test]
pub fn test_jumpdest_inside_push_data() {
    // PUSH1 0x5b: the 0x5b is immediate data, not a destination.
    let analysis = analyze(&bytes("0x605b")).unwrap();
    assert_eq!(analysis.jumpdest_count(), 0);
    assert!(!analysis.is_valid_jumpdest(1));
    assert!(analysis.is_push_data(1));
}

#[test]
pub fn test_size_limits() {
    assert!(analyze(&vec![0x00; MAX_CODE_SIZE]).is_ok());
    assert_eq!(
        analyze(&vec![0x00; MAX_CODE_SIZE + 1]),
        Err(AnalysisError::BytecodeTooLarge {
            len: MAX_CODE_SIZE + 1
        })
    );
    //
    let config = AnalysisConfig {
        kind: CodeKind::Initcode,
        ..AnalysisConfig::default()
    };
    assert!(CodeAnalyzer::new(config)
        .analyze(&vec![0x00; MAX_INITCODE_SIZE])
        .is_ok());
    assert_eq!(
        CodeAnalyzer::new(config).analyze(&vec![0x00; MAX_INITCODE_SIZE + 1]),
        Err(AnalysisError::InitcodeTooLarge {
            len: MAX_INITCODE_SIZE + 1
        })
    );
}

#[test]
pub fn test_invalid_opcode_rejected() {
    // 0x21 is unassigned under every fork.
    assert_eq!(
        analyze(&bytes("0x600121")),
        Err(AnalysisError::InvalidOpcode {
            offset: 2,
            opcode: 0x21
        })
    );
}

#[test]
pub fn test_designated_invalid_accepted() {
    // The designated INVALID instruction (0xfe) is a known opcode.
    assert!(analyze(&bytes("0xfe")).is_ok());
}

// ============================================================================
// Bitmap invariants
// ============================================================================

#[test]
pub fn test_bitmap_invariants() {
    // A representative mix of pushes, jumps and destinations.
    let analysis = analyze(&bytes("0x6003565b60015b600656")).unwrap();
    let code = analysis.runtime_code();
    for i in 0..code.len() {
        // No byte is both instruction start and immediate data.
        assert!(!(analysis.is_op_start(i) && analysis.is_push_data(i)));
        // Destinations are instruction starts holding 0x5b.
        if analysis.is_valid_jumpdest(i) {
            assert!(analysis.is_op_start(i));
            assert_eq!(code[i], opcode::JUMPDEST);
        }
    }
}

#[test]
pub fn test_push_immediates_marked() {
    let analysis = analyze(&bytes("0x61aabb60cc")).unwrap();
    // PUSH2 at 0 covers bytes 1 and 2; PUSH1 at 3 covers byte 4.
    assert!(analysis.is_op_start(0));
    assert!(analysis.is_push_data(1));
    assert!(analysis.is_push_data(2));
    assert!(analysis.is_op_start(3));
    assert!(analysis.is_push_data(4));
    assert_eq!(analysis.next_pc(0), Some(3));
    assert_eq!(analysis.next_pc(3), None);
    assert_eq!(analysis.read_push_value(0, 2), Some(Word::from(0xaabbu64)));
    assert_eq!(analysis.read_push_value(3, 1), Some(Word::from(0xccu64)));
}

#[test]
pub fn test_bitmap_queries() {
    let mut bitmap = CodeBitmap::new(300);
    for i in [0, 63, 64, 65, 130, 299] {
        bitmap.set(i);
    }
    assert_eq!(bitmap.count_in_range(0, 300), 6);
    assert_eq!(bitmap.count_in_range(0, 64), 2);
    assert_eq!(bitmap.count_in_range(64, 131), 3);
    assert_eq!(bitmap.next_set(0), Some(0));
    assert_eq!(bitmap.next_set(1), Some(63));
    assert_eq!(bitmap.next_set(66), Some(130));
    assert_eq!(bitmap.next_set(131), Some(299));
    assert_eq!(bitmap.next_set(300), None);
    assert!(!bitmap.get(301));
}

// ============================================================================
// Static jump validation
// ============================================================================

#[test]
pub fn test_static_jump_valid() {
    // PUSH1 0x04 ; JUMP ; STOP ; JUMPDEST ; STOP
    assert!(analyze(&bytes("0x600456005b00")).is_ok());
}

#[test]
pub fn test_static_jump_out_of_range() {
    // PUSH1 0x10 ; JUMP ; STOP with no destination at 0x10.
    assert_eq!(
        analyze(&bytes("0x60105600")),
        Err(AnalysisError::InvalidJumpDestination {
            offset: 2,
            target: 0x10
        })
    );
}

#[test]
pub fn test_static_jump_into_push_data() {
    // The 0x5b at offset 4 is immediate data of the PUSH at 3.
    assert_eq!(
        analyze(&bytes("0x600456605b00")),
        Err(AnalysisError::InvalidJumpDestination { offset: 2, target: 4 })
    );
}

#[test]
pub fn test_dynamic_jump_deferred() {
    // CALLDATALOAD-fed jumps cannot be validated statically.
    assert!(analyze(&bytes("0x6000355600")).is_ok());
}

// ============================================================================
// Metadata detection
// ============================================================================

/// A well-formed Solidity metadata tail with recognisable bytes.
fn metadata_tail() -> Vec<u8> {
    let mut tail = Vec::new();
    tail.push(0xa2);
    tail.extend_from_slice(b"\x64ipfs\x58\x22");
    tail.extend_from_slice(&[0x12; 34]);
    tail.extend_from_slice(b"\x64solc\x43");
    tail.extend_from_slice(&[0, 8, 21]);
    let len = tail.len() as u16;
    tail.extend_from_slice(&len.to_be_bytes());
    tail
}

#[test]
pub fn test_metadata_detected() {
    let mut code = bytes("0x6001600101");
    code.extend(metadata_tail());
    let analysis = analyze(&code).unwrap();
    let metadata = analysis.metadata().unwrap();
    assert_eq!(metadata.solc, [0, 8, 21]);
    assert_eq!(metadata.ipfs, [0x12; 34]);
    assert_eq!(analysis.runtime_code(), &bytes("0x6001600101")[..]);
    assert_eq!(code.len(), analysis.runtime_code().len() + metadata.len);
}

#[test]
pub fn test_metadata_malformed_ignored() {
    // Correct length suffix but a corrupted CBOR header.
    let mut code = bytes("0x00");
    let mut tail = metadata_tail();
    tail[0] = 0xa3;
    code.extend(tail);
    // The corrupted tail now has to survive opcode validation, which
    // it will not; what matters is that no metadata is detected.
    assert!(find_metadata(&code).is_none());
}

#[test]
pub fn test_metadata_short_input_ignored() {
    assert!(find_metadata(&bytes("0x00")).is_none());
    assert!(find_metadata(&[]).is_none());
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
pub fn test_analysis_idempotent() {
    let code = bytes("0x6003565b60015b600656");
    let first = analyze(&code).unwrap();
    let second = analyze(&code).unwrap();
    assert!(first == second);
}

// ============================================================================
// Initcode gas
// ============================================================================

#[test]
pub fn test_initcode_gas() {
    assert_eq!(initcode_gas(0), 0);
    assert_eq!(initcode_gas(1), 2);
    assert_eq!(initcode_gas(32), 2);
    assert_eq!(initcode_gas(33), 4);
    assert_eq!(initcode_gas(49152), 3072);
}
