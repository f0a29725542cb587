use evmrt::bytecode::{AnalysisConfig, AnalysisError, CodeAnalyzer, CodeKind};
use evmrt::fork::DEFAULT;
use evmrt::program::{Program, Tag};

mod util;
use util::compile;

// ============================================================================
// Block construction
// ============================================================================

#[test]
pub fn test_single_block_aggregates() {
    // PUSH1 0x42 ; PUSH1 0x00 ; MSTORE ; PUSH1 0x20 ; PUSH1 0x00 ; RETURN
    let (_, program) = compile("0x604260005260206000f3");
    let blocks: Vec<_> = program.blocks().collect();
    assert_eq!(blocks.len(), 1);
    let (index, block) = blocks[0];
    assert_eq!(index, 0);
    // Four pushes at 3 each, MSTORE at 3, RETURN at 0.
    assert_eq!(block.gas_cost, 15);
    assert_eq!(block.stack_req, 0);
    assert_eq!(block.stack_max_growth, 2);
}

#[test]
pub fn test_block_split_at_jumpdest() {
    // PUSH1 0x01 ; JUMPDEST ; POP ; STOP
    let (_, program) = compile("0x60015b5000");
    let blocks: Vec<_> = program.blocks().collect();
    assert_eq!(blocks.len(), 2);
    // Second block needs the value pushed by the first.
    let (_, second) = blocks[1];
    assert_eq!(second.stack_req, 1);
    assert_eq!(second.gas_cost, 3); // JUMPDEST + POP + STOP
}

#[test]
pub fn test_dynamic_ops_isolated() {
    // PUSH1 0 ; PUSH1 0 ; SSTORE ; STOP: the SSTORE gets its own
    // block so its stack consumption stays visible.
    let (_, program) = compile("0x600060005500");
    let tags: Vec<_> = (0..program.len()).map(|i| program.inst(i).tag()).collect();
    assert_eq!(
        tags,
        vec![
            Tag::BlockInfo,
            Tag::Word,
            Tag::Word,
            Tag::BlockInfo,
            Tag::DynamicGas,
            Tag::BlockInfo,
            Tag::Exec,
        ]
    );
    let blocks: Vec<_> = program.blocks().collect();
    assert_eq!(blocks[1].1.stack_req, 2);
}

// ============================================================================
// Jump resolution
// ============================================================================

#[test]
pub fn test_forward_jump_resolved() {
    // PUSH1 0x04 ; JUMP ; STOP ; JUMPDEST ; STOP
    let (_, program) = compile("0x600456005b00");
    let tags: Vec<_> = (0..program.len()).map(|i| program.inst(i).tag()).collect();
    assert_eq!(
        tags,
        vec![
            Tag::BlockInfo,
            Tag::Noop,
            Tag::JumpPc,
            Tag::BlockInfo,
            Tag::Exec,
            Tag::BlockInfo,
            Tag::Exec,
            Tag::Exec,
        ]
    );
    // The resolved target is the BLOCK_INFO opening the destination
    // block.
    let jump = program.inst(2);
    assert_eq!(program.slim(jump.id()).a, 5);
    assert_eq!(program.block_start_of(4), Some(5));
}

#[test]
pub fn test_backward_jump_resolved() {
    // JUMPDEST ; PUSH1 0x01 ; PUSH1 0x00 ; JUMP
    let (_, program) = compile("0x5b6001600056");
    let jump_index = (0..program.len())
        .find(|i| program.inst(*i).tag() == Tag::JumpPc)
        .unwrap();
    assert_eq!(program.slim(program.inst(jump_index).id()).a, 0);
}

#[test]
pub fn test_dynamic_jump_unresolved() {
    // PUSH1 0x00 ; CALLDATALOAD ; JUMP
    let (_, program) = compile("0x60003556");
    assert!((0..program.len()).any(|i| program.inst(i).tag() == Tag::JumpUnresolved));
}

// ============================================================================
// Peephole rewrites
// ============================================================================

#[test]
pub fn test_push_pop_dropped() {
    // PUSH1 0x01 ; POP leaves only the block and the implicit stop.
    let (_, program) = compile("0x600150");
    let tags: Vec<_> = (0..program.len()).map(|i| program.inst(i).tag()).collect();
    assert_eq!(tags, vec![Tag::BlockInfo, Tag::Exec]);
    // Gas still charges both dropped instructions.
    assert_eq!(program.blocks().next().unwrap().1.gas_cost, 5);
}

#[test]
pub fn test_dup_pop_dropped() {
    // PUSH1 0x01 ; DUP1 ; POP ; STOP
    let (_, program) = compile("0x6001805000");
    let tags: Vec<_> = (0..program.len()).map(|i| program.inst(i).tag()).collect();
    assert_eq!(tags, vec![Tag::BlockInfo, Tag::Word, Tag::Exec]);
}

#[test]
pub fn test_dup_push0_eq_collapses() {
    // PUSH1 0x05 ; DUP1 ; PUSH0 ; EQ ; STOP becomes a DUP1 followed
    // by ISZERO.
    let (_, program) = compile("0x6005805f1400");
    let tags: Vec<_> = (0..program.len()).map(|i| program.inst(i).tag()).collect();
    assert_eq!(
        tags,
        vec![Tag::BlockInfo, Tag::Word, Tag::Exec, Tag::Exec, Tag::Exec]
    );
}

#[test]
pub fn test_trailing_stop_appended() {
    // A lone PUSH falls through, so a STOP is synthesised.
    let (_, program) = compile("0x6001");
    let last = program.inst(program.len() - 1);
    assert_eq!(last.tag(), Tag::Exec);
    // Synthetic records carry no back-mapping.
    assert_eq!(program.pc_of(program.len() - 1), None);
}

#[test]
pub fn test_empty_program() {
    let (_, program) = compile("0x");
    let tags: Vec<_> = (0..program.len()).map(|i| program.inst(i).tag()).collect();
    assert_eq!(tags, vec![Tag::BlockInfo, Tag::Exec]);
}

// ============================================================================
// Mappings
// ============================================================================

#[test]
pub fn test_instruction_pc_mapping() {
    let (_, program) = compile("0x600456005b00");
    // The JUMP record originates from byte offset 2.
    assert_eq!(program.pc_of(2), Some(2));
    // Block info records are synthetic.
    assert_eq!(program.pc_of(0), None);
    // Bytes inside immediates map to no instruction.
    assert_eq!(program.block_start_of(1), None);
}

#[test]
pub fn test_compilation_idempotent() {
    let (_, first) = compile("0x6003565b60015b600656");
    let (_, second) = compile("0x6003565b60015b600656");
    assert_eq!(first.len(), second.len());
    for i in 0..first.len() {
        assert_eq!(first.inst(i), second.inst(i));
    }
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
pub fn test_artifacts_shareable_across_threads() {
    fn assert_shareable<T: Send + Sync>() {}
    assert_shareable::<evmrt::bytecode::CodeAnalysis>();
    assert_shareable::<Program>();
}

// ============================================================================
// Instruction budget
// ============================================================================

#[test]
pub fn test_instruction_budget_enforced() {
    // Initcode-sized runs of JUMPDEST decode to two records apiece,
    // which overflows the instruction budget.
    let code = vec![0x5b; 49152];
    let config = AnalysisConfig {
        kind: CodeKind::Initcode,
        ..AnalysisConfig::default()
    };
    let analysis = CodeAnalyzer::new(config).analyze(&code).unwrap();
    assert!(matches!(
        Program::compile(&analysis, DEFAULT),
        Err(AnalysisError::OutOfMemory)
    ));
}
