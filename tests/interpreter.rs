use evmrt::execution::{create_address, CallKind, CallScheme, Host, Word};
use evmrt::util::ToHexString;

mod util;
use util::{bytes, host_with, returned_word, run, run_on, CONTRACT, SENDER};

// ============================================================================
// Straight-line execution
// ============================================================================

#[test]
pub fn test_mstore_return() {
    // PUSH1 0x42 ; PUSH1 0x00 ; MSTORE ; PUSH1 0x20 ; PUSH1 0x00 ; RETURN
    let result = run("0x604260005260206000f3", 100_000);
    assert!(result.success);
    assert_eq!(result.output, returned_word(0x42));
    // Five base costs of 3 plus one word of memory expansion.
    assert_eq!(result.gas_left, 100_000 - 18);
}

#[test]
pub fn test_arithmetic_chain() {
    // (5 + 3) * 2, returned as a word:
    // PUSH1 2 ; PUSH1 3 ; PUSH1 5 ; ADD ; MUL ; ...
    let result = run("0x600260036005010260005260206000f3", 100_000);
    assert!(result.success);
    assert_eq!(result.output, returned_word(16));
}

#[test]
pub fn test_division_by_zero_yields_zero() {
    // PUSH1 0 ; PUSH1 5 ; DIV leaves 5 / 0 = 0.
    let result = run("0x600060050460005260206000f3", 100_000);
    assert!(result.success);
    assert_eq!(result.output, returned_word(0));
}

#[test]
pub fn test_iszero_rewrite_preserves_semantics() {
    // PUSH1 0 ; DUP1 ; PUSH0 ; EQ writes whether the top is zero.
    let result = run("0x6000805f1460005260206000f3", 100_000);
    assert!(result.success);
    assert_eq!(result.output, returned_word(1));
}

#[test]
pub fn test_pc_materialised() {
    // PUSH1 1 ; POP ; PC: the counter reads 3 even though the
    // preceding pair was dropped by the peephole pass.
    let result = run("0x6001505860005260206000f3", 100_000);
    assert!(result.success);
    assert_eq!(result.output, returned_word(3));
}

// ============================================================================
// Jumps
// ============================================================================

#[test]
pub fn test_forward_jump() {
    // PUSH1 0x05 ; JUMP ; <padding> ; JUMPDEST at 5 ; STOP
    let result = run("0x60055600005b00", 100_000);
    assert!(result.success);
    assert!(result.output.is_empty());
}

#[test]
pub fn test_conditional_jump_taken() {
    // 0: PUSH1 1, 2: PUSH1 6, 4: JUMPI, 5: INVALID, 6: JUMPDEST,
    // 7: STOP.  The taken branch skips the INVALID.
    let result = run("0x6001600657fe5b00", 100_000);
    assert!(result.success);
}

#[test]
pub fn test_conditional_jump_fallthrough() {
    // 0: PUSH1 0, 2: PUSH1 7, 4: JUMPI, 5: PUSH1 1, 7: JUMPDEST,
    // then an mstore-return.  Condition zero falls through the push.
    let result = run("0x600060075760015b60005260206000f3", 100_000);
    assert!(result.success);
    assert_eq!(result.output, returned_word(1));
}

#[test]
pub fn test_runtime_jump_invalid() {
    // PUSH1 0 ; CALLDATALOAD ; JUMP with empty calldata targets
    // offset zero, which is no JUMPDEST.
    let result = run("0x6000355600", 100_000);
    assert!(!result.success);
    assert_eq!(result.gas_left, 0);
}

#[test]
pub fn test_loop_runs_out_of_gas() {
    // JUMPDEST ; PUSH1 1 ; PUSH1 0 ; JUMP spins until exhaustion.
    let result = run("0x5b6001600056", 10_000);
    assert!(!result.success);
    assert_eq!(result.gas_left, 0);
    assert!(result.output.is_empty());
}

// ============================================================================
// Revert and invalid
// ============================================================================

#[test]
pub fn test_revert_returns_data_and_gas() {
    // PUSH1 0x42 ; PUSH1 0 ; MSTORE ; PUSH1 32 ; PUSH1 0 ; REVERT
    let result = run("0x604260005260206000fd", 100_000);
    assert!(!result.success);
    assert_eq!(result.output, returned_word(0x42));
    // Remaining gas comes back on revert.
    assert_eq!(result.gas_left, 100_000 - 18);
}

#[test]
pub fn test_invalid_consumes_all_gas() {
    let result = run("0xfe", 100_000);
    assert!(!result.success);
    assert_eq!(result.gas_left, 0);
}

// ============================================================================
// Storage
// ============================================================================

#[test]
pub fn test_sstore_and_sload() {
    // Store 7 at slot 1, load it back and return it.
    // PUSH1 7 ; PUSH1 1 ; SSTORE ; PUSH1 1 ; SLOAD ; mstore-return.
    let code = "0x600760015560015460005260206000f3";
    let mut host = host_with(code, 0);
    let result = run_on(&mut host, 1_000_000, Vec::new());
    assert!(result.success);
    assert_eq!(result.output, returned_word(7));
    assert_eq!(
        host.account(&CONTRACT).unwrap().storage.get(&Word::from(1u64)),
        Some(&Word::from(7u64))
    );
}

#[test]
pub fn test_sstore_clear_refund() {
    // Clearing a pre-existing slot earns the clears refund.
    // PUSH1 0 ; PUSH1 0 ; SSTORE ; STOP
    let code = "0x600060005500";
    let mut host = host_with(code, 0);
    host.seed_storage(CONTRACT, Word::ZERO, Word::from(1u64));
    let result = run_on(&mut host, 1_000_000, Vec::new());
    assert!(result.success);
    assert_eq!(host.gas_refund(), 4800);
    // Two pushes, cold slot access, and the reset charge.
    assert_eq!(result.gas_left, 1_000_000 - 6 - 2100 - 2900);
}

#[test]
pub fn test_sstore_in_static_context_fails() {
    let code = "0x600160005500";
    let mut host = host_with(code, 0);
    let mut request = util::request(100_000, Vec::new());
    request.is_static = true;
    request.kind = CallKind::Call(CallScheme::StaticCall);
    let result = host.transact(request);
    assert!(!result.success);
    assert_eq!(result.gas_left, 0);
}

#[test]
pub fn test_transient_storage_roundtrip() {
    // TSTORE slot 0 := 9, TLOAD it back.
    let code = "0x600960005d60005c60005260206000f3";
    let result = run(code, 1_000_000);
    assert!(result.success);
    assert_eq!(result.output, returned_word(9));
}

// ============================================================================
// Logs
// ============================================================================

#[test]
pub fn test_log_emitted() {
    // LOG1 over one memory word with a constant topic.
    // PUSH1 0x42 ; PUSH1 0 ; MSTORE ; PUSH1 0x99 ; PUSH1 32 ;
    // PUSH1 0 ; LOG1 ; STOP
    let code = "0x6042600052609960206000a100";
    let mut host = host_with(code, 0);
    let result = run_on(&mut host, 1_000_000, Vec::new());
    assert!(result.success);
    assert_eq!(host.logs().len(), 1);
    let log = &host.logs()[0];
    assert_eq!(log.address, CONTRACT);
    assert_eq!(log.topics, vec![Word::from(0x99u64)]);
    assert_eq!(log.data, returned_word(0x42));
}

// ============================================================================
// Calls
// ============================================================================

const CALLEE: [u8; 20] = [0x33; 20];

/// A contract returning the word 0x2a.
const RETURN_42: &str = "0x602a60005260206000f3";

fn call_code(gas_hex: &str) -> String {
    // PUSH1 32(out len) ; PUSH1 0(out off) ; PUSH1 0(in len) ;
    // PUSH1 0(in off) ; PUSH1 0(value) ; PUSH20 callee ; PUSH2 gas ;
    // CALL ; PUSH1 32 ; PUSH1 0 ; RETURN
    let callee_hex = CALLEE.to_vec().to_hex_string();
    format!(
        "0x60206000600060006000 73{} 61{} f1 50 60206000f3",
        &callee_hex[2..],
        gas_hex
    )
    .replace(' ', "")
}

#[test]
pub fn test_nested_call_returns_output() {
    let mut host = host_with(&call_code("ffff"), 0);
    host.insert_account(CALLEE, Word::ZERO, bytes(RETURN_42));
    let result = run_on(&mut host, 1_000_000, Vec::new());
    assert!(result.success);
    assert_eq!(result.output, returned_word(0x2a));
}

#[test]
pub fn test_call_transfers_value() {
    // PUSH1 0 out_len/off/in_len/in_off, value 5, empty callee.
    let callee_hex = CALLEE.to_vec().to_hex_string();
    let code = format!(
        "0x6000600060006000 6005 73{} 61ffff f1 00",
        &callee_hex[2..]
    )
    .replace(' ', "");
    let mut host = host_with(&code, 100);
    host.insert_account(CALLEE, Word::ZERO, Vec::new());
    let result = run_on(&mut host, 1_000_000, Vec::new());
    assert!(result.success);
    assert_eq!(host.account(&CALLEE).unwrap().balance, Word::from(5u64));
    assert_eq!(host.account(&CONTRACT).unwrap().balance, Word::from(95u64));
}

#[test]
pub fn test_staticcall_blocks_writes() {
    // Parent STATICCALLs a child which tries to SSTORE; the child
    // frame fails and the parent sees a zero.
    let child = "0x600160005500";
    let callee_hex = CALLEE.to_vec().to_hex_string();
    // PUSH1 0 out_len/out_off/in_len/in_off ; PUSH20 ; PUSH2 gas ;
    // STATICCALL ; return the status word.
    let code = format!(
        "0x6000600060006000 73{} 61ffff fa 60005260206000f3",
        &callee_hex[2..]
    )
    .replace(' ', "");
    let mut host = host_with(&code, 0);
    host.insert_account(CALLEE, Word::ZERO, bytes(child));
    let result = run_on(&mut host, 1_000_000, Vec::new());
    assert!(result.success);
    assert_eq!(result.output, returned_word(0));
    assert!(host.account(&CALLEE).unwrap().storage.is_empty());
}

#[test]
pub fn test_inner_revert_discards_state() {
    // Child stores then reverts; parent returns its status.  The
    // store must not survive.
    let child = "0x6007600155 60006000fd";
    let callee_hex = CALLEE.to_vec().to_hex_string();
    let code = format!(
        "0x60006000600060006000 73{} 61ffff f1 60005260206000f3",
        &callee_hex[2..]
    )
    .replace(' ', "");
    let mut host = host_with(&code, 0);
    host.insert_account(CALLEE, Word::ZERO, bytes(&child.replace(' ', "")));
    let result = run_on(&mut host, 1_000_000, Vec::new());
    assert!(result.success);
    assert_eq!(result.output, returned_word(0));
    assert!(host.account(&CALLEE).unwrap().storage.is_empty());
}

// ============================================================================
// Create
// ============================================================================

#[test]
pub fn test_create_deploys_code() {
    // Initcode PUSH1 1 ; PUSH1 0 ; RETURN deploys the single byte
    // left in fresh memory: 0x00 (STOP).
    // Parent: PUSH5 initcode ; PUSH1 0 ; MSTORE ; PUSH1 5(len) ;
    // PUSH1 27(offset) ; PUSH1 0(value) ; CREATE ; STOP
    let code = "0x6460016000f3 600052 6005 601b 6000 f0 00";
    let mut host = host_with(&code.replace(' ', ""), 0);
    let result = run_on(&mut host, 1_000_000, Vec::new());
    assert!(result.success);
    // insert_account gave the parent nonce 1.
    let created = create_address(&CONTRACT, 1);
    let account = host.account(&created).unwrap();
    assert_eq!(account.code, vec![0x00]);
    assert!(host.was_created_in_tx(&created));
}

// ============================================================================
// Selfdestruct (EIP-6780)
// ============================================================================

#[test]
pub fn test_selfdestruct_pre_existing_moves_balance_only() {
    let recipient: [u8; 20] = [0x44; 20];
    let recipient_hex = recipient.to_vec().to_hex_string();
    let code = format!("0x73{}ff", &recipient_hex[2..]);
    let mut host = host_with(&code, 7);
    let result = run_on(&mut host, 1_000_000, Vec::new());
    assert!(result.success);
    assert_eq!(host.account(&recipient).unwrap().balance, Word::from(7u64));
    assert_eq!(host.account(&CONTRACT).unwrap().balance, Word::ZERO);
    // Deployed before this transaction, so it survives.
    assert!(host.destroyed().is_empty());
}

// ============================================================================
// Depth and context
// ============================================================================

#[test]
pub fn test_caller_and_value_visible() {
    // CALLER ; mstore-return.
    let code = "0x3360005260206000f3";
    let mut host = host_with(code, 0);
    let result = run_on(&mut host, 100_000, Vec::new());
    assert!(result.success);
    let mut expected = vec![0u8; 12];
    expected.extend_from_slice(&SENDER);
    assert_eq!(result.output, expected);
}

#[test]
pub fn test_calldata_load() {
    // PUSH1 0 ; CALLDATALOAD ; mstore-return echoes the first word.
    let code = "0x60003560005260206000f3";
    let mut host = host_with(code, 0);
    let mut input = vec![0u8; 32];
    input[31] = 0x55;
    let result = run_on(&mut host, 100_000, input);
    assert!(result.success);
    assert_eq!(result.output, returned_word(0x55));
}

