use evmrt::execution::gas::{copy_gas, exp_gas, keccak_gas, log_gas, memory_gas, Gas};
use evmrt::execution::Word;

mod util;
use util::{returned_word, run};

// ============================================================================
// Cost formulae
// ============================================================================

#[test]
pub fn test_memory_gas_quadratic() {
    assert_eq!(memory_gas(0), 0);
    assert_eq!(memory_gas(32), 3);
    assert_eq!(memory_gas(64), 6);
    assert_eq!(memory_gas(1024), 98);
    // One word past the linear region costs more than three.
    assert!(memory_gas(1024 + 32) - memory_gas(1024) >= 3);
}

#[test]
pub fn test_copy_and_keccak_gas() {
    assert_eq!(copy_gas(0), 0);
    assert_eq!(copy_gas(1), 3);
    assert_eq!(copy_gas(32), 3);
    assert_eq!(copy_gas(33), 6);
    assert_eq!(keccak_gas(64), 12);
}

#[test]
pub fn test_exp_gas_per_exponent_byte() {
    assert_eq!(exp_gas(&Word::ZERO), 0);
    assert_eq!(exp_gas(&Word::from(0xffu64)), 50);
    assert_eq!(exp_gas(&Word::from(0x100u64)), 100);
    assert_eq!(exp_gas(&Word::MAX), 32 * 50);
}

#[test]
pub fn test_log_gas() {
    assert_eq!(log_gas(0, 0), 0);
    assert_eq!(log_gas(2, 10), 2 * 375 + 80);
}

// ============================================================================
// Gas counter
// ============================================================================

#[test]
pub fn test_sixty_three_sixty_fourths() {
    let gas = Gas::new(6400);
    assert_eq!(gas.forwardable(), 6300);
    let gas = Gas::new(64);
    assert_eq!(gas.forwardable(), 63);
    let gas = Gas::new(10);
    assert_eq!(gas.forwardable(), 10);
}

#[test]
pub fn test_memory_charge_settles_difference() {
    let mut gas = Gas::new(1000);
    gas.charge_memory(32).unwrap();
    assert_eq!(gas.left(), 997);
    // Growing to the same size is free.
    gas.charge_memory(32).unwrap();
    assert_eq!(gas.left(), 997);
    // Growing further charges only the difference.
    gas.charge_memory(64).unwrap();
    assert_eq!(gas.left(), 994);
}

// ============================================================================
// End-to-end gas accounting
// ============================================================================

#[test]
pub fn test_block_aggregate_matches_sum_of_bases() {
    // PUSH1 10 ; PUSH1 32 ; ADD ; POP ; STOP: 3 + 3 + 3 + 2.
    let result = run("0x600a6020015000", 100_000);
    assert!(result.success);
    assert_eq!(result.gas_left, 100_000 - 11);
}

#[test]
pub fn test_exp_charges_exponent_width() {
    // PUSH1 2(exponent) ; PUSH1 3(base) ; EXP ; return the word.
    // Base costs sum to 28, plus one exponent byte and one memory
    // word.
    let result = run("0x600260030a60005260206000f3", 100_000);
    assert!(result.success);
    assert_eq!(result.output, returned_word(9));
    assert_eq!(result.gas_left, 100_000 - 28 - 50 - 3);
}

#[test]
pub fn test_keccak_charges_per_word() {
    // KECCAK256 over one zeroed word, then discard and stop:
    // PUSH1 32 ; PUSH1 0 ; KECCAK256 ; POP ; STOP.
    // Bases 3 + 3 + 30 + 2; word cost 6; memory 3.
    let result = run("0x60206000205000", 100_000);
    assert!(result.success);
    assert_eq!(result.gas_left, 100_000 - 38 - 6 - 3);
}
