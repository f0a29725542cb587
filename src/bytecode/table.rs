// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use super::opcode::*;
use crate::execution::gas::costs;
use crate::fork::{Fork, BYZANTIUM, CANCUN, CONSTANTINOPLE, HOMESTEAD, ISTANBUL, LONDON, SHANGHAI};

// ===================================================================
// Opcode Kind
// ===================================================================

/// Classifies every opcode for the benefit of the block analyser and
/// the instruction-stream builder.  The kind determines whether an
/// opcode terminates a basic block, whether it carries an immediate,
/// and whether it incurs gas costs which cannot be determined
/// statically.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpcodeKind {
    /// Ends the enclosing basic block (`STOP`, `RETURN`, `REVERT`,
    /// `SELFDESTRUCT`, `JUMP`, `JUMPI`, `INVALID`).
    Terminator,
    /// Pushes an immediate of the given width (zero for `PUSH0`).
    Push(u8),
    /// Duplicates the nth stack item.
    Dup(u8),
    /// Swaps the top stack item with the nth below it.
    Swap(u8),
    /// Materialises the current program counter.
    Pc,
    /// Appends a log record with the given number of topics.
    Log(u8),
    /// `CALL`, `CALLCODE`, `DELEGATECALL`, `STATICCALL`.
    CallFamily,
    /// `CREATE`, `CREATE2`.
    CreateFamily,
    /// Storage write with tri-state refund accounting.
    SStore,
    /// Storage read with warm/cold accounting.
    SLoad,
    /// Hashing with per-word cost.
    Keccak,
    /// Account access with warm/cold accounting (`BALANCE`,
    /// `EXTCODESIZE`, `EXTCODECOPY`, `EXTCODEHASH`).
    DynamicAccess,
    /// Everything else: fixed cost, fully static.
    Plain,
    /// Unassigned under the active fork.
    Invalid,
}

// ===================================================================
// Opcode Info
// ===================================================================

/// Static metadata for a single opcode: its base gas cost, the
/// minimum number of stack operands it reads, and its net effect on
/// the stack height.  Costs which depend on runtime values (memory
/// expansion, access lists, etc) are charged separately by the
/// interpreter and do not appear here.
#[derive(Clone, Copy, Debug)]
pub struct OpcodeInfo {
    pub gas: u32,
    pub stack_min: u8,
    pub stack_delta: i8,
    pub kind: OpcodeKind,
}

impl OpcodeInfo {
    pub const INVALID: OpcodeInfo = OpcodeInfo {
        gas: 0,
        stack_min: 0,
        stack_delta: 0,
        kind: OpcodeKind::Invalid,
    };

    const fn new(gas: u32, stack_min: u8, stack_delta: i8, kind: OpcodeKind) -> Self {
        OpcodeInfo {
            gas,
            stack_min,
            stack_delta,
            kind,
        }
    }

    /// Check whether this opcode incurs gas costs beyond its static
    /// base cost.
    pub fn dynamic(&self) -> bool {
        matches!(
            self.kind,
            OpcodeKind::CallFamily
                | OpcodeKind::CreateFamily
                | OpcodeKind::SStore
                | OpcodeKind::SLoad
                | OpcodeKind::Keccak
                | OpcodeKind::DynamicAccess
                | OpcodeKind::Log(_)
        )
    }
}

// ===================================================================
// Table Construction
// ===================================================================

/// Construct the full 256-entry opcode table for a given fork.
/// Opcodes which the fork has not yet activated are reported as
/// `Invalid`, exactly as an unassigned byte would be.
pub fn opcode_table(fork: &Fork) -> [OpcodeInfo; 256] {
    use OpcodeKind::*;
    let mut t = [OpcodeInfo::INVALID; 256];
    let mut set = |op: u8, info: OpcodeInfo| t[op as usize] = info;
    // 0s: Stop and Arithmetic Operations
    set(STOP, OpcodeInfo::new(costs::ZERO, 0, 0, Terminator));
    set(ADD, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    set(MUL, OpcodeInfo::new(costs::LOW, 2, -1, Plain));
    set(SUB, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    set(DIV, OpcodeInfo::new(costs::LOW, 2, -1, Plain));
    set(SDIV, OpcodeInfo::new(costs::LOW, 2, -1, Plain));
    set(MOD, OpcodeInfo::new(costs::LOW, 2, -1, Plain));
    set(SMOD, OpcodeInfo::new(costs::LOW, 2, -1, Plain));
    set(ADDMOD, OpcodeInfo::new(costs::MID, 3, -2, Plain));
    set(MULMOD, OpcodeInfo::new(costs::MID, 3, -2, Plain));
    // EXP carries a per-byte exponent surcharge on top of its base.
    set(EXP, OpcodeInfo::new(costs::EXP, 2, -1, Plain));
    set(SIGNEXTEND, OpcodeInfo::new(costs::LOW, 2, -1, Plain));
    // 10s: Comparison & Bitwise Logic Operations
    set(LT, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    set(GT, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    set(SLT, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    set(SGT, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    set(EQ, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    set(ISZERO, OpcodeInfo::new(costs::VERYLOW, 1, 0, Plain));
    set(AND, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    set(OR, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    set(XOR, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    set(NOT, OpcodeInfo::new(costs::VERYLOW, 1, 0, Plain));
    set(BYTE, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    if fork.is_at_least(&CONSTANTINOPLE) {
        set(SHL, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
        set(SHR, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
        set(SAR, OpcodeInfo::new(costs::VERYLOW, 2, -1, Plain));
    }
    // 20s: Keccak256
    set(KECCAK256, OpcodeInfo::new(costs::KECCAK256, 2, -1, Keccak));
    // 30s: Environment Information
    set(ADDRESS, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(BALANCE, OpcodeInfo::new(costs::ZERO, 1, 0, DynamicAccess));
    set(ORIGIN, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(CALLER, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(CALLVALUE, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(CALLDATALOAD, OpcodeInfo::new(costs::VERYLOW, 1, 0, Plain));
    set(CALLDATASIZE, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(CALLDATACOPY, OpcodeInfo::new(costs::VERYLOW, 3, -3, Plain));
    set(CODESIZE, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(CODECOPY, OpcodeInfo::new(costs::VERYLOW, 3, -3, Plain));
    set(GASPRICE, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(EXTCODESIZE, OpcodeInfo::new(costs::ZERO, 1, 0, DynamicAccess));
    set(EXTCODECOPY, OpcodeInfo::new(costs::ZERO, 4, -4, DynamicAccess));
    if fork.is_at_least(&BYZANTIUM) {
        set(RETURNDATASIZE, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
        set(RETURNDATACOPY, OpcodeInfo::new(costs::VERYLOW, 3, -3, Plain));
    }
    if fork.is_at_least(&CONSTANTINOPLE) {
        set(EXTCODEHASH, OpcodeInfo::new(costs::ZERO, 1, 0, DynamicAccess));
    }
    // 40s: Block Information
    set(BLOCKHASH, OpcodeInfo::new(costs::BLOCKHASH, 1, 0, Plain));
    set(COINBASE, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(TIMESTAMP, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(NUMBER, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(PREVRANDAO, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(GASLIMIT, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    if fork.is_at_least(&ISTANBUL) {
        set(CHAINID, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
        set(SELFBALANCE, OpcodeInfo::new(costs::LOW, 0, 1, Plain));
    }
    if fork.is_at_least(&LONDON) {
        set(BASEFEE, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    }
    if fork.is_at_least(&CANCUN) {
        set(BLOBHASH, OpcodeInfo::new(costs::VERYLOW, 1, 0, Plain));
        set(BLOBBASEFEE, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    }
    // 50s: Stack, Memory, Storage and Flow Operations
    set(POP, OpcodeInfo::new(costs::BASE, 1, -1, Plain));
    set(MLOAD, OpcodeInfo::new(costs::VERYLOW, 1, 0, Plain));
    set(MSTORE, OpcodeInfo::new(costs::VERYLOW, 2, -2, Plain));
    set(MSTORE8, OpcodeInfo::new(costs::VERYLOW, 2, -2, Plain));
    set(SLOAD, OpcodeInfo::new(costs::ZERO, 1, 0, SLoad));
    set(SSTORE, OpcodeInfo::new(costs::ZERO, 2, -2, SStore));
    set(JUMP, OpcodeInfo::new(costs::MID, 1, -1, Terminator));
    set(JUMPI, OpcodeInfo::new(costs::HIGH, 2, -2, Terminator));
    set(PC, OpcodeInfo::new(costs::BASE, 0, 1, Pc));
    set(MSIZE, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(GAS, OpcodeInfo::new(costs::BASE, 0, 1, Plain));
    set(JUMPDEST, OpcodeInfo::new(costs::JUMPDEST, 0, 0, Plain));
    if fork.is_at_least(&CANCUN) {
        set(TLOAD, OpcodeInfo::new(costs::WARM_ACCESS, 1, 0, Plain));
        set(TSTORE, OpcodeInfo::new(costs::WARM_ACCESS, 2, -2, Plain));
        set(MCOPY, OpcodeInfo::new(costs::VERYLOW, 3, -3, Plain));
    }
    // 5f, 60s & 70s: Push Operations
    if fork.is_at_least(&SHANGHAI) {
        set(PUSH0, OpcodeInfo::new(costs::BASE, 0, 1, Push(0)));
    }
    for n in 1..=32u8 {
        set(
            PUSH1 + n - 1,
            OpcodeInfo::new(costs::VERYLOW, 0, 1, Push(n)),
        );
    }
    // 80s: Duplication Operations
    for n in 1..=16u8 {
        set(DUP1 + n - 1, OpcodeInfo::new(costs::VERYLOW, n, 1, Dup(n)));
    }
    // 90s: Exchange Operations
    for n in 1..=16u8 {
        set(
            SWAP1 + n - 1,
            OpcodeInfo::new(costs::VERYLOW, n + 1, 0, Swap(n)),
        );
    }
    // a0s: Logging Operations
    for n in 0..=4u8 {
        set(
            LOG0 + n,
            OpcodeInfo::new(costs::LOG, n + 2, -((n + 2) as i8), Log(n)),
        );
    }
    // f0s: System Operations
    set(CREATE, OpcodeInfo::new(costs::CREATE, 3, -2, CreateFamily));
    set(CALL, OpcodeInfo::new(costs::ZERO, 7, -6, CallFamily));
    set(CALLCODE, OpcodeInfo::new(costs::ZERO, 7, -6, CallFamily));
    set(RETURN, OpcodeInfo::new(costs::ZERO, 2, -2, Terminator));
    if fork.is_at_least(&HOMESTEAD) {
        set(DELEGATECALL, OpcodeInfo::new(costs::ZERO, 6, -5, CallFamily));
    }
    if fork.is_at_least(&CONSTANTINOPLE) {
        set(CREATE2, OpcodeInfo::new(costs::CREATE, 4, -3, CreateFamily));
    }
    if fork.is_at_least(&BYZANTIUM) {
        set(STATICCALL, OpcodeInfo::new(costs::ZERO, 6, -5, CallFamily));
        set(REVERT, OpcodeInfo::new(costs::ZERO, 2, -2, Terminator));
    }
    // The designated invalid instruction is a known opcode; executing
    // it aborts the frame, but code containing it still validates.
    set(INVALID, OpcodeInfo::new(costs::ZERO, 0, 0, Terminator));
    set(
        SELFDESTRUCT,
        OpcodeInfo::new(costs::SELFDESTRUCT, 1, -1, Terminator),
    );
    //
    t
}
