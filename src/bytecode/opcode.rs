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

// 0s: Stop and Arithmetic Operations
pub const STOP: u8 = 0x00;
pub const ADD: u8 = 0x01;
pub const MUL: u8 = 0x02;
pub const SUB: u8 = 0x03;
pub const DIV: u8 = 0x04;
pub const SDIV: u8 = 0x05;
pub const MOD: u8 = 0x06;
pub const SMOD: u8 = 0x07;
pub const ADDMOD: u8 = 0x08;
pub const MULMOD: u8 = 0x09;
pub const EXP: u8 = 0x0a;
pub const SIGNEXTEND: u8 = 0x0b;
// 10s: Comparison & Bitwise Logic Operations
pub const LT: u8 = 0x10;
pub const GT: u8 = 0x11;
pub const SLT: u8 = 0x12;
pub const SGT: u8 = 0x13;
pub const EQ: u8 = 0x14;
pub const ISZERO: u8 = 0x15;
pub const AND: u8 = 0x16;
pub const OR: u8 = 0x17;
pub const XOR: u8 = 0x18;
pub const NOT: u8 = 0x19;
pub const BYTE: u8 = 0x1a;
pub const SHL: u8 = 0x1b;
pub const SHR: u8 = 0x1c;
pub const SAR: u8 = 0x1d;
// 20s: Keccak256
pub const KECCAK256: u8 = 0x20;
// 30s: Environment Information
pub const ADDRESS: u8 = 0x30;
pub const BALANCE: u8 = 0x31;
pub const ORIGIN: u8 = 0x32;
pub const CALLER: u8 = 0x33;
pub const CALLVALUE: u8 = 0x34;
pub const CALLDATALOAD: u8 = 0x35;
pub const CALLDATASIZE: u8 = 0x36;
pub const CALLDATACOPY: u8 = 0x37;
pub const CODESIZE: u8 = 0x38;
pub const CODECOPY: u8 = 0x39;
pub const GASPRICE: u8 = 0x3a;
pub const EXTCODESIZE: u8 = 0x3b;
pub const EXTCODECOPY: u8 = 0x3c;
pub const RETURNDATASIZE: u8 = 0x3d;
pub const RETURNDATACOPY: u8 = 0x3e;
pub const EXTCODEHASH: u8 = 0x3f;
// 40s: Block Information
pub const BLOCKHASH: u8 = 0x40;
pub const COINBASE: u8 = 0x41;
pub const TIMESTAMP: u8 = 0x42;
pub const NUMBER: u8 = 0x43;
pub const PREVRANDAO: u8 = 0x44;
pub const GASLIMIT: u8 = 0x45;
pub const CHAINID: u8 = 0x46;
pub const SELFBALANCE: u8 = 0x47;
pub const BASEFEE: u8 = 0x48;
pub const BLOBHASH: u8 = 0x49;
pub const BLOBBASEFEE: u8 = 0x4a;
// 50s: Stack, Memory, Storage and Flow Operations
pub const POP: u8 = 0x50;
pub const MLOAD: u8 = 0x51;
pub const MSTORE: u8 = 0x52;
pub const MSTORE8: u8 = 0x53;
pub const SLOAD: u8 = 0x54;
pub const SSTORE: u8 = 0x55;
pub const JUMP: u8 = 0x56;
pub const JUMPI: u8 = 0x57;
pub const PC: u8 = 0x58;
pub const MSIZE: u8 = 0x59;
pub const GAS: u8 = 0x5a;
pub const JUMPDEST: u8 = 0x5b;
pub const TLOAD: u8 = 0x5c;
pub const TSTORE: u8 = 0x5d;
pub const MCOPY: u8 = 0x5e;
// 5f, 60s & 70s: Push Operations
pub const PUSH0: u8 = 0x5f;
pub const PUSH1: u8 = 0x60;
pub const PUSH32: u8 = 0x7f;
// 80s: Duplication Operations
pub const DUP1: u8 = 0x80;
pub const DUP16: u8 = 0x8f;
// 90s: Exchange Operations
pub const SWAP1: u8 = 0x90;
pub const SWAP16: u8 = 0x9f;
// a0s: Logging Operations
pub const LOG0: u8 = 0xa0;
pub const LOG1: u8 = 0xa1;
pub const LOG2: u8 = 0xa2;
pub const LOG3: u8 = 0xa3;
pub const LOG4: u8 = 0xa4;
// f0s: System Operations
pub const CREATE: u8 = 0xf0;
pub const CALL: u8 = 0xf1;
pub const CALLCODE: u8 = 0xf2;
pub const RETURN: u8 = 0xf3;
pub const DELEGATECALL: u8 = 0xf4;
pub const CREATE2: u8 = 0xf5;
pub const STATICCALL: u8 = 0xfa;
pub const REVERT: u8 = 0xfd;
pub const INVALID: u8 = 0xfe;
pub const SELFDESTRUCT: u8 = 0xff;

/// Check whether a given opcode pushes an immediate.  Observe that
/// `PUSH0` is excluded here since it carries no immediate bytes.
pub fn is_push(opcode: u8) -> bool {
    (PUSH1..=PUSH32).contains(&opcode)
}

/// Determine the width (in bytes) of the immediate carried by a given
/// push opcode.
pub fn push_width(opcode: u8) -> usize {
    if is_push(opcode) {
        (opcode - PUSH1 + 1) as usize
    } else {
        0
    }
}

/// Determine the total encoded length of the instruction beginning
/// with a given opcode (i.e. one byte plus any immediate).
pub fn instruction_length(opcode: u8) -> usize {
    1 + push_width(opcode)
}

/// Determine the mnemonic for a given opcode, or `"invalid"` if the
/// byte is not assigned.
pub fn mnemonic(opcode: u8) -> &'static str {
    match opcode {
        STOP => "stop",
        ADD => "add",
        MUL => "mul",
        SUB => "sub",
        DIV => "div",
        SDIV => "sdiv",
        MOD => "mod",
        SMOD => "smod",
        ADDMOD => "addmod",
        MULMOD => "mulmod",
        EXP => "exp",
        SIGNEXTEND => "signextend",
        LT => "lt",
        GT => "gt",
        SLT => "slt",
        SGT => "sgt",
        EQ => "eq",
        ISZERO => "iszero",
        AND => "and",
        OR => "or",
        XOR => "xor",
        NOT => "not",
        BYTE => "byte",
        SHL => "shl",
        SHR => "shr",
        SAR => "sar",
        KECCAK256 => "keccak256",
        ADDRESS => "address",
        BALANCE => "balance",
        ORIGIN => "origin",
        CALLER => "caller",
        CALLVALUE => "callvalue",
        CALLDATALOAD => "calldataload",
        CALLDATASIZE => "calldatasize",
        CALLDATACOPY => "calldatacopy",
        CODESIZE => "codesize",
        CODECOPY => "codecopy",
        GASPRICE => "gasprice",
        EXTCODESIZE => "extcodesize",
        EXTCODECOPY => "extcodecopy",
        RETURNDATASIZE => "returndatasize",
        RETURNDATACOPY => "returndatacopy",
        EXTCODEHASH => "extcodehash",
        BLOCKHASH => "blockhash",
        COINBASE => "coinbase",
        TIMESTAMP => "timestamp",
        NUMBER => "number",
        PREVRANDAO => "prevrandao",
        GASLIMIT => "gaslimit",
        CHAINID => "chainid",
        SELFBALANCE => "selfbalance",
        BASEFEE => "basefee",
        BLOBHASH => "blobhash",
        BLOBBASEFEE => "blobbasefee",
        POP => "pop",
        MLOAD => "mload",
        MSTORE => "mstore",
        MSTORE8 => "mstore8",
        SLOAD => "sload",
        SSTORE => "sstore",
        JUMP => "jump",
        JUMPI => "jumpi",
        PC => "pc",
        MSIZE => "msize",
        GAS => "gas",
        JUMPDEST => "jumpdest",
        TLOAD => "tload",
        TSTORE => "tstore",
        MCOPY => "mcopy",
        PUSH0 => "push0",
        PUSH1..=PUSH32 => PUSH_MNEMONICS[(opcode - PUSH1) as usize],
        DUP1..=DUP16 => DUP_MNEMONICS[(opcode - DUP1) as usize],
        SWAP1..=SWAP16 => SWAP_MNEMONICS[(opcode - SWAP1) as usize],
        LOG0 => "log0",
        LOG1 => "log1",
        LOG2 => "log2",
        LOG3 => "log3",
        LOG4 => "log4",
        CREATE => "create",
        CALL => "call",
        CALLCODE => "callcode",
        RETURN => "return",
        DELEGATECALL => "delegatecall",
        CREATE2 => "create2",
        STATICCALL => "staticcall",
        REVERT => "revert",
        INVALID => "invalid",
        SELFDESTRUCT => "selfdestruct",
        _ => "invalid",
    }
}

static PUSH_MNEMONICS: [&str; 32] = [
    "push1", "push2", "push3", "push4", "push5", "push6", "push7", "push8", "push9", "push10",
    "push11", "push12", "push13", "push14", "push15", "push16", "push17", "push18", "push19",
    "push20", "push21", "push22", "push23", "push24", "push25", "push26", "push27", "push28",
    "push29", "push30", "push31", "push32",
];

static DUP_MNEMONICS: [&str; 16] = [
    "dup1", "dup2", "dup3", "dup4", "dup5", "dup6", "dup7", "dup8", "dup9", "dup10", "dup11",
    "dup12", "dup13", "dup14", "dup15", "dup16",
];

static SWAP_MNEMONICS: [&str; 16] = [
    "swap1", "swap2", "swap3", "swap4", "swap5", "swap6", "swap7", "swap8", "swap9", "swap10",
    "swap11", "swap12", "swap13", "swap14", "swap15", "swap16",
];
