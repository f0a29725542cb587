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
mod arithmetic;
mod bitwise;
mod calls;
mod control;
mod environment;
mod heap;
mod host_ops;
mod stack_ops;

use super::{EvmError, Word};
use crate::bytecode::opcode::*;
use crate::program::OpHandler;

/// Resolve the body handler for a given opcode.  The instruction
/// stream stores the returned pointer, so dispatch never consults
/// this table at runtime.
pub(crate) fn handler(op: u8) -> OpHandler {
    match op {
        STOP => control::stop,
        ADD => arithmetic::add,
        MUL => arithmetic::mul,
        SUB => arithmetic::sub,
        DIV => arithmetic::div,
        SDIV => arithmetic::sdiv,
        MOD => arithmetic::rem,
        SMOD => arithmetic::smod,
        ADDMOD => arithmetic::addmod,
        MULMOD => arithmetic::mulmod,
        EXP => arithmetic::exp,
        SIGNEXTEND => arithmetic::signextend,
        LT => bitwise::lt,
        GT => bitwise::gt,
        SLT => bitwise::slt,
        SGT => bitwise::sgt,
        EQ => bitwise::eq,
        ISZERO => bitwise::iszero,
        AND => bitwise::and,
        OR => bitwise::or,
        XOR => bitwise::xor,
        NOT => bitwise::not,
        BYTE => bitwise::byte,
        SHL => bitwise::shl,
        SHR => bitwise::shr,
        SAR => bitwise::sar,
        KECCAK256 => heap::keccak256,
        ADDRESS => environment::address,
        BALANCE => host_ops::balance,
        ORIGIN => environment::origin,
        CALLER => environment::caller,
        CALLVALUE => environment::callvalue,
        CALLDATALOAD => environment::calldataload,
        CALLDATASIZE => environment::calldatasize,
        CALLDATACOPY => environment::calldatacopy,
        CODESIZE => environment::codesize,
        CODECOPY => environment::codecopy,
        GASPRICE => environment::gasprice,
        EXTCODESIZE => host_ops::extcodesize,
        EXTCODECOPY => host_ops::extcodecopy,
        RETURNDATASIZE => environment::returndatasize,
        RETURNDATACOPY => environment::returndatacopy,
        EXTCODEHASH => host_ops::extcodehash,
        BLOCKHASH => environment::blockhash,
        COINBASE => environment::coinbase,
        TIMESTAMP => environment::timestamp,
        NUMBER => environment::number,
        PREVRANDAO => environment::prevrandao,
        GASLIMIT => environment::gaslimit,
        CHAINID => environment::chainid,
        SELFBALANCE => environment::selfbalance,
        BASEFEE => environment::basefee,
        BLOBHASH => environment::blobhash,
        BLOBBASEFEE => environment::blobbasefee,
        POP => stack_ops::pop,
        MLOAD => heap::mload,
        MSTORE => heap::mstore,
        MSTORE8 => heap::mstore8,
        SLOAD => host_ops::sload,
        SSTORE => host_ops::sstore,
        PC => environment::pc,
        MSIZE => heap::msize,
        GAS => environment::gas,
        JUMPDEST => control::jumpdest,
        TLOAD => host_ops::tload,
        TSTORE => host_ops::tstore,
        MCOPY => heap::mcopy,
        DUP1..=DUP16 => stack_ops::dup,
        SWAP1..=SWAP16 => stack_ops::swap,
        LOG0..=LOG4 => host_ops::log,
        CREATE | CREATE2 => calls::create,
        CALL | CALLCODE | DELEGATECALL | STATICCALL => calls::call,
        RETURN => control::ret,
        REVERT => control::revert,
        SELFDESTRUCT => host_ops::selfdestruct,
        _ => control::invalid,
    }
}

/// Resolve the charge handler for an opcode with a runtime gas
/// component.  Charges run before the body; opcodes without a
/// dynamic component charge nothing here.
pub(crate) fn charge_handler(op: u8) -> OpHandler {
    match op {
        EXP => arithmetic::charge_exp,
        KECCAK256 => heap::charge_keccak256,
        BALANCE | EXTCODESIZE | EXTCODEHASH => host_ops::charge_account_access,
        EXTCODECOPY => host_ops::charge_extcodecopy,
        SLOAD => host_ops::charge_sload,
        SSTORE => host_ops::charge_sstore,
        LOG0..=LOG4 => host_ops::charge_log,
        CALL | CALLCODE | DELEGATECALL | STATICCALL => calls::charge_call,
        CREATE | CREATE2 => calls::charge_create,
        SELFDESTRUCT => host_ops::charge_selfdestruct,
        _ => control::charge_nothing,
    }
}

/// Narrow a word to a buffer offset or length.  Anything beyond the
/// platform range can never address a real buffer.
pub(crate) fn operand_usize(word: &Word) -> Result<usize, EvmError> {
    usize::try_from(*word).map_err(|_| EvmError::OutOfBounds)
}

/// Convert a boolean to the word the comparison instructions push.
pub(crate) fn word_bool(b: bool) -> Word {
    if b {
        Word::from(1u64)
    } else {
        Word::ZERO
    }
}
