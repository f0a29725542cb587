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
use sha3::{Digest, Keccak256};

use super::operand_usize;
use crate::bytecode::opcode::LOG0;
use crate::execution::gas::{copy_gas, costs, log_gas};
use crate::execution::{word_to_address, EvmError, Halt, Interpreter, Word};

// ===================================================================
// Account Access (EIP-2929)
// ===================================================================

/// `BALANCE`, `EXTCODESIZE`, `EXTCODEHASH`: the whole cost is the
/// warm/cold access charge.
pub(crate) fn charge_account_access(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let addr = word_to_address(i.stack.peek(0)?);
    let cost = i.host.access_address(&addr);
    i.gas.spend(cost)?;
    Ok(())
}

pub(crate) fn balance(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let addr = word_to_address(i.stack.peek(0)?);
    let balance = i.host.get_balance(&addr);
    i.stack.set_top(balance)?;
    Ok(())
}

pub(crate) fn extcodesize(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let addr = word_to_address(i.stack.peek(0)?);
    let len = i.host.get_code(&addr).len();
    i.stack.set_top(Word::from(len as u64))?;
    Ok(())
}

pub(crate) fn extcodehash(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let addr = word_to_address(i.stack.peek(0)?);
    let hash = if i.host.account_exists(&addr) {
        let code = i.host.get_code(&addr);
        Word::from_be_bytes::<32>(Keccak256::digest(&code).into())
    } else {
        Word::ZERO
    };
    i.stack.set_top(hash)?;
    Ok(())
}

pub(crate) fn charge_extcodecopy(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let addr = word_to_address(i.stack.peek(0)?);
    let cost = i.host.access_address(&addr);
    i.gas.spend(cost)?;
    let len = operand_usize(i.stack.peek(3)?)?;
    i.gas.spend(copy_gas(len))?;
    if len > 0 {
        let dst = operand_usize(i.stack.peek(1)?)?;
        i.memory.ensure(dst, len, &mut i.gas)?;
    }
    Ok(())
}

pub(crate) fn extcodecopy(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let addr = word_to_address(&i.stack.pop()?);
    let dst = i.stack.pop()?;
    let src = i.stack.pop()?;
    let len = operand_usize(&i.stack.pop()?)?;
    if len > 0 {
        let dst = operand_usize(&dst)?;
        let src = usize::try_from(src).unwrap_or(usize::MAX);
        let code = i.host.get_code(&addr);
        i.memory.write_padded(dst, len, &code, src);
    }
    Ok(())
}

// ===================================================================
// Storage
// ===================================================================

pub(crate) fn charge_sload(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let key = *i.stack.peek(0)?;
    let addr = i.host.get_self_address();
    let cost = i.host.access_storage_slot(&addr, &key);
    i.gas.spend(cost)?;
    Ok(())
}

pub(crate) fn sload(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let key = *i.stack.peek(0)?;
    let addr = i.host.get_self_address();
    let value = i.host.get_storage(&addr, &key);
    i.stack.set_top(value)?;
    Ok(())
}

/// The tri-state charge and refund schedule of EIP-2200 as amended by
/// EIP-2929 and EIP-3529, driven by the slot's original, current and
/// new values.
pub(crate) fn charge_sstore(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    if i.host.get_is_static() {
        return Err(Halt::Error(EvmError::WriteInStatic));
    }
    // The sentry leaves the stipend of a value call untouchable.
    if i.gas.left() <= costs::SSTORE_SENTRY as u64 {
        return Err(Halt::Error(EvmError::OutOfGas));
    }
    let key = *i.stack.peek(0)?;
    let new = *i.stack.peek(1)?;
    let addr = i.host.get_self_address();
    let access = i.host.access_storage_slot(&addr, &key);
    if access == costs::COLD_SLOAD as u64 {
        i.gas.spend(access)?;
    }
    let current = i.host.get_storage(&addr, &key);
    let original = i.host.get_original_storage(&addr, &key);
    //
    if new == current {
        i.gas.spend(costs::WARM_ACCESS as u64)?;
        return Ok(());
    }
    if current == original {
        if original.is_zero() {
            i.gas.spend(costs::SSTORE_SET as u64)?;
        } else {
            i.gas.spend(costs::SSTORE_RESET as u64)?;
            if new.is_zero() {
                i.host.add_gas_refund(costs::SSTORE_CLEARS_REFUND as i64);
            }
        }
        return Ok(());
    }
    // The slot was already dirtied earlier in the transaction.
    i.gas.spend(costs::WARM_ACCESS as u64)?;
    if !original.is_zero() {
        if current.is_zero() {
            i.host.add_gas_refund(-(costs::SSTORE_CLEARS_REFUND as i64));
        } else if new.is_zero() {
            i.host.add_gas_refund(costs::SSTORE_CLEARS_REFUND as i64);
        }
    }
    if new == original {
        let restore = if original.is_zero() {
            (costs::SSTORE_SET - costs::WARM_ACCESS) as i64
        } else {
            (costs::SSTORE_RESET - costs::WARM_ACCESS) as i64
        };
        i.host.add_gas_refund(restore);
    }
    Ok(())
}

pub(crate) fn sstore(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let key = i.stack.pop()?;
    let value = i.stack.pop()?;
    let addr = i.host.get_self_address();
    i.host.set_storage(&addr, &key, value);
    Ok(())
}

// ===================================================================
// Transient Storage (EIP-1153)
// ===================================================================

pub(crate) fn tload(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let key = *i.stack.peek(0)?;
    let addr = i.host.get_self_address();
    let value = i.host.get_transient_storage(&addr, &key);
    i.stack.set_top(value)?;
    Ok(())
}

pub(crate) fn tstore(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    if i.host.get_is_static() {
        return Err(Halt::Error(EvmError::WriteInStatic));
    }
    let key = i.stack.pop()?;
    let value = i.stack.pop()?;
    let addr = i.host.get_self_address();
    i.host.set_transient_storage(&addr, &key, value);
    Ok(())
}

// ===================================================================
// Logging
// ===================================================================

pub(crate) fn charge_log(i: &mut Interpreter<'_>, op: u8) -> Result<(), Halt> {
    if i.host.get_is_static() {
        return Err(Halt::Error(EvmError::WriteInStatic));
    }
    let topics = (op - LOG0) as usize;
    let len = operand_usize(i.stack.peek(1)?)?;
    i.gas.spend(log_gas(topics, len))?;
    if len > 0 {
        let offset = operand_usize(i.stack.peek(0)?)?;
        i.memory.ensure(offset, len, &mut i.gas)?;
    }
    Ok(())
}

pub(crate) fn log(i: &mut Interpreter<'_>, op: u8) -> Result<(), Halt> {
    let offset = i.stack.pop()?;
    let len = operand_usize(&i.stack.pop()?)?;
    let mut topics = Vec::with_capacity((op - LOG0) as usize);
    for _ in 0..op - LOG0 {
        topics.push(i.stack.pop()?);
    }
    let data = if len == 0 {
        Vec::new()
    } else {
        i.memory.slice(operand_usize(&offset)?, len).to_vec()
    };
    let addr = i.host.get_self_address();
    i.host.emit_log(&addr, &topics, &data);
    Ok(())
}

// ===================================================================
// Self Destruction (EIP-6780)
// ===================================================================

pub(crate) fn charge_selfdestruct(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    if i.host.get_is_static() {
        return Err(Halt::Error(EvmError::WriteInStatic));
    }
    let recipient = word_to_address(i.stack.peek(0)?);
    let access = i.host.access_address(&recipient);
    if access == costs::COLD_ACCOUNT_ACCESS as u64 {
        i.gas.spend(access)?;
    }
    let addr = i.host.get_self_address();
    if !i.host.get_balance(&addr).is_zero() && !i.host.account_exists(&recipient) {
        i.gas.spend(costs::NEW_ACCOUNT as u64)?;
    }
    Ok(())
}

pub(crate) fn selfdestruct(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let recipient = word_to_address(&i.stack.pop()?);
    let addr = i.host.get_self_address();
    i.host.mark_for_destruction(&addr, &recipient);
    Err(Halt::SelfDestruct)
}
