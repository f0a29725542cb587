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
use super::{operand_usize, word_bool};
use crate::bytecode::opcode::{CALLCODE, CREATE2, DELEGATECALL, STATICCALL};
use crate::bytecode::{initcode_gas, MAX_INITCODE_SIZE};
use crate::execution::gas::{costs, keccak_gas};
use crate::execution::{
    address_to_word, word_to_address, CallKind, CallRequest, CallScheme, CreateScheme, EvmError,
    Halt, Interpreter, Word, CALL_DEPTH_LIMIT,
};

fn scheme_of(op: u8) -> CallScheme {
    match op {
        CALLCODE => CallScheme::CallCode,
        DELEGATECALL => CallScheme::DelegateCall,
        STATICCALL => CallScheme::StaticCall,
        _ => CallScheme::Call,
    }
}

/// Whether the scheme pops a value operand.
fn carries_value(scheme: CallScheme) -> bool {
    matches!(scheme, CallScheme::Call | CallScheme::CallCode)
}

// ===================================================================
// Message Calls
// ===================================================================

/// Charge the runtime components of a call before running it: the
/// warm/cold account access, the value-transfer surcharge, the
/// new-account surcharge, and expansion for both argument and return
/// regions.
pub(crate) fn charge_call(i: &mut Interpreter<'_>, op: u8) -> Result<(), Halt> {
    let scheme = scheme_of(op);
    let target = word_to_address(i.stack.peek(1)?);
    let value_offset = if carries_value(scheme) { 1 } else { 0 };
    let value_nonzero = value_offset == 1 && !i.stack.peek(2)?.is_zero();
    if value_nonzero && scheme == CallScheme::Call && i.host.get_is_static() {
        return Err(Halt::Error(EvmError::WriteInStatic));
    }
    let access = i.host.access_address(&target);
    i.gas.spend(access)?;
    if value_nonzero {
        i.gas.spend(costs::CALL_VALUE as u64)?;
        if scheme == CallScheme::Call && !i.host.account_exists(&target) {
            i.gas.spend(costs::NEW_ACCOUNT as u64)?;
        }
    }
    // Argument and return regions.
    let in_len = operand_usize(i.stack.peek(3 + value_offset)?)?;
    if in_len > 0 {
        let in_offset = operand_usize(i.stack.peek(2 + value_offset)?)?;
        i.memory.ensure(in_offset, in_len, &mut i.gas)?;
    }
    let out_len = operand_usize(i.stack.peek(5 + value_offset)?)?;
    if out_len > 0 {
        let out_offset = operand_usize(i.stack.peek(4 + value_offset)?)?;
        i.memory.ensure(out_offset, out_len, &mut i.gas)?;
    }
    Ok(())
}

pub(crate) fn call(i: &mut Interpreter<'_>, op: u8) -> Result<(), Halt> {
    let scheme = scheme_of(op);
    let gas_requested = i.stack.pop()?;
    let target = word_to_address(&i.stack.pop()?);
    let value = if carries_value(scheme) {
        i.stack.pop()?
    } else {
        Word::ZERO
    };
    let in_offset = i.stack.pop()?;
    let in_len = operand_usize(&i.stack.pop()?)?;
    let out_offset = i.stack.pop()?;
    let out_len = operand_usize(&i.stack.pop()?)?;
    let input = if in_len == 0 {
        Vec::new()
    } else {
        i.memory.slice(operand_usize(&in_offset)?, in_len).to_vec()
    };
    //
    let self_addr = i.host.get_self_address();
    // A failed precondition is not an error: the caller simply sees
    // a zero pushed, with nothing forwarded.
    let needs_balance = carries_value(scheme) && !value.is_zero();
    if i.host.get_depth() >= CALL_DEPTH_LIMIT
        || (needs_balance && i.host.get_balance(&self_addr) < value)
    {
        i.returndata.clear();
        i.stack.push(word_bool(false))?;
        return Ok(());
    }
    // All but one sixty-fourth may be forwarded; the stipend rides
    // on top for value-bearing calls.
    let requested = u64::try_from(gas_requested).unwrap_or(u64::MAX);
    let forwarded = requested.min(i.gas.forwardable());
    i.gas.spend(forwarded)?;
    let stipend = if !value.is_zero() {
        costs::CALL_STIPEND as u64
    } else {
        0
    };
    // Resolve the scheme's context rules.
    let (context, code_address, caller, apparent_value) = match scheme {
        CallScheme::Call | CallScheme::StaticCall => (target, target, self_addr, value),
        CallScheme::CallCode => (self_addr, target, self_addr, value),
        CallScheme::DelegateCall => (
            self_addr,
            target,
            i.host.get_caller(),
            i.host.get_call_value(),
        ),
    };
    let request = CallRequest {
        kind: CallKind::Call(scheme),
        gas: forwarded + stipend,
        caller,
        target: context,
        code_address,
        value: apparent_value,
        input,
        is_static: i.host.get_is_static() || scheme == CallScheme::StaticCall,
    };
    let result = i.host.inner_call(request);
    i.gas.reclaim(result.gas_left);
    // Propagate output into the caller's return region and buffer.
    let n = out_len.min(result.output.len());
    if n > 0 {
        i.memory
            .write(operand_usize(&out_offset)?, &result.output[..n]);
    }
    i.returndata = result.output;
    i.stack.push(word_bool(result.success))?;
    Ok(())
}

// ===================================================================
// Contract Creation
// ===================================================================

/// Charge the initcode word cost (EIP-3860), the hashing cost for
/// `CREATE2`, and expansion for the initcode region.
pub(crate) fn charge_create(i: &mut Interpreter<'_>, op: u8) -> Result<(), Halt> {
    if i.host.get_is_static() {
        return Err(Halt::Error(EvmError::WriteInStatic));
    }
    let len = operand_usize(i.stack.peek(2)?)?;
    if len > MAX_INITCODE_SIZE {
        return Err(Halt::Error(EvmError::OutOfGas));
    }
    i.gas.spend(initcode_gas(len))?;
    if op == CREATE2 {
        i.gas.spend(keccak_gas(len))?;
    }
    if len > 0 {
        let offset = operand_usize(i.stack.peek(1)?)?;
        i.memory.ensure(offset, len, &mut i.gas)?;
    }
    Ok(())
}

pub(crate) fn create(i: &mut Interpreter<'_>, op: u8) -> Result<(), Halt> {
    let value = i.stack.pop()?;
    let offset = i.stack.pop()?;
    let len = operand_usize(&i.stack.pop()?)?;
    let scheme = if op == CREATE2 {
        CreateScheme::Create2 {
            salt: i.stack.pop()?,
        }
    } else {
        CreateScheme::Create
    };
    let initcode = if len == 0 {
        Vec::new()
    } else {
        i.memory.slice(operand_usize(&offset)?, len).to_vec()
    };
    //
    let self_addr = i.host.get_self_address();
    i.returndata.clear();
    if i.host.get_depth() >= CALL_DEPTH_LIMIT || i.host.get_balance(&self_addr) < value {
        i.stack.push(Word::ZERO)?;
        return Ok(());
    }
    let forwarded = i.gas.forwardable();
    i.gas.spend(forwarded)?;
    let request = CallRequest {
        kind: CallKind::Create(scheme),
        gas: forwarded,
        caller: self_addr,
        target: self_addr,
        code_address: self_addr,
        value,
        input: initcode,
        is_static: i.host.get_is_static(),
    };
    let result = i.host.inner_call(request);
    i.gas.reclaim(result.gas_left);
    // Creation return data is only observable after a revert.
    if !result.success {
        i.returndata = result.output;
    }
    match result.created.filter(|_| result.success) {
        Some(addr) => i.stack.push(address_to_word(&addr))?,
        None => i.stack.push(Word::ZERO)?,
    }
    Ok(())
}
