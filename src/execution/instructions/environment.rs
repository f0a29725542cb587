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
use super::operand_usize;
use crate::execution::gas::copy_gas;
use crate::execution::{address_to_word, EvmError, Halt, Interpreter, Word};
use crate::util::word_from_be;

pub(crate) fn address(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let addr = i.host.get_self_address();
    i.stack.push(address_to_word(&addr))?;
    Ok(())
}

pub(crate) fn origin(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let addr = i.host.get_tx_origin();
    i.stack.push(address_to_word(&addr))?;
    Ok(())
}

pub(crate) fn caller(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let addr = i.host.get_caller();
    i.stack.push(address_to_word(&addr))?;
    Ok(())
}

pub(crate) fn callvalue(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let value = i.host.get_call_value();
    i.stack.push(value)?;
    Ok(())
}

/// Read 32 bytes of calldata, zero-extended past the end.
pub(crate) fn calldataload(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let offset = *i.stack.peek(0)?;
    let input = i.host.get_input();
    let word = match usize::try_from(offset) {
        Ok(o) if o < input.len() => {
            let mut buffer = [0u8; 32];
            let n = 32.min(input.len() - o);
            buffer[..n].copy_from_slice(&input[o..o + n]);
            word_from_be(&buffer)
        }
        _ => Word::ZERO,
    };
    i.stack.set_top(word)?;
    Ok(())
}

pub(crate) fn calldatasize(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let len = i.host.get_input().len();
    i.stack.push(Word::from(len as u64))?;
    Ok(())
}

pub(crate) fn calldatacopy(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let (dst, src, len) = copy_operands(i)?;
    if len > 0 {
        i.memory.write_padded(dst, len, i.host.get_input(), src);
    }
    Ok(())
}

pub(crate) fn codesize(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let len = i.analysis.full_code().len();
    i.stack.push(Word::from(len as u64))?;
    Ok(())
}

pub(crate) fn codecopy(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let (dst, src, len) = copy_operands(i)?;
    if len > 0 {
        i.memory.write_padded(dst, len, i.analysis.full_code(), src);
    }
    Ok(())
}

pub(crate) fn gasprice(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let price = i.host.get_gas_price();
    i.stack.push(price)?;
    Ok(())
}

pub(crate) fn returndatasize(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    i.stack.push(Word::from(i.returndata.len() as u64))?;
    Ok(())
}

/// Unlike the other copies, reads past the end of the return buffer
/// are a hard failure rather than zero fill.
pub(crate) fn returndatacopy(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let (dst, src, len) = copy_operands(i)?;
    let end = src.checked_add(len).ok_or(EvmError::OutOfBounds)?;
    if end > i.returndata.len() {
        return Err(Halt::Error(EvmError::OutOfBounds));
    }
    if len > 0 {
        i.memory.write(dst, &i.returndata[src..end]);
    }
    Ok(())
}

pub(crate) fn blockhash(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let number = *i.stack.peek(0)?;
    let hash = match u64::try_from(number) {
        Ok(n) => i.host.get_block_hash(n),
        Err(_) => Word::ZERO,
    };
    i.stack.set_top(hash)?;
    Ok(())
}

pub(crate) fn coinbase(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let block = i.host.get_block_info();
    i.stack.push(address_to_word(&block.coinbase))?;
    Ok(())
}

pub(crate) fn timestamp(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let block = i.host.get_block_info();
    i.stack.push(Word::from(block.timestamp))?;
    Ok(())
}

pub(crate) fn number(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let block = i.host.get_block_info();
    i.stack.push(Word::from(block.number))?;
    Ok(())
}

pub(crate) fn prevrandao(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let block = i.host.get_block_info();
    i.stack.push(block.prevrandao)?;
    Ok(())
}

pub(crate) fn gaslimit(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let block = i.host.get_block_info();
    i.stack.push(Word::from(block.gas_limit))?;
    Ok(())
}

pub(crate) fn chainid(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let id = i.host.get_chain_id();
    i.stack.push(Word::from(id))?;
    Ok(())
}

pub(crate) fn selfbalance(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let addr = i.host.get_self_address();
    let balance = i.host.get_balance(&addr);
    i.stack.push(balance)?;
    Ok(())
}

pub(crate) fn basefee(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let block = i.host.get_block_info();
    i.stack.push(block.base_fee)?;
    Ok(())
}

pub(crate) fn blobhash(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let index = *i.stack.peek(0)?;
    let hash = match usize::try_from(index) {
        Ok(n) => i.host.get_blob_hash(n),
        Err(_) => Word::ZERO,
    };
    i.stack.set_top(hash)?;
    Ok(())
}

pub(crate) fn blobbasefee(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let fee = i.host.get_blob_base_fee();
    i.stack.push(fee)?;
    Ok(())
}

/// `PC` records are materialised by the stream builder, so this slot
/// is only reachable through the generic table.
pub(crate) fn pc(_i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    Err(Halt::Error(EvmError::InvalidOpcode))
}

/// `GAS` runs isolated in its own block, so the remaining gas is
/// exact once the block's lump deduction has settled.
pub(crate) fn gas(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let left = i.gas.left();
    i.stack.push(Word::from(left))?;
    Ok(())
}

/// Shared operand decode for the copying instructions: destination,
/// source, length; charges the per-word copy cost and any expansion.
fn copy_operands(i: &mut Interpreter<'_>) -> Result<(usize, usize, usize), Halt> {
    let dst = i.stack.pop()?;
    let src = i.stack.pop()?;
    let len = operand_usize(&i.stack.pop()?)?;
    i.gas.spend(copy_gas(len))?;
    if len == 0 {
        return Ok((0, 0, 0));
    }
    let dst = operand_usize(&dst)?;
    let src = usize::try_from(src).unwrap_or(usize::MAX);
    i.memory.ensure(dst, len, &mut i.gas)?;
    Ok((dst, src, len))
}
