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
use crate::execution::gas::{copy_gas, keccak_gas};
use crate::execution::{Halt, Interpreter, Word};

pub(crate) fn mload(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let offset = operand_usize(i.stack.peek(0)?)?;
    i.memory.ensure(offset, 32, &mut i.gas)?;
    i.stack.set_top(i.memory.load_word(offset))?;
    Ok(())
}

pub(crate) fn mstore(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let offset = operand_usize(&i.stack.pop()?)?;
    let value = i.stack.pop()?;
    i.memory.ensure(offset, 32, &mut i.gas)?;
    i.memory.store_word(offset, value);
    Ok(())
}

pub(crate) fn mstore8(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let offset = operand_usize(&i.stack.pop()?)?;
    let value = i.stack.pop()?;
    i.memory.ensure(offset, 1, &mut i.gas)?;
    i.memory.store_byte(offset, value.byte(0));
    Ok(())
}

pub(crate) fn msize(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    i.stack.push(Word::from(i.memory.size() as u64))?;
    Ok(())
}

/// `MCOPY` charges its copy cost inline, like the other copying
/// instructions.
pub(crate) fn mcopy(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let dst = i.stack.pop()?;
    let src = i.stack.pop()?;
    let len = operand_usize(&i.stack.pop()?)?;
    i.gas.spend(copy_gas(len))?;
    if len > 0 {
        let dst = operand_usize(&dst)?;
        let src = operand_usize(&src)?;
        i.memory.ensure(dst.max(src), len, &mut i.gas)?;
        i.memory.copy_within(src, dst, len);
    }
    Ok(())
}

pub(crate) fn charge_keccak256(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let len = operand_usize(i.stack.peek(1)?)?;
    i.gas.spend(keccak_gas(len))?;
    if len > 0 {
        let offset = operand_usize(i.stack.peek(0)?)?;
        i.memory.ensure(offset, len, &mut i.gas)?;
    }
    Ok(())
}

pub(crate) fn keccak256(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let offset = i.stack.pop()?;
    let len = operand_usize(i.stack.peek(0)?)?;
    let hash = if len == 0 {
        Keccak256::digest([0u8; 0])
    } else {
        Keccak256::digest(i.memory.slice(operand_usize(&offset)?, len))
    };
    i.stack.set_top(Word::from_be_bytes::<32>(hash.into()))?;
    Ok(())
}
