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
use crate::execution::{EvmError, Halt, Interpreter, Word};

pub(crate) fn stop(_i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    Err(Halt::Stop)
}

/// `JUMPDEST` is a pure marker; its gas is part of the block.
pub(crate) fn jumpdest(_i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    Ok(())
}

/// The designated invalid instruction, and any handler slot which
/// should be unreachable after validation.
pub(crate) fn invalid(_i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    Err(Halt::Error(EvmError::InvalidOpcode))
}

/// Charge slot for records without a runtime gas component.
pub(crate) fn charge_nothing(_i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    Ok(())
}

pub(crate) fn ret(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let offset = i.stack.pop()?;
    let len = i.stack.pop()?;
    i.output = read_output(i, &offset, &len)?;
    Err(Halt::Return)
}

pub(crate) fn revert(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let offset = i.stack.pop()?;
    let len = i.stack.pop()?;
    i.output = read_output(i, &offset, &len)?;
    Err(Halt::Revert)
}

fn read_output(i: &mut Interpreter<'_>, offset: &Word, len: &Word) -> Result<Vec<u8>, Halt> {
    let len = operand_usize(len)?;
    if len == 0 {
        return Ok(Vec::new());
    }
    let offset = operand_usize(offset)?;
    i.memory.ensure(offset, len, &mut i.gas)?;
    Ok(i.memory.slice(offset, len).to_vec())
}
