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
use crate::bytecode::opcode::{DUP1, SWAP1};
use crate::execution::{Halt, Interpreter};

pub(crate) fn pop(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    i.stack.pop()?;
    Ok(())
}

pub(crate) fn dup(i: &mut Interpreter<'_>, op: u8) -> Result<(), Halt> {
    i.stack.dup((op - DUP1 + 1) as usize)?;
    Ok(())
}

pub(crate) fn swap(i: &mut Interpreter<'_>, op: u8) -> Result<(), Halt> {
    i.stack.swap((op - SWAP1 + 1) as usize)?;
    Ok(())
}
