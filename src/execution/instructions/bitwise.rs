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
use std::cmp::Ordering;

use super::word_bool;
use crate::execution::i256::{arithmetic_shr, signed_cmp};
use crate::execution::{Halt, Interpreter, Word};

pub(crate) fn lt(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(word_bool(a < b))?;
    Ok(())
}

pub(crate) fn gt(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(word_bool(a > b))?;
    Ok(())
}

pub(crate) fn slt(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(word_bool(signed_cmp(&a, &b) == Ordering::Less))?;
    Ok(())
}

pub(crate) fn sgt(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(word_bool(signed_cmp(&a, &b) == Ordering::Greater))?;
    Ok(())
}

pub(crate) fn eq(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(word_bool(a == b))?;
    Ok(())
}

pub(crate) fn iszero(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = *i.stack.peek(0)?;
    i.stack.set_top(word_bool(a.is_zero()))?;
    Ok(())
}

pub(crate) fn and(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(a & b)?;
    Ok(())
}

pub(crate) fn or(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(a | b)?;
    Ok(())
}

pub(crate) fn xor(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(a ^ b)?;
    Ok(())
}

pub(crate) fn not(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = *i.stack.peek(0)?;
    i.stack.set_top(!a)?;
    Ok(())
}

/// `BYTE`: select the `n`th byte of a word, counting from the most
/// significant end.
pub(crate) fn byte(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let index = i.stack.pop()?;
    let value = *i.stack.peek(0)?;
    let selected = if index < Word::from(32u64) {
        let bytes: [u8; 32] = value.to_be_bytes();
        Word::from(bytes[usize::try_from(index).unwrap()])
    } else {
        Word::ZERO
    };
    i.stack.set_top(selected)?;
    Ok(())
}

pub(crate) fn shl(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let shift = i.stack.pop()?;
    let value = *i.stack.peek(0)?;
    let shifted = match usize::try_from(shift) {
        Ok(s) if s < 256 => value << s,
        _ => Word::ZERO,
    };
    i.stack.set_top(shifted)?;
    Ok(())
}

pub(crate) fn shr(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let shift = i.stack.pop()?;
    let value = *i.stack.peek(0)?;
    let shifted = match usize::try_from(shift) {
        Ok(s) if s < 256 => value >> s,
        _ => Word::ZERO,
    };
    i.stack.set_top(shifted)?;
    Ok(())
}

pub(crate) fn sar(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let shift = i.stack.pop()?;
    let value = *i.stack.peek(0)?;
    let s = usize::try_from(shift).unwrap_or(256);
    i.stack.set_top(arithmetic_shr(value, s.min(256)))?;
    Ok(())
}
