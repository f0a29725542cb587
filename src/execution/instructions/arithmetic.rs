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
use crate::execution::gas::exp_gas;
use crate::execution::i256::{signed_div, signed_rem};
use crate::execution::{Halt, Interpreter, Word};

pub(crate) fn add(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(a.wrapping_add(b))?;
    Ok(())
}

pub(crate) fn mul(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(a.wrapping_mul(b))?;
    Ok(())
}

pub(crate) fn sub(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(a.wrapping_sub(b))?;
    Ok(())
}

pub(crate) fn div(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    let q = if b.is_zero() { Word::ZERO } else { a / b };
    i.stack.set_top(q)?;
    Ok(())
}

pub(crate) fn sdiv(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(signed_div(a, b))?;
    Ok(())
}

pub(crate) fn rem(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    let r = if b.is_zero() { Word::ZERO } else { a % b };
    i.stack.set_top(r)?;
    Ok(())
}

pub(crate) fn smod(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = *i.stack.peek(0)?;
    i.stack.set_top(signed_rem(a, b))?;
    Ok(())
}

pub(crate) fn addmod(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = i.stack.pop()?;
    let m = *i.stack.peek(0)?;
    i.stack.set_top(a.add_mod(b, m))?;
    Ok(())
}

pub(crate) fn mulmod(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let a = i.stack.pop()?;
    let b = i.stack.pop()?;
    let m = *i.stack.peek(0)?;
    i.stack.set_top(a.mul_mod(b, m))?;
    Ok(())
}

/// The exponent's width charge; the base `EXP` cost sits in the
/// block.
pub(crate) fn charge_exp(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let power = *i.stack.peek(1)?;
    i.gas.spend(exp_gas(&power))?;
    Ok(())
}

pub(crate) fn exp(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let base = i.stack.pop()?;
    let power = *i.stack.peek(0)?;
    i.stack.set_top(base.pow(power))?;
    Ok(())
}

pub(crate) fn signextend(i: &mut Interpreter<'_>, _op: u8) -> Result<(), Halt> {
    let index = i.stack.pop()?;
    let value = *i.stack.peek(0)?;
    let extended = if index < Word::from(32u64) {
        let bit = usize::try_from(index).unwrap() * 8 + 7;
        let mask = (Word::from(1u64) << bit) - Word::from(1u64);
        if value.bit(bit) {
            value | !mask
        } else {
            value & mask
        }
    } else {
        value
    };
    i.stack.set_top(extended)?;
    Ok(())
}
