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

//! Two's-complement views of the unsigned machine word, for the
//! signed comparison, division, remainder and shift instructions.

use std::cmp::Ordering;

use super::Word;

/// Check the sign bit of a word viewed as two's complement.
pub(crate) fn is_negative(value: &Word) -> bool {
    value.bit(255)
}

/// Magnitude of a word viewed as two's complement.
fn magnitude(value: Word) -> Word {
    if is_negative(&value) {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Signed comparison.
pub(crate) fn signed_cmp(lhs: &Word, rhs: &Word) -> Ordering {
    match (is_negative(lhs), is_negative(rhs)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        // Two's complement of equal sign orders like the unsigned
        // bit patterns.
        _ => lhs.cmp(rhs),
    }
}

/// Signed division, rounding towards zero.  Division by zero yields
/// zero, and the lone overflow case `MIN / -1` wraps back to `MIN`.
pub(crate) fn signed_div(lhs: Word, rhs: Word) -> Word {
    if rhs.is_zero() {
        return Word::ZERO;
    }
    let negative = is_negative(&lhs) != is_negative(&rhs);
    let quotient = magnitude(lhs) / magnitude(rhs);
    if negative {
        quotient.wrapping_neg()
    } else {
        quotient
    }
}

/// Signed remainder, taking the sign of the dividend.
pub(crate) fn signed_rem(lhs: Word, rhs: Word) -> Word {
    if rhs.is_zero() {
        return Word::ZERO;
    }
    let negative = is_negative(&lhs);
    let remainder = magnitude(lhs) % magnitude(rhs);
    if negative {
        remainder.wrapping_neg()
    } else {
        remainder
    }
}

/// Arithmetic right shift: the sign bit fills the vacated positions.
pub(crate) fn arithmetic_shr(value: Word, shift: usize) -> Word {
    let negative = is_negative(&value);
    if shift >= 256 {
        return if negative { Word::MAX } else { Word::ZERO };
    }
    let shifted = value >> shift;
    if negative && shift > 0 {
        shifted | (Word::MAX << (256 - shift))
    } else {
        shifted
    }
}
