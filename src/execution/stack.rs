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
use super::{EvmError, Word, STACK_LIMIT};

/// The operand stack: a fixed-capacity array of machine words.  Block
/// entry validation guarantees the per-instruction operations below
/// cannot fail mid-block, but every entry point still reports
/// underflow and overflow explicitly rather than trusting that
/// guarantee.
pub struct Stack {
    items: Vec<Word>,
}

impl Default for Stack {
    fn default() -> Self {
        Stack::new()
    }
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            items: Vec::with_capacity(STACK_LIMIT),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, word: Word) -> Result<(), EvmError> {
        if self.items.len() == STACK_LIMIT {
            return Err(EvmError::StackOverflow);
        }
        self.items.push(word);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Word, EvmError> {
        self.items.pop().ok_or(EvmError::StackUnderflow)
    }

    /// Read the `n`th item from the top without removing it, where
    /// `n == 0` is the top element.
    pub fn peek(&self, n: usize) -> Result<&Word, EvmError> {
        let len = self.items.len();
        if n >= len {
            return Err(EvmError::StackUnderflow);
        }
        Ok(&self.items[len - 1 - n])
    }

    /// Replace the top of the stack in place.
    pub fn set_top(&mut self, word: Word) -> Result<(), EvmError> {
        match self.items.last_mut() {
            Some(top) => {
                *top = word;
                Ok(())
            }
            None => Err(EvmError::StackUnderflow),
        }
    }

    /// Duplicate the `n`th item onto the top of the stack, where
    /// `n == 1` duplicates the top element.
    pub fn dup(&mut self, n: usize) -> Result<(), EvmError> {
        let word = *self.peek(n - 1)?;
        self.push(word)
    }

    /// Swap the top of the stack with the item `n` below it.
    pub fn swap(&mut self, n: usize) -> Result<(), EvmError> {
        let len = self.items.len();
        if n >= len {
            return Err(EvmError::StackUnderflow);
        }
        self.items.swap(len - 1, len - 1 - n);
        Ok(())
    }
}
