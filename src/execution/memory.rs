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
use super::gas::Gas;
use super::{EvmError, Word, MEMORY_LIMIT};
use crate::util::word_from_be;

/// Byte-addressable frame memory.  The buffer only ever grows, in
/// 32-byte words, and expansion is charged through the gas counter at
/// the moment an access first requires it.
#[derive(Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    pub fn new() -> Self {
        Memory::default()
    }

    /// Current size in bytes (always a multiple of 32).
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Make `[offset, offset + len)` addressable, charging for any
    /// expansion.  A zero-length access never grows memory.
    pub fn ensure(&mut self, offset: usize, len: usize, gas: &mut Gas) -> Result<(), EvmError> {
        if len == 0 {
            return Ok(());
        }
        let end = offset.checked_add(len).ok_or(EvmError::OutOfBounds)?;
        if end > MEMORY_LIMIT {
            return Err(EvmError::OutOfGas);
        }
        let new_size = end.div_ceil(32) * 32;
        if new_size > self.data.len() {
            gas.charge_memory(new_size)?;
            self.data.resize(new_size, 0);
        }
        Ok(())
    }

    /// Read the word at a given offset.  The caller must have ensured
    /// the range first.
    pub fn load_word(&self, offset: usize) -> Word {
        word_from_be(&self.data[offset..offset + 32])
    }

    pub fn store_word(&mut self, offset: usize, word: Word) {
        let bytes: [u8; 32] = word.to_be_bytes();
        self.data[offset..offset + 32].copy_from_slice(&bytes);
    }

    pub fn store_byte(&mut self, offset: usize, byte: u8) {
        self.data[offset] = byte;
    }

    pub fn slice(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    pub fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Copy `src` into `dst`, zero-filling whatever the source cannot
    /// cover.  This is the shared shape of the `*COPY` instructions,
    /// whose sources are implicitly zero-extended.
    pub fn write_padded(&mut self, offset: usize, len: usize, src: &[u8], src_offset: usize) {
        for i in 0..len {
            let byte = src_offset
                .checked_add(i)
                .and_then(|p| src.get(p))
                .copied()
                .unwrap_or(0);
            self.data[offset + i] = byte;
        }
    }

    /// Overlapping in-memory copy (`MCOPY`).
    pub fn copy_within(&mut self, src: usize, dst: usize, len: usize) {
        self.data.copy_within(src..src + len, dst);
    }
}
