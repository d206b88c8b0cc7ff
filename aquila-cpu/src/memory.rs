// SPDX-FileCopyrightText: 2026 aquila contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Flat little-endian guest memory with a named region map.

use aquila_common::{is_word_aligned, VAddr};
use log::debug;

use crate::error::EmuError;

/// One entry of the region map.
#[derive(Debug, Clone)]
pub struct MemoryRegion {
    pub start: VAddr,
    pub size: u64,
    pub read_only: bool,
    pub name: String,
}

impl MemoryRegion {
    #[inline]
    fn contains(&self, addr: VAddr) -> bool {
        addr >= self.start && addr < self.start.wrapping_add(self.size)
    }
}

/// Byte-addressed guest memory. All multi-byte accesses are little-endian;
/// there is no endianness configuration.
pub struct Memory {
    data: Vec<u8>,
    /// Region map, newest first. The final entry is the whole-array
    /// writable RAM fallback, so first-match lookup always succeeds.
    regions: Vec<MemoryRegion>,
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size],
            regions: vec![MemoryRegion {
                start: 0,
                size: size as u64,
                read_only: false,
                name: "ram".into(),
            }],
        }
    }

    /// Total memory size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Register a region. Newer regions take precedence over older ones
    /// (and over the RAM fallback) in first-match lookups.
    pub fn add_region(&mut self, start: VAddr, size: u64, read_only: bool, name: &str) {
        debug!(
            "memory: region {:<12} @ 0x{:08X}..0x{:08X}{}",
            name,
            start,
            start + size,
            if read_only { " (read-only)" } else { "" }
        );
        self.regions.insert(
            0,
            MemoryRegion {
                start,
                size,
                read_only,
                name: name.into(),
            },
        );
    }

    /// First region containing `addr`.
    pub fn find_region(&self, addr: VAddr) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.contains(addr))
    }

    #[inline]
    pub fn is_valid_address(&self, addr: VAddr) -> bool {
        addr < self.data.len() as u64
    }

    /// Whether the first region matching `addr` is read-only.
    pub fn is_read_only_region(&self, addr: VAddr) -> bool {
        self.find_region(addr).is_some_and(|r| r.read_only)
    }

    /// Bounds-check an access of `size` bytes, returning the start index.
    #[inline]
    fn check(&self, addr: VAddr, size: usize) -> Result<usize, EmuError> {
        let start = addr as usize;
        let end = start
            .checked_add(size)
            .ok_or(EmuError::MemoryOutOfBounds { address: addr })?;
        if end > self.data.len() {
            return Err(EmuError::MemoryOutOfBounds { address: addr });
        }
        Ok(start)
    }

    /// Read `size` bytes (1, 2, 4 or 8) little-endian.
    pub fn read(&self, addr: VAddr, size: u32) -> Result<u64, EmuError> {
        let idx = self.check(addr, size as usize)?;
        let val = match size {
            1 => self.data[idx] as u64,
            2 => u16::from_le_bytes(self.data[idx..idx + 2].try_into().unwrap()) as u64,
            4 => u32::from_le_bytes(self.data[idx..idx + 4].try_into().unwrap()) as u64,
            8 => u64::from_le_bytes(self.data[idx..idx + 8].try_into().unwrap()),
            _ => return Err(EmuError::MemoryOutOfBounds { address: addr }),
        };
        Ok(val)
    }

    /// Write the low `size` bytes (1, 2, 4 or 8) of `value` little-endian.
    /// Fails with [`EmuError::MemoryProtectionViolation`] when the first
    /// matching region is read-only.
    pub fn write(&mut self, addr: VAddr, value: u64, size: u32) -> Result<(), EmuError> {
        if self.is_read_only_region(addr) {
            return Err(EmuError::MemoryProtectionViolation { address: addr });
        }
        let idx = self.check(addr, size as usize)?;
        match size {
            1 => self.data[idx] = value as u8,
            2 => self.data[idx..idx + 2].copy_from_slice(&(value as u16).to_le_bytes()),
            4 => self.data[idx..idx + 4].copy_from_slice(&(value as u32).to_le_bytes()),
            8 => self.data[idx..idx + 8].copy_from_slice(&value.to_le_bytes()),
            _ => return Err(EmuError::MemoryOutOfBounds { address: addr }),
        }
        Ok(())
    }

    /// Fetch one instruction word. Requires 4-byte alignment and the
    /// whole word in bounds.
    pub fn read_instruction(&self, addr: VAddr) -> Result<u32, EmuError> {
        if !is_word_aligned(addr) {
            return Err(EmuError::MemoryOutOfBounds { address: addr });
        }
        let idx = self.check(addr, 4)?;
        Ok(u32::from_le_bytes(
            self.data[idx..idx + 4].try_into().unwrap(),
        ))
    }

    /// Write a block of instruction words little-endian (program loading;
    /// bypasses the region map, bounds still apply).
    pub fn write_block(&mut self, addr: VAddr, words: &[u32]) -> Result<(), EmuError> {
        let idx = self.check(addr, words.len() * 4)?;
        for (i, word) in words.iter().enumerate() {
            let off = idx + i * 4;
            self.data[off..off + 4].copy_from_slice(&word.to_le_bytes());
        }
        Ok(())
    }
}
