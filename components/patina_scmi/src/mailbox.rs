//! SCMI Shared Mailbox
//!
//! The shared memory region a requester and a remote agent use to exchange one request and its response.
//!
//! ## Layout
//!
//! | Offset | Field            |
//! |--------|------------------|
//! | 0x00   | Reserved         |
//! | 0x04   | Channel status   |
//! | 0x08   | Reserved         |
//! | 0x10   | Channel flags    |
//! | 0x14   | Length           |
//! | 0x18   | Message header   |
//! | 0x1C   | Message payload  |
//!
//! All fields are 32-bit little-endian words. `Length` counts the message header and the payload in bytes.
//!
//! ## Ownership
//!
//! A [`ScmiMailbox`] is a handle to one region. It is created once per channel and lent by `&mut` to each request, so
//! a single owner can never have two requests outstanding on the same region.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::boxed::Box;

use core::fmt;
use core::mem::{offset_of, size_of};

use bitfield_struct::bitfield;
use r_efi::efi;
use zerocopy_derive::*;

use crate::config::ScmiTransportConfiguration;
use crate::error::{Result, ScmiError};
use crate::hal::VolatileMemory;

/// The fixed words at the start of the shared mailbox region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SharedMemoryHeader {
    pub reserved0: u32,
    pub channel_status: u32,
    pub reserved1: [u32; 2],
    pub flags: u32,
    pub length: u32,
    pub message_header: u32,
}

/// Offset of the channel status word.
pub const CHANNEL_STATUS_OFFSET: usize = offset_of!(SharedMemoryHeader, channel_status);
/// Offset of the channel flags word.
pub const FLAGS_OFFSET: usize = offset_of!(SharedMemoryHeader, flags);
/// Offset of the length word.
pub const LENGTH_OFFSET: usize = offset_of!(SharedMemoryHeader, length);
/// Offset of the message header word.
pub const MESSAGE_HEADER_OFFSET: usize = offset_of!(SharedMemoryHeader, message_header);
/// Offset of the first payload word.
pub const PAYLOAD_OFFSET: usize = size_of::<SharedMemoryHeader>();

const SHARED_MEMORY_HEADER_WORDS: usize = size_of::<SharedMemoryHeader>() / size_of::<u32>();

const _: () = assert!(CHANNEL_STATUS_OFFSET == 0x04);
const _: () = assert!(FLAGS_OFFSET == 0x10);
const _: () = assert!(LENGTH_OFFSET == 0x14);
const _: () = assert!(MESSAGE_HEADER_OFFSET == 0x18);
const _: () = assert!(PAYLOAD_OFFSET == 0x1C);

/// Channel Status Word
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct ChannelStatus {
    /// Set by the remote agent once the response is in place. Cleared by the requester to claim the channel.
    pub free: bool,
    /// Set by the remote agent when it detected a transport error on the channel.
    pub error: bool,
    #[bits(30)]
    __: u32,
}

impl ChannelStatus {
    /// The status the requester writes to claim the channel.
    pub const BUSY: Self = Self::new();
}

/// Channel Flags Word
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct ChannelFlags {
    /// Requests a completion interrupt instead of polled completion.
    pub interrupt_enable: bool,
    #[bits(31)]
    __: u32,
}

impl ChannelFlags {
    /// Polled completion, the only delivery mode the transport uses.
    pub const POLLED: Self = Self::new();
}

/// SCMI Shared Mailbox Handle
pub struct ScmiMailbox {
    /// Physical address of the region.
    base: efi::PhysicalAddress,
    /// Size of the region in bytes.
    size: usize,
    /// Accessor for the region.
    memory: Box<dyn VolatileMemory>,
    /// Set when a request on this region timed out and the remote agent may still own it.
    stale: bool,
}

impl ScmiMailbox {
    /// Creates a handle to the mailbox region at `base` of `size` bytes.
    ///
    /// The region must be 4-byte aligned, large enough to hold the fixed header words and the message header, and end
    /// within the physical address space.
    pub fn new(base: efi::PhysicalAddress, size: usize, memory: Box<dyn VolatileMemory>) -> Result<Self> {
        if base % size_of::<u32>() as u64 != 0 {
            log::error!(target: "scmi", "Mailbox base is not word aligned: base={:#X}", base);
            return Err(ScmiError::InvalidParameter);
        }
        if size < PAYLOAD_OFFSET {
            log::error!(target: "scmi", "Mailbox too small: size={:#X}, minimum={:#X}", size, PAYLOAD_OFFSET);
            return Err(ScmiError::InvalidParameter);
        }
        if base.checked_add(size as u64).is_none() {
            log::error!(target: "scmi", "Mailbox exceeds the address space: base={:#X}, size={:#X}", base, size);
            return Err(ScmiError::InvalidParameter);
        }
        Ok(Self { base, size, memory, stale: false })
    }

    /// Creates a handle to the mailbox region described by `config`.
    pub fn from_config(config: &ScmiTransportConfiguration, memory: Box<dyn VolatileMemory>) -> Result<Self> {
        Self::new(config.mailbox_base, config.mailbox_size, memory)
    }

    /// Returns the physical address of the region.
    pub fn base(&self) -> efi::PhysicalAddress {
        self.base
    }

    /// Returns the size of the region in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of payload words the region can hold.
    pub fn payload_capacity(&self) -> usize {
        (self.size - PAYLOAD_OFFSET) / size_of::<u32>()
    }

    /// Reads the channel status word.
    pub fn status(&self) -> ChannelStatus {
        ChannelStatus::from_bits(self.read_word(CHANNEL_STATUS_OFFSET))
    }

    /// Returns whether the remote agent has released the channel.
    pub fn is_free(&self) -> bool {
        self.status().free()
    }

    /// Returns whether a request on this region timed out without being recovered.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Reads the fixed header words of the region.
    pub fn snapshot(&self) -> SharedMemoryHeader {
        let mut words = [0u32; SHARED_MEMORY_HEADER_WORDS];
        for (index, word) in words.iter_mut().enumerate() {
            *word = self.read_word(index * size_of::<u32>());
        }
        zerocopy::transmute!(words)
    }

    /// Forcibly returns the channel to the free state after a timeout.
    ///
    /// ## Notes
    ///
    /// - Only call this once the remote agent is known to have abandoned the request (for example after a channel
    ///   reset). A response it is still writing would otherwise be read by the next request.
    pub fn recover(&mut self) {
        log::info!(target: "scmi", "Recovering SCMI channel: base={:#X}, stale={}", self.base, self.stale);
        self.write_word(CHANNEL_STATUS_OFFSET, ChannelStatus::new().with_free(true).into_bits());
        self.memory.barrier();
        self.stale = false;
    }

    /// Claims the channel for a new request.
    pub(crate) fn mark_busy(&mut self) {
        self.write_word(CHANNEL_STATUS_OFFSET, ChannelStatus::BUSY.into_bits());
    }

    /// Records that the remote agent may still own the channel.
    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Orders accesses to the region.
    pub(crate) fn barrier(&self) {
        self.memory.barrier();
    }

    /// Reads the word at `offset` bytes into the region.
    pub(crate) fn read_word(&self, offset: usize) -> u32 {
        debug_assert!(offset + size_of::<u32>() <= self.size);
        self.memory.read32(self.base + offset as u64)
    }

    /// Writes the word at `offset` bytes into the region.
    pub(crate) fn write_word(&self, offset: usize, value: u32) {
        debug_assert!(offset + size_of::<u32>() <= self.size);
        self.memory.write32(self.base + offset as u64, value);
    }
}

#[cfg(not(tarpaulin_include))]
impl fmt::Debug for ScmiMailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ScmiMailbox(base: 0x{:X}, size: 0x{:X}, stale: {})", self.base, self.size, self.stale)?;
        for offset in (0..self.size - self.size % size_of::<u32>()).step_by(size_of::<u32>() * 4) {
            write!(f, "{:08X}: ", offset)?;
            for word_offset in (offset..self.size.min(offset + 16)).step_by(size_of::<u32>()) {
                if word_offset + size_of::<u32>() <= self.size {
                    write!(f, "{:08X} ", self.read_word(word_offset))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
