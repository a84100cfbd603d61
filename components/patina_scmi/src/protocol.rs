//! SCMI Protocol Clients
//!
//! Typed clients for the SCMI protocols commonly used by firmware. Each client is an extension trait implemented for
//! every [`ScmiCommandExecutor`], so the same code drives a real [`ScmiChannel`](crate::channel::ScmiChannel) or a
//! mock.
//!
//! Every response payload begins with an SCMI status word. A non-success status is returned as
//! [`ScmiError::Protocol`] and a response shorter than the message defines is returned as
//! [`ScmiError::InvalidResponse`].
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
pub mod base;
pub mod clock;
pub mod performance;
pub mod power;

use alloc::{string::String, vec::Vec};

use crate::channel::ScmiCommandExecutor;
use crate::error::{Result, ScmiError, ScmiStatus};

/// Message returning the version of a protocol. Implemented by every protocol.
pub const PROTOCOL_VERSION: u8 = 0x0;
/// Message returning the protocol specific attributes. Implemented by every protocol.
pub const PROTOCOL_ATTRIBUTES: u8 = 0x1;
/// Message returning the attributes of another message in the same protocol. Implemented by every protocol.
pub const PROTOCOL_MESSAGE_ATTRIBUTES: u8 = 0x2;

/// Length in bytes of the fixed size ASCII names returned by several messages.
pub const NAME_LENGTH: usize = 16;
/// Number of payload words a fixed size name occupies.
pub const NAME_WORDS: usize = NAME_LENGTH / size_of::<u32>();

/// SCMI Protocol Identifiers
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ProtocolId {
    Base = 0x10,
    PowerDomain = 0x11,
    SystemPower = 0x12,
    Performance = 0x13,
    Clock = 0x14,
    Sensor = 0x15,
    Reset = 0x16,
}

impl ProtocolId {
    /// Returns the raw protocol identifier.
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns the protocol for a raw identifier, if it is one this crate knows about.
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0x10 => Some(ProtocolId::Base),
            0x11 => Some(ProtocolId::PowerDomain),
            0x12 => Some(ProtocolId::SystemPower),
            0x13 => Some(ProtocolId::Performance),
            0x14 => Some(ProtocolId::Clock),
            0x15 => Some(ProtocolId::Sensor),
            0x16 => Some(ProtocolId::Reset),
            _ => None,
        }
    }
}

impl From<ProtocolId> for u8 {
    fn from(value: ProtocolId) -> Self {
        value.id()
    }
}

/// Protocol Version
///
/// Reported by `PROTOCOL_VERSION` with the major revision in the upper half-word.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProtocolVersion {
    pub major: u16,
    pub minor: u16,
}

impl From<u32> for ProtocolVersion {
    fn from(value: u32) -> Self {
        Self { major: (value >> 16) as u16, minor: value as u16 }
    }
}

/// Messages every SCMI protocol implements.
pub trait ScmiCommonProtocol: ScmiCommandExecutor {
    /// Returns the version of `protocol` implemented by the remote agent.
    fn protocol_version(&mut self, protocol: ProtocolId) -> Result<ProtocolVersion> {
        let response = invoke(self, protocol, PROTOCOL_VERSION, &[], 1, 1)?;
        Ok(ProtocolVersion::from(response[0]))
    }

    /// Returns the raw protocol specific attributes word of `protocol`.
    fn protocol_attributes(&mut self, protocol: ProtocolId) -> Result<u32> {
        let response = invoke(self, protocol, PROTOCOL_ATTRIBUTES, &[], 1, 1)?;
        Ok(response[0])
    }

    /// Returns the attributes word of `message_id` in `protocol`.
    ///
    /// A remote agent that does not implement the message answers with [`ScmiStatus::NotFound`].
    fn protocol_message_attributes(&mut self, protocol: ProtocolId, message_id: u8) -> Result<u32> {
        let response = invoke(self, protocol, PROTOCOL_MESSAGE_ATTRIBUTES, &[message_id as u32], 1, 1)?;
        Ok(response[0])
    }
}

impl<T: ScmiCommandExecutor + ?Sized> ScmiCommonProtocol for T {}

/// Executes a command and strips the leading status word from the response.
///
/// The response must carry between `min_words` and `max_words` words after the status word.
pub(crate) fn invoke<E: ScmiCommandExecutor + ?Sized>(
    executor: &mut E,
    protocol: ProtocolId,
    message_id: u8,
    input: &[u32],
    min_words: usize,
    max_words: usize,
) -> Result<Vec<u32>> {
    let mut response = executor.execute(protocol.id(), message_id, input, max_words + 1)?;
    if response.is_empty() {
        log::warn!(target: "scmi", "SCMI response without status: protocol={:?}, message={:#X}", protocol, message_id);
        return Err(ScmiError::InvalidResponse);
    }

    let status = response.remove(0);
    if let Err(err) = ScmiStatus::word_to_result(status) {
        log::debug!(target: "scmi", "SCMI command failed: protocol={:?}, message={:#X}, {}", protocol, message_id, err);
        return Err(err);
    }

    if response.len() < min_words {
        log::warn!(
            target: "scmi",
            "SCMI response too short: protocol={:?}, message={:#X}, words={}, expected={}",
            protocol,
            message_id,
            response.len(),
            min_words
        );
        return Err(ScmiError::InvalidResponse);
    }

    Ok(response)
}

/// Returns the largest number of words a response may carry after its status word.
pub(crate) fn max_return_words<E: ScmiCommandExecutor + ?Sized>(executor: &E) -> usize {
    executor.payload_capacity().saturating_sub(1)
}

/// Decodes a NUL terminated ASCII name packed little-endian into `words`.
pub(crate) fn ascii_name(words: &[u32]) -> Result<String> {
    let bytes: Vec<u8> = words.iter().flat_map(|word| word.to_le_bytes()).take_while(|byte| *byte != 0).collect();
    if !bytes.is_ascii() {
        log::warn!(target: "scmi", "SCMI name is not ASCII: {:X?}", bytes);
        return Err(ScmiError::InvalidResponse);
    }
    String::from_utf8(bytes).map_err(|_| ScmiError::InvalidResponse)
}
