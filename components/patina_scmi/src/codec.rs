//! SCMI Message Codec
//!
//! Packs and unpacks the SCMI message header and moves payload words between caller buffers and the shared mailbox.
//!
//! ## Message Header
//!
//! | Bits  | Field        |
//! |-------|--------------|
//! | 7:0   | Message ID   |
//! | 9:8   | Message type |
//! | 17:10 | Protocol ID  |
//! | 27:18 | Token        |
//! | 31:28 | Reserved     |
//!
//! The header is stored in the mailbox as a little-endian word.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec::Vec;

use core::mem::size_of;

use bitfield_struct::bitfield;

use crate::error::{Result, ScmiError};
use crate::mailbox::{ChannelFlags, ScmiMailbox, FLAGS_OFFSET, LENGTH_OFFSET, MESSAGE_HEADER_OFFSET, PAYLOAD_OFFSET};

/// Size of the message header in bytes.
pub const HEADER_SIZE: usize = size_of::<u32>();

/// Mask of the bits a token may occupy.
pub const TOKEN_MASK: u16 = 0x3FF;

/// SCMI Message Type
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MessageType {
    /// A synchronous command. The only type the transport sends.
    Command,
    /// Encoding 1 is not assigned.
    Reserved,
    /// The deferred response to an asynchronous command.
    DelayedResponse,
    /// An agent notification.
    Notification,
}

impl MessageType {
    const fn into_bits(self) -> u8 {
        match self {
            MessageType::Command => 0,
            MessageType::Reserved => 1,
            MessageType::DelayedResponse => 2,
            MessageType::Notification => 3,
        }
    }

    const fn from_bits(value: u8) -> Self {
        match value & 0b11 {
            0 => MessageType::Command,
            1 => MessageType::Reserved,
            2 => MessageType::DelayedResponse,
            _ => MessageType::Notification,
        }
    }
}

/// SCMI Message Header
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct MessageHeader {
    pub message_id: u8,
    #[bits(2)]
    pub message_type: MessageType,
    pub protocol_id: u8,
    #[bits(10)]
    pub token: u16,
    #[bits(4)]
    __: u8,
}

impl MessageHeader {
    /// Builds a command header. Token bits beyond the 10-bit field are discarded.
    pub fn command(protocol_id: u8, message_id: u8, token: u16) -> Self {
        Self::new()
            .with_message_id(message_id)
            .with_message_type(MessageType::Command)
            .with_protocol_id(protocol_id)
            .with_token(token & TOKEN_MASK)
    }
}

/// Encodes a command header word.
pub fn encode_header(protocol_id: u8, message_id: u8, token: u16) -> u32 {
    MessageHeader::command(protocol_id, message_id, token).into_bits()
}

/// Decodes a header word into `(protocol_id, message_id, token)`.
pub fn decode_header(word: u32) -> (u8, u8, u16) {
    let header = MessageHeader::from_bits(word);
    (header.protocol_id(), header.message_id(), header.token())
}

/// Writes `words` into the payload area of `mailbox` and updates the length word.
///
/// Nothing is written when the payload does not fit.
pub fn write_payload(mailbox: &ScmiMailbox, words: &[u32]) -> Result<()> {
    if words.len() > mailbox.payload_capacity() {
        log::warn!(
            target: "scmi",
            "Payload does not fit in mailbox: words={}, capacity={}",
            words.len(),
            mailbox.payload_capacity()
        );
        return Err(ScmiError::InvalidParameter);
    }

    for (index, word) in words.iter().enumerate() {
        mailbox.write_word(PAYLOAD_OFFSET + index * size_of::<u32>(), *word);
    }
    mailbox.write_word(LENGTH_OFFSET, (HEADER_SIZE + words.len() * size_of::<u32>()) as u32);

    Ok(())
}

/// Writes a complete polled command (flags, header, payload, and length) into `mailbox`.
///
/// Nothing is written when the payload does not fit.
pub fn write_message(mailbox: &ScmiMailbox, header: MessageHeader, words: &[u32]) -> Result<()> {
    if words.len() > mailbox.payload_capacity() {
        return Err(ScmiError::InvalidParameter);
    }

    mailbox.write_word(FLAGS_OFFSET, ChannelFlags::POLLED.into_bits());
    mailbox.write_word(MESSAGE_HEADER_OFFSET, header.into_bits());
    write_payload(mailbox, words)
}

/// Reads the header word currently in `mailbox`.
pub fn read_header(mailbox: &ScmiMailbox) -> MessageHeader {
    MessageHeader::from_bits(mailbox.read_word(MESSAGE_HEADER_OFFSET))
}

/// Returns the number of payload words announced by the length word of `mailbox`.
///
/// A length shorter than the message header or longer than the region is rejected. Trailing bytes that do not
/// form a whole word are ignored.
pub fn response_word_count(mailbox: &ScmiMailbox) -> Result<usize> {
    let length = mailbox.read_word(LENGTH_OFFSET) as usize;
    if length < HEADER_SIZE {
        log::error!(target: "scmi", "Response length shorter than the message header: length={}", length);
        return Err(ScmiError::InvalidResponse);
    }

    let count = (length - HEADER_SIZE) / size_of::<u32>();
    if count > mailbox.payload_capacity() {
        log::error!(
            target: "scmi",
            "Response length exceeds the mailbox: length={}, capacity={}",
            length,
            mailbox.payload_capacity()
        );
        return Err(ScmiError::InvalidResponse);
    }

    Ok(count)
}

/// Reads `count` payload words from `mailbox`.
///
/// This is a pure read of the region.
pub fn read_payload(mailbox: &ScmiMailbox, count: usize) -> Result<Vec<u32>> {
    if count > mailbox.payload_capacity() {
        return Err(ScmiError::InvalidParameter);
    }

    Ok((0..count).map(|index| mailbox.read_word(PAYLOAD_OFFSET + index * size_of::<u32>())).collect())
}
