//! SCMI Mailbox Transport
//!
//! Executes one SCMI command at a time over a shared mailbox using polled completion.
//!
//! ## Sequence
//!
//! 1. The channel is claimed by clearing its free bit.
//! 2. The header, flags, payload, and length are written into the mailbox between two barriers.
//! 3. The doorbell is rung.
//! 4. The free bit is polled up to `poll_max_iterations` times, stalling `poll_interval_us` after each miss.
//! 5. Once the free bit is observed the response length and payload are read back.
//!
//! A request that times out leaves the mailbox owned by the remote agent. The handle refuses further requests until
//! [`ScmiMailbox::recover`] is called. Nothing is retried by the transport.
//!
//! ## Logging
//!
//! Detailed logging is available for this module using the `scmi` log target.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::{boxed::Box, vec::Vec};

use core::cell::Cell;
use core::fmt;

use crate::codec::{self, MessageHeader, TOKEN_MASK};
use crate::config::ScmiTransportConfiguration;
use crate::error::{Result, ScmiError};
use crate::hal::{Doorbell, Stall};
use crate::mailbox::ScmiMailbox;

/// Transport State
///
/// The phases a single request moves through. Both `Complete` and `TimedOut` return control to the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Sending,
    AwaitingResponse,
    Complete,
    TimedOut,
}

/// SCMI Mailbox Transport
///
/// Owns the doorbell, the stall, and the poll budget for a channel. The mailbox itself is lent to each call.
pub struct ScmiTransport {
    config: ScmiTransportConfiguration,
    doorbell: Box<dyn Doorbell>,
    stall: Box<dyn Stall>,
    next_token: Cell<u16>,
}

impl ScmiTransport {
    /// Creates a new transport.
    pub fn new(config: ScmiTransportConfiguration, doorbell: Box<dyn Doorbell>, stall: Box<dyn Stall>) -> Self {
        Self { config, doorbell, stall, next_token: Cell::new(0) }
    }

    /// Returns the transport configuration.
    pub fn config(&self) -> &ScmiTransportConfiguration {
        &self.config
    }

    /// Sends a command to the remote agent and waits for its response.
    ///
    /// # Parameters
    ///
    /// - `mailbox`: The mailbox of the channel to use.
    /// - `protocol_id`: The SCMI protocol the command belongs to.
    /// - `message_id`: The command within the protocol.
    /// - `input`: The command payload words.
    /// - `output_capacity`: The largest number of response words the caller accepts.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<u32>)`: The response payload words, never more than `output_capacity`.
    /// - `Err(ScmiError::InvalidParameter)`: `input` or `output_capacity` exceeds the mailbox, or the poll budget is
    ///   zero. Nothing was written.
    /// - `Err(ScmiError::ChannelBusy)`: A previous request on `mailbox` timed out. Nothing was written.
    /// - `Err(ScmiError::Timeout)`: The remote agent did not respond within the poll budget.
    /// - `Err(ScmiError::BufferTooSmall)`: The response holds more than `output_capacity` words.
    /// - `Err(ScmiError::InvalidResponse)`: The response length is malformed.
    pub fn execute(
        &self,
        mailbox: &mut ScmiMailbox,
        protocol_id: u8,
        message_id: u8,
        input: &[u32],
        output_capacity: usize,
    ) -> Result<Vec<u32>> {
        log::debug!(
            target: "scmi",
            "Starting SCMI command: protocol={:#X}, message={:#X}, input_words={}, output_capacity={}",
            protocol_id,
            message_id,
            input.len(),
            output_capacity
        );

        if mailbox.is_stale() {
            log::warn!(target: "scmi", "SCMI channel has a timed out request outstanding: base={:#X}", mailbox.base());
            return Err(ScmiError::ChannelBusy);
        }

        let capacity = mailbox.payload_capacity();
        if input.len() > capacity || output_capacity > capacity {
            log::warn!(
                target: "scmi",
                "SCMI command does not fit in mailbox: input_words={}, output_capacity={}, capacity={}",
                input.len(),
                output_capacity,
                capacity
            );
            return Err(ScmiError::InvalidParameter);
        }

        if self.config.poll_max_iterations == 0 {
            log::warn!(target: "scmi", "SCMI poll budget is zero, a response could never be observed");
            return Err(ScmiError::InvalidParameter);
        }

        let header = MessageHeader::command(protocol_id, message_id, self.allocate_token());
        self.send(mailbox, header, input)?;
        self.await_response(mailbox)?;
        self.receive(mailbox, output_capacity)
    }

    fn send(&self, mailbox: &mut ScmiMailbox, header: MessageHeader, input: &[u32]) -> Result<()> {
        log::trace!(
            target: "scmi",
            "{:?} -> {:?}: header={:#010X}",
            TransportState::Idle,
            TransportState::Sending,
            header.into_bits()
        );

        mailbox.mark_busy();
        mailbox.barrier();
        codec::write_message(mailbox, header, input)?;
        mailbox.barrier();
        self.doorbell.notify(self.config.doorbell_address);

        log::trace!(target: "scmi", "{:?} -> {:?}", TransportState::Sending, TransportState::AwaitingResponse);
        Ok(())
    }

    fn await_response(&self, mailbox: &mut ScmiMailbox) -> Result<()> {
        for iteration in 0..self.config.poll_max_iterations {
            if mailbox.is_free() {
                log::trace!(
                    target: "scmi",
                    "{:?} -> {:?}: polls={}",
                    TransportState::AwaitingResponse,
                    TransportState::Complete,
                    iteration + 1
                );
                return Ok(());
            }
            self.stall.stall(self.config.poll_interval_us);
        }

        mailbox.mark_stale();
        log::error!(
            target: "scmi",
            "{:?} -> {:?}: no response after {} polls of {}us",
            TransportState::AwaitingResponse,
            TransportState::TimedOut,
            self.config.poll_max_iterations,
            self.config.poll_interval_us
        );
        Err(ScmiError::Timeout)
    }

    fn receive(&self, mailbox: &mut ScmiMailbox, output_capacity: usize) -> Result<Vec<u32>> {
        mailbox.barrier();

        if mailbox.status().error() {
            log::warn!(target: "scmi", "Remote agent flagged a channel error");
        }

        let count = codec::response_word_count(mailbox)?;
        if count > output_capacity {
            log::warn!(
                target: "scmi",
                "SCMI response larger than output capacity: words={}, output_capacity={}",
                count,
                output_capacity
            );
            return Err(ScmiError::BufferTooSmall { required: count });
        }

        let response = codec::read_payload(mailbox, count)?;
        log::debug!(target: "scmi", "SCMI response received: words={}", response.len());
        log::trace!(target: "scmi", "Response Data (hex): {:08X?}", &response[..core::cmp::min(response.len(), 16)]);
        Ok(response)
    }

    fn allocate_token(&self) -> u16 {
        let token = self.next_token.get();
        self.next_token.set(token.wrapping_add(1) & TOKEN_MASK);
        token
    }
}

impl fmt::Debug for ScmiTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScmiTransport")
            .field("config", &self.config)
            .field("next_token", &self.next_token.get())
            .finish()
    }
}
