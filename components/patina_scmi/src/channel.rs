//! SCMI Channel
//!
//! Pairs a transport with the mailbox it drives and exposes the pair through the [`ScmiCommandExecutor`] trait so
//! protocol clients can be written and tested without a mailbox.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::{boxed::Box, vec::Vec};

use core::fmt::{self, Debug};

use crate::config::ScmiTransportConfiguration;
use crate::error::Result;
use crate::hal::{GenericTimerStall, Mmio, MmioDoorbell};
use crate::mailbox::ScmiMailbox;
use crate::transport::ScmiTransport;

#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

/// SCMI Command Executor
///
/// Sends a single SCMI command and returns the raw response payload words.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait ScmiCommandExecutor {
    /// Executes a command.
    ///
    /// # Parameters
    ///
    /// - `protocol_id`: The SCMI protocol the command belongs to.
    /// - `message_id`: The command within the protocol.
    /// - `input`: The command payload words.
    /// - `output_capacity`: The largest number of response words the caller accepts.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<u32>)`: The response payload words, status word first.
    /// - `Err(ScmiError)`: The transport failed. See [`ScmiTransport::execute`].
    fn execute(&mut self, protocol_id: u8, message_id: u8, input: &[u32], output_capacity: usize) -> Result<Vec<u32>>;

    /// Returns the largest number of payload words a request or response may carry.
    fn payload_capacity(&self) -> usize;
}

/// SCMI Channel
///
/// A transport and the mailbox it exclusively drives.
pub struct ScmiChannel {
    transport: ScmiTransport,
    mailbox: ScmiMailbox,
}

impl ScmiChannel {
    /// Creates a channel from an existing transport and mailbox.
    pub fn new(transport: ScmiTransport, mailbox: ScmiMailbox) -> Self {
        Self { transport, mailbox }
    }

    /// Creates a channel backed by memory mapped hardware as described by `config`.
    ///
    /// ## Safety
    ///
    /// - The mailbox region and the doorbell register described by `config` must be mapped and valid for volatile
    ///   access for the lifetime of the channel.
    /// - No other code may access the mailbox region while the channel exists.
    pub unsafe fn from_config(config: ScmiTransportConfiguration) -> Result<Self> {
        log::info!(target: "scmi", "Initializing SCMI channel: {:?}", config);

        // SAFETY: The caller guarantees the mailbox and doorbell are mapped.
        let mailbox = ScmiMailbox::from_config(&config, Box::new(unsafe { Mmio::new() }))?;
        // SAFETY: The caller guarantees the mailbox and doorbell are mapped.
        let doorbell = MmioDoorbell::new(unsafe { Mmio::new() }, config.doorbell_value);
        let transport = ScmiTransport::new(config, Box::new(doorbell), Box::new(GenericTimerStall));

        Ok(Self::new(transport, mailbox))
    }

    /// Returns the mailbox of the channel.
    pub fn mailbox(&self) -> &ScmiMailbox {
        &self.mailbox
    }

    /// Returns the mailbox of the channel for recovery after a timeout.
    pub fn mailbox_mut(&mut self) -> &mut ScmiMailbox {
        &mut self.mailbox
    }

    /// Returns the transport of the channel.
    pub fn transport(&self) -> &ScmiTransport {
        &self.transport
    }
}

impl ScmiCommandExecutor for ScmiChannel {
    fn execute(&mut self, protocol_id: u8, message_id: u8, input: &[u32], output_capacity: usize) -> Result<Vec<u32>> {
        self.transport.execute(&mut self.mailbox, protocol_id, message_id, input, output_capacity)
    }

    fn payload_capacity(&self) -> usize {
        self.mailbox.payload_capacity()
    }
}

#[cfg(not(tarpaulin_include))]
impl Debug for ScmiChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SCMI Channel:")?;
        writeln!(f, "Transport: {:?}", self.transport)?;
        write!(f, "Mailbox: {:?}", self.mailbox)
    }
}
