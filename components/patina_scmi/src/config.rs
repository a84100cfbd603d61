//! SCMI Transport Configuration
//!
//! Defines the platform values the SCMI transport needs: where the shared mailbox lives, how the remote agent is
//! signalled, and how long to wait for it.
//!
//! ## Configuration Usage
//!
//! The platform is expected to provide one configuration per SCMI channel. The poll interval and iteration budget are
//! fixed for the lifetime of the channel. They are never recomputed per request.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::fmt;

use r_efi::efi;

/// Default delay between two reads of the channel status word, in microseconds.
pub const DEFAULT_POLL_INTERVAL_US: u64 = 1000;

/// Default number of channel status reads before a request is declared timed out.
pub const DEFAULT_POLL_MAX_ITERATIONS: u32 = 500;

/// Default size of the shared mailbox region in bytes.
pub const DEFAULT_MAILBOX_SIZE: usize = 0x80;

/// Default value written to the doorbell register.
pub const DEFAULT_DOORBELL_VALUE: u32 = 0x1;

/// SCMI Transport Configuration
///
/// A standardized configuration structure for a single SCMI mailbox channel.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ScmiTransportConfiguration {
    /// Physical address of the shared mailbox region.
    pub mailbox_base: efi::PhysicalAddress,
    /// Size of the shared mailbox region in bytes.
    pub mailbox_size: usize,
    /// Register written to signal the remote agent.
    pub doorbell_address: efi::PhysicalAddress,
    /// Value written to the doorbell register.
    pub doorbell_value: u32,
    /// Delay between status polls in microseconds.
    pub poll_interval_us: u64,
    /// Maximum number of status polls per request.
    pub poll_max_iterations: u32,
}

impl ScmiTransportConfiguration {
    /// Returns the worst case time a request can block, in microseconds.
    pub fn poll_budget_us(&self) -> u64 {
        self.poll_interval_us.saturating_mul(self.poll_max_iterations as u64)
    }
}

impl Default for ScmiTransportConfiguration {
    fn default() -> Self {
        ScmiTransportConfiguration {
            mailbox_base: 0,
            mailbox_size: DEFAULT_MAILBOX_SIZE,
            doorbell_address: 0,
            doorbell_value: DEFAULT_DOORBELL_VALUE,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
            poll_max_iterations: DEFAULT_POLL_MAX_ITERATIONS,
        }
    }
}

impl fmt::Debug for ScmiTransportConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScmiTransportConfiguration")
            .field("mailbox_base", &format_args!("0x{:X}", self.mailbox_base))
            .field("mailbox_size", &format_args!("0x{:X}", self.mailbox_size))
            .field("doorbell_address", &format_args!("0x{:X}", self.doorbell_address))
            .field("doorbell_value", &format_args!("0x{:X}", self.doorbell_value))
            .field("poll_interval_us", &self.poll_interval_us)
            .field("poll_max_iterations", &self.poll_max_iterations)
            .finish()
    }
}
