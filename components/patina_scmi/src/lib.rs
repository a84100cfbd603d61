//! # SCMI Shared Memory Transport
//!
//! A synchronous, polled System Control and Management Interface (SCMI) agent for firmware running on Arm systems.
//!
//! ## SCMI Background
//!
//! SCMI is the Arm standard interface an operating system or firmware agent uses to ask a System Control Processor
//! (SCP) for power, performance, clock, and sensor management. The agent and the SCP share a small region of memory
//! called a mailbox. The agent writes a command into the mailbox, rings a doorbell register to interrupt the SCP, and
//! the SCP writes its response back into the same mailbox before marking the channel free again.
//!
//! Every message starts with a 32-bit header that identifies the protocol (for example the clock protocol, `0x14`),
//! the message within that protocol, the message type, and a 10-bit token that lets a response be matched to its
//! command. The first word of every response payload is a signed SCMI status code.
//!
//! Firmware environments usually have no interrupt routed back from the SCP, so this crate polls the channel status
//! word until the SCP marks the channel free or the configured poll budget runs out. Only one command is ever in
//! flight on a channel.
//!
//! ## Crate Layout
//!
//! - [`mailbox`]: The shared memory layout and the channel status word.
//! - [`codec`]: Message header encoding and payload copying.
//! - [`transport`]: The request/response state machine and poll loop.
//! - [`channel`]: A transport bound to its mailbox, and the [`channel::ScmiCommandExecutor`] trait.
//! - [`protocol`]: Typed clients for the base, power domain, performance, and clock protocols.
//! - [`hal`]: The memory, doorbell, and stall capabilities the transport is built on.
//!
//! ## Examples and Usage
//!
//! ```rust,no_run
//! use patina_scmi::channel::ScmiChannel;
//! use patina_scmi::config::ScmiTransportConfiguration;
//! use patina_scmi::protocol::base::ScmiBaseProtocol;
//! use patina_scmi::protocol::clock::{ClockRates, ScmiClockProtocol};
//!
//! fn configure_uart_clock() -> patina_scmi::error::Result<()> {
//!     let config = ScmiTransportConfiguration {
//!         mailbox_base: 0x4540_0000,
//!         doorbell_address: 0x2A4C_0020,
//!         ..Default::default()
//!     };
//!
//!     // SAFETY: The platform maps the mailbox and doorbell as device memory before this runs.
//!     let mut channel = unsafe { ScmiChannel::from_config(config)? };
//!
//!     log::info!("SCP vendor: {}", channel.discover_vendor()?);
//!
//!     if let ClockRates::List(rates) = channel.clock_describe_rates(3)? {
//!         if let Some(&fastest) = rates.iter().max() {
//!             channel.clock_rate_set(3, fastest)?;
//!         }
//!     }
//!     channel.clock_config_set(3, true)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! A command that times out leaves the channel owned by the SCP. Further commands return
//! [`error::ScmiError::ChannelBusy`] until the platform knows the SCP is done with the mailbox and calls
//! [`mailbox::ScmiMailbox::recover`] through [`channel::ScmiChannel::mailbox_mut`].
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
#![cfg_attr(all(not(feature = "std"), not(test), not(feature = "mockall")), no_std)]

extern crate alloc;

pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod hal;
pub mod mailbox;
pub mod protocol;
pub mod transport;
