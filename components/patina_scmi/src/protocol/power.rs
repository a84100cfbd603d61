//! SCMI Power Domain Management Protocol
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::string::String;

use bitfield_struct::bitfield;

use crate::channel::ScmiCommandExecutor;
use crate::error::Result;
use crate::protocol::{ascii_name, invoke, ProtocolId, NAME_WORDS};

pub const POWER_DOMAIN_ATTRIBUTES: u8 = 0x3;
pub const POWER_STATE_SET: u8 = 0x4;
pub const POWER_STATE_GET: u8 = 0x5;

/// Generic power state of a domain that is on.
pub const POWER_STATE_ON: u32 = 0x0000_0000;
/// Generic power state of a domain that is off and has lost its context.
pub const POWER_STATE_OFF: u32 = 0x4000_0000;

/// Flags sent with `POWER_STATE_SET`.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct PowerStateSetFlags {
    /// Requests a delayed response. Only synchronous requests are issued by this crate.
    pub asynchronous: bool,
    #[bits(31)]
    __: u32,
}

/// Power Domain Attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerDomainAttributes {
    /// Raw attributes word. Bit 30 reports asynchronous support, bit 29 synchronous support.
    pub attributes: u32,
    pub name: String,
}

impl PowerDomainAttributes {
    /// Returns true if the domain accepts synchronous `POWER_STATE_SET` requests.
    pub fn supports_synchronous(&self) -> bool {
        self.attributes & (1 << 29) != 0
    }
}

/// Power domain management protocol client.
pub trait ScmiPowerDomainProtocol: ScmiCommandExecutor {
    /// Returns the attributes and name of `domain_id`.
    fn power_domain_attributes(&mut self, domain_id: u32) -> Result<PowerDomainAttributes> {
        let words = 1 + NAME_WORDS;
        let response = invoke(self, ProtocolId::PowerDomain, POWER_DOMAIN_ATTRIBUTES, &[domain_id], words, words)?;
        Ok(PowerDomainAttributes { attributes: response[0], name: ascii_name(&response[1..])? })
    }

    /// Synchronously moves `domain_id` to `power_state`.
    fn power_state_set(&mut self, domain_id: u32, power_state: u32) -> Result<()> {
        log::debug!(target: "scmi", "Setting power domain {} to state {:#X}", domain_id, power_state);
        let flags = PowerStateSetFlags::new().with_asynchronous(false);
        invoke(self, ProtocolId::PowerDomain, POWER_STATE_SET, &[flags.into_bits(), domain_id, power_state], 0, 0)?;
        Ok(())
    }

    /// Returns the current power state of `domain_id`.
    fn power_state_get(&mut self, domain_id: u32) -> Result<u32> {
        let response = invoke(self, ProtocolId::PowerDomain, POWER_STATE_GET, &[domain_id], 1, 1)?;
        Ok(response[0])
    }
}

impl<T: ScmiCommandExecutor + ?Sized> ScmiPowerDomainProtocol for T {}
