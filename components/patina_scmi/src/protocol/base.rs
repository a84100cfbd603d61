//! SCMI Base Protocol
//!
//! Discovery of the remote agent: its vendor, its firmware version, and the protocols it implements.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::{string::String, vec::Vec};

use bitfield_struct::bitfield;

use crate::channel::ScmiCommandExecutor;
use crate::error::{Result, ScmiError};
use crate::protocol::{ascii_name, invoke, max_return_words, ProtocolId, NAME_WORDS, PROTOCOL_ATTRIBUTES};

pub const BASE_DISCOVER_VENDOR: u8 = 0x3;
pub const BASE_DISCOVER_SUB_VENDOR: u8 = 0x4;
pub const BASE_DISCOVER_IMPLEMENTATION_VERSION: u8 = 0x5;
pub const BASE_DISCOVER_LIST_PROTOCOLS: u8 = 0x6;

/// Base Protocol Attributes
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct BaseProtocolAttributes {
    /// Number of protocols other than the base protocol implemented for this agent.
    pub num_protocols: u8,
    /// Number of agents in the system.
    pub num_agents: u8,
    #[bits(16)]
    __: u16,
}

/// Base protocol client.
pub trait ScmiBaseProtocol: ScmiCommandExecutor {
    /// Returns the protocol and agent counts reported by the base protocol.
    fn base_protocol_attributes(&mut self) -> Result<BaseProtocolAttributes> {
        let response = invoke(self, ProtocolId::Base, PROTOCOL_ATTRIBUTES, &[], 1, 1)?;
        Ok(BaseProtocolAttributes::from_bits(response[0]))
    }

    /// Returns the vendor name of the remote agent.
    fn discover_vendor(&mut self) -> Result<String> {
        let response = invoke(self, ProtocolId::Base, BASE_DISCOVER_VENDOR, &[], NAME_WORDS, NAME_WORDS)?;
        ascii_name(&response)
    }

    /// Returns the sub-vendor name of the remote agent.
    fn discover_sub_vendor(&mut self) -> Result<String> {
        let response = invoke(self, ProtocolId::Base, BASE_DISCOVER_SUB_VENDOR, &[], NAME_WORDS, NAME_WORDS)?;
        ascii_name(&response)
    }

    /// Returns the vendor specific implementation version of the remote agent firmware.
    fn discover_implementation_version(&mut self) -> Result<u32> {
        let response = invoke(self, ProtocolId::Base, BASE_DISCOVER_IMPLEMENTATION_VERSION, &[], 1, 1)?;
        Ok(response[0])
    }

    /// Returns the identifiers of every protocol other than the base protocol the remote agent implements.
    ///
    /// The list is gathered over as many commands as the mailbox size requires.
    fn discover_list_protocols(&mut self) -> Result<Vec<u8>> {
        let total = self.base_protocol_attributes()?.num_protocols() as usize;
        let max_words = max_return_words(&*self);
        let mut protocols = Vec::with_capacity(total);

        while protocols.len() < total {
            let skip = protocols.len() as u32;
            let response = invoke(self, ProtocolId::Base, BASE_DISCOVER_LIST_PROTOCOLS, &[skip], 1, max_words)?;

            let count = response[0] as usize;
            if count == 0 || count > total - protocols.len() || response.len() < 1 + count.div_ceil(4) {
                log::warn!(
                    target: "scmi",
                    "Malformed protocol list: skip={}, count={}, words={}, total={}",
                    skip,
                    count,
                    response.len(),
                    total
                );
                return Err(ScmiError::InvalidResponse);
            }

            protocols.extend(response[1..].iter().flat_map(|word| word.to_le_bytes()).take(count));
        }

        log::debug!(target: "scmi", "SCMI protocols implemented: {:X?}", protocols);
        Ok(protocols)
    }
}

impl<T: ScmiCommandExecutor + ?Sized> ScmiBaseProtocol for T {}
