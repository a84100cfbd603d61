//! SCMI Performance Domain Management Protocol
//!
//! Performance levels are abstract values defined by the platform. Callers discover the meaning of a level from
//! the domain attributes or from platform data.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::string::String;

use crate::channel::ScmiCommandExecutor;
use crate::error::{Result, ScmiError};
use crate::protocol::{ascii_name, invoke, ProtocolId, NAME_WORDS};

pub const PERFORMANCE_DOMAIN_ATTRIBUTES: u8 = 0x3;
pub const PERFORMANCE_LIMITS_SET: u8 = 0x5;
pub const PERFORMANCE_LIMITS_GET: u8 = 0x6;
pub const PERFORMANCE_LEVEL_SET: u8 = 0x7;
pub const PERFORMANCE_LEVEL_GET: u8 = 0x8;

/// Performance Domain Attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceDomainAttributes {
    /// Raw attributes word. Bit 31 reports whether limits may be set, bit 30 whether the level may be set.
    pub attributes: u32,
    /// Minimum time between two requests to the domain, in microseconds.
    pub rate_limit_us: u32,
    /// Frequency of the sustained performance level, in kHz.
    pub sustained_freq_khz: u32,
    pub sustained_perf_level: u32,
    pub name: String,
}

impl PerformanceDomainAttributes {
    /// Returns true if the agent may set the performance limits of the domain.
    pub fn can_set_limits(&self) -> bool {
        self.attributes & (1 << 31) != 0
    }

    /// Returns true if the agent may set the performance level of the domain.
    pub fn can_set_level(&self) -> bool {
        self.attributes & (1 << 30) != 0
    }
}

/// Performance Limits
///
/// The inclusive range the performance level of a domain is held within.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PerformanceLimits {
    pub range_max: u32,
    pub range_min: u32,
}

/// Performance domain management protocol client.
pub trait ScmiPerformanceProtocol: ScmiCommandExecutor {
    /// Returns the attributes and name of `domain_id`.
    fn performance_domain_attributes(&mut self, domain_id: u32) -> Result<PerformanceDomainAttributes> {
        let words = 4 + NAME_WORDS;
        let response =
            invoke(self, ProtocolId::Performance, PERFORMANCE_DOMAIN_ATTRIBUTES, &[domain_id], words, words)?;
        Ok(PerformanceDomainAttributes {
            attributes: response[0],
            rate_limit_us: response[1],
            sustained_freq_khz: response[2],
            sustained_perf_level: response[3],
            name: ascii_name(&response[4..])?,
        })
    }

    /// Restricts the performance level of `domain_id` to `limits`.
    ///
    /// An inverted range is rejected before anything is sent.
    fn performance_limits_set(&mut self, domain_id: u32, limits: PerformanceLimits) -> Result<()> {
        if limits.range_min > limits.range_max {
            log::warn!(target: "scmi", "Inverted performance limits for domain {}: {:?}", domain_id, limits);
            return Err(ScmiError::InvalidParameter);
        }

        invoke(
            self,
            ProtocolId::Performance,
            PERFORMANCE_LIMITS_SET,
            &[domain_id, limits.range_max, limits.range_min],
            0,
            0,
        )?;
        Ok(())
    }

    /// Returns the current performance limits of `domain_id`.
    fn performance_limits_get(&mut self, domain_id: u32) -> Result<PerformanceLimits> {
        let response = invoke(self, ProtocolId::Performance, PERFORMANCE_LIMITS_GET, &[domain_id], 2, 2)?;
        Ok(PerformanceLimits { range_max: response[0], range_min: response[1] })
    }

    /// Requests performance level `level` for `domain_id`.
    fn performance_level_set(&mut self, domain_id: u32, level: u32) -> Result<()> {
        log::debug!(target: "scmi", "Setting performance domain {} to level {}", domain_id, level);
        invoke(self, ProtocolId::Performance, PERFORMANCE_LEVEL_SET, &[domain_id, level], 0, 0)?;
        Ok(())
    }

    /// Returns the current performance level of `domain_id`.
    fn performance_level_get(&mut self, domain_id: u32) -> Result<u32> {
        let response = invoke(self, ProtocolId::Performance, PERFORMANCE_LEVEL_GET, &[domain_id], 1, 1)?;
        Ok(response[0])
    }
}

impl<T: ScmiCommandExecutor + ?Sized> ScmiPerformanceProtocol for T {}
