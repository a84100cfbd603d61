//! SCMI Clock Management Protocol
//!
//! Rates are in Hz and travel as two words, low word first.
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
use crate::protocol::{ascii_name, invoke, max_return_words, ProtocolId, NAME_WORDS};

pub const CLOCK_ATTRIBUTES: u8 = 0x3;
pub const CLOCK_DESCRIBE_RATES: u8 = 0x4;
pub const CLOCK_RATE_SET: u8 = 0x5;
pub const CLOCK_RATE_GET: u8 = 0x6;
pub const CLOCK_CONFIG_SET: u8 = 0x7;

/// Words used by one rate in a response.
const RATE_WORDS: usize = 2;

/// The `num_rates_flags` word of a `CLOCK_DESCRIBE_RATES` response.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct NumRatesFlags {
    /// Number of rates in this response.
    #[bits(12)]
    pub returned: u16,
    /// The rates form a `{min, max, step}` triplet instead of a list.
    pub range_format: bool,
    #[bits(3)]
    __: u8,
    /// Number of rates still to be described after this response.
    pub remaining: u16,
}

/// `CLOCK_RATE_SET` flags word.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct ClockRateSetFlags {
    pub asynchronous: bool,
    pub ignore_delayed_response: bool,
    /// Round the requested rate up instead of down.
    pub round_up: bool,
    /// Let the platform pick the closest rate, ignoring `round_up`.
    pub round_auto: bool,
    #[bits(28)]
    __: u32,
}

/// `CLOCK_CONFIG_SET` attributes word.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct ClockConfig {
    pub enabled: bool,
    #[bits(31)]
    __: u32,
}

/// Clock Attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockAttributes {
    pub enabled: bool,
    pub name: String,
}

/// The rates a clock supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockRates {
    /// A discrete list of rates.
    List(Vec<u64>),
    /// Every rate from `min` to `max` in increments of `step`.
    Range { min: u64, max: u64, step: u64 },
}

fn rate_from_words(low: u32, high: u32) -> u64 {
    ((high as u64) << 32) | low as u64
}

/// Clock management protocol client.
pub trait ScmiClockProtocol: ScmiCommandExecutor {
    /// Returns the state and name of `clock_id`.
    fn clock_attributes(&mut self, clock_id: u32) -> Result<ClockAttributes> {
        let words = 1 + NAME_WORDS;
        let response = invoke(self, ProtocolId::Clock, CLOCK_ATTRIBUTES, &[clock_id], words, words)?;
        let enabled = ClockConfig::from_bits(response[0]).enabled();
        Ok(ClockAttributes { enabled, name: ascii_name(&response[1..])? })
    }

    /// Returns the rates `clock_id` supports.
    ///
    /// A list of rates is gathered over as many commands as the mailbox size requires. The first response fixes the
    /// number of rates, and every later response must agree with the number still outstanding.
    fn clock_describe_rates(&mut self, clock_id: u32) -> Result<ClockRates> {
        let max_words = max_return_words(&*self);
        let mut rates = Vec::new();
        let mut total = None;

        loop {
            let rate_index = rates.len() as u32;
            let response =
                invoke(self, ProtocolId::Clock, CLOCK_DESCRIBE_RATES, &[clock_id, rate_index], 1, max_words)?;
            let flags = NumRatesFlags::from_bits(response[0]);
            let returned = flags.returned() as usize;

            if response.len() < 1 + returned * RATE_WORDS {
                log::warn!(target: "scmi", "Clock {} rate response too short: {:?}", clock_id, flags);
                return Err(ScmiError::InvalidResponse);
            }

            if flags.range_format() {
                if returned != 3 || !rates.is_empty() {
                    log::warn!(
                        target: "scmi",
                        "Clock {} range is malformed: listed={}, flags={:?}",
                        clock_id,
                        rates.len(),
                        flags
                    );
                    return Err(ScmiError::InvalidResponse);
                }
                return Ok(ClockRates::Range {
                    min: rate_from_words(response[1], response[2]),
                    max: rate_from_words(response[3], response[4]),
                    step: rate_from_words(response[5], response[6]),
                });
            }

            let reported = returned + flags.remaining() as usize;
            let outstanding = *total.get_or_insert(reported) - rates.len();
            if reported != outstanding {
                log::warn!(
                    target: "scmi",
                    "Clock {} rate count changed: outstanding={}, reported={:?}",
                    clock_id,
                    outstanding,
                    flags
                );
                return Err(ScmiError::InvalidResponse);
            }

            let listed = &response[1..1 + returned * RATE_WORDS];
            rates.extend(listed.chunks_exact(RATE_WORDS).map(|rate| rate_from_words(rate[0], rate[1])));

            if flags.remaining() == 0 {
                break;
            }
            if returned == 0 {
                log::warn!(target: "scmi", "Clock {} reports remaining rates but returned none", clock_id);
                return Err(ScmiError::InvalidResponse);
            }
        }

        Ok(ClockRates::List(rates))
    }

    /// Synchronously sets `clock_id` to `rate`, rounding down to a supported rate.
    fn clock_rate_set(&mut self, clock_id: u32, rate: u64) -> Result<()> {
        log::debug!(target: "scmi", "Setting clock {} to {} Hz", clock_id, rate);
        let flags = ClockRateSetFlags::new();
        invoke(
            self,
            ProtocolId::Clock,
            CLOCK_RATE_SET,
            &[flags.into_bits(), clock_id, rate as u32, (rate >> 32) as u32],
            0,
            0,
        )?;
        Ok(())
    }

    /// Returns the current rate of `clock_id`.
    fn clock_rate_get(&mut self, clock_id: u32) -> Result<u64> {
        let response = invoke(self, ProtocolId::Clock, CLOCK_RATE_GET, &[clock_id], RATE_WORDS, RATE_WORDS)?;
        Ok(rate_from_words(response[0], response[1]))
    }

    /// Enables or disables `clock_id`.
    fn clock_config_set(&mut self, clock_id: u32, enabled: bool) -> Result<()> {
        let config = ClockConfig::new().with_enabled(enabled);
        invoke(self, ProtocolId::Clock, CLOCK_CONFIG_SET, &[clock_id, config.into_bits()], 0, 0)?;
        Ok(())
    }
}

impl<T: ScmiCommandExecutor + ?Sized> ScmiClockProtocol for T {}
