//! SCMI Protocol Client Tests
//!
//! Runs the typed protocol clients over a real channel against the simulated SCP.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use patina_scmi::channel::ScmiCommandExecutor;
use patina_scmi::error::{ScmiError, ScmiStatus};
use patina_scmi::protocol::base::{ScmiBaseProtocol, BASE_DISCOVER_LIST_PROTOCOLS};
use patina_scmi::protocol::clock::{ClockAttributes, ClockRates, ScmiClockProtocol, CLOCK_DESCRIBE_RATES};
use patina_scmi::protocol::performance::{PerformanceLimits, ScmiPerformanceProtocol};
use patina_scmi::protocol::power::{ScmiPowerDomainProtocol, POWER_STATE_OFF, POWER_STATE_ON};
use patina_scmi::protocol::{ProtocolId, ProtocolVersion, ScmiCommonProtocol};
use r_efi::efi;

use crate::patina_scmi_integration::common::*;

fn scp_harness() -> (TestHarness, SimulatedScp) {
    let scp = SimulatedScp::new();
    (TestHarness::new(scp.clone()), scp)
}

#[test]
fn test_base_discovery() {
    let (mut harness, _scp) = scp_harness();
    let channel = &mut harness.channel;

    assert_eq!(channel.discover_vendor().as_deref(), Ok("arm"));
    assert_eq!(channel.discover_sub_vendor().as_deref(), Ok("juno"));
    assert_eq!(channel.discover_implementation_version(), Ok(0x0001_0200));

    let attributes = channel.base_protocol_attributes().unwrap();
    assert_eq!(attributes.num_protocols() as usize, SCP_PROTOCOLS.len());
    assert_eq!(attributes.num_agents(), 2);
}

#[test]
fn test_discover_list_protocols_across_pages() {
    let (mut harness, _scp) = scp_harness();

    assert_eq!(harness.channel.discover_list_protocols(), Ok(SCP_PROTOCOLS.to_vec()));

    let skips: Vec<Vec<u32>> = harness
        .agent
        .requests()
        .into_iter()
        .filter(|request| request.protocol_id == 0x10 && request.message_id == BASE_DISCOVER_LIST_PROTOCOLS)
        .map(|request| request.payload)
        .collect();
    assert_eq!(skips, vec![vec![0], vec![SCP_PROTOCOLS_PER_PAGE as u32]]);

    let known: Vec<ProtocolId> = SCP_PROTOCOLS.iter().filter_map(|id| ProtocolId::from_id(*id)).collect();
    assert_eq!(known, vec![ProtocolId::PowerDomain, ProtocolId::Performance, ProtocolId::Clock]);
}

#[test]
fn test_protocol_versions() {
    let (mut harness, _scp) = scp_harness();

    assert_eq!(harness.channel.protocol_version(ProtocolId::Clock), Ok(ProtocolVersion { major: 3, minor: 0 }));
    assert_eq!(
        harness.channel.protocol_version(ProtocolId::Performance),
        Ok(ProtocolVersion { major: 4, minor: 0 })
    );

    let unsupported = harness.channel.protocol_version(ProtocolId::Sensor);
    assert_eq!(unsupported, Err(ScmiError::Protocol(ScmiStatus::NotSupported)));
    assert_eq!(efi::Status::from(unsupported.unwrap_err()), efi::Status::UNSUPPORTED);
}

#[test]
fn test_clock_management() {
    let (mut harness, scp) = scp_harness();
    let channel = &mut harness.channel;

    assert_eq!(channel.clock_attributes(0), Ok(ClockAttributes { enabled: false, name: String::from("uart") }));

    assert_eq!(channel.clock_describe_rates(0), Ok(ClockRates::List(SCP_CLOCK0_RATES.to_vec())));
    assert_eq!(
        channel.clock_describe_rates(1),
        Ok(ClockRates::Range { min: SCP_CLOCK1_RANGE[0], max: SCP_CLOCK1_RANGE[1], step: SCP_CLOCK1_RANGE[2] })
    );

    channel.clock_rate_set(0, SCP_CLOCK0_RATES[4]).unwrap();
    assert_eq!(scp.clock_rate(0), 5_000_000_000);
    assert_eq!(channel.clock_rate_get(0), Ok(5_000_000_000));

    channel.clock_config_set(0, true).unwrap();
    assert!(scp.clock_enabled(0));
    channel.clock_config_set(1, false).unwrap();
    assert!(!scp.clock_enabled(1));

    assert_eq!(channel.clock_rate_get(9), Err(ScmiError::Protocol(ScmiStatus::NotFound)));

    let pages = harness
        .agent
        .requests()
        .iter()
        .filter(|request| request.protocol_id == 0x14 && request.message_id == CLOCK_DESCRIBE_RATES)
        .filter(|request| request.payload[0] == 0)
        .count();
    assert_eq!(pages, SCP_CLOCK0_RATES.len().div_ceil(SCP_RATES_PER_PAGE));
}

#[test]
fn test_performance_management() {
    let (mut harness, scp) = scp_harness();
    let channel = &mut harness.channel;

    let attributes = channel.performance_domain_attributes(0).unwrap();
    assert_eq!(attributes.name, "little");
    assert!(attributes.can_set_level());
    assert!(attributes.can_set_limits());

    channel.performance_level_set(0, 70).unwrap();
    assert_eq!(scp.performance_level(0), 70);
    assert_eq!(channel.performance_level_get(0), Ok(70));

    let limits = PerformanceLimits { range_max: 80, range_min: 20 };
    channel.performance_limits_set(0, limits).unwrap();
    assert_eq!(channel.performance_limits_get(0), Ok(limits));

    assert_eq!(channel.performance_level_set(0, 90), Err(ScmiError::Protocol(ScmiStatus::OutOfRange)));
    assert_eq!(scp.performance_level(0), 70);

    assert_eq!(channel.performance_level_get(3), Err(ScmiError::Protocol(ScmiStatus::NotFound)));
}

#[test]
fn test_power_domain_management() {
    let (mut harness, scp) = scp_harness();
    let channel = &mut harness.channel;

    assert_eq!(channel.power_domain_attributes(1).map(|attributes| attributes.name).as_deref(), Ok("display"));
    assert_eq!(channel.power_state_get(1), Ok(POWER_STATE_OFF));

    channel.power_state_set(1, POWER_STATE_ON).unwrap();
    assert_eq!(scp.power_state(1), POWER_STATE_ON);
    assert_eq!(channel.power_state_get(1), Ok(POWER_STATE_ON));

    assert_eq!(channel.power_state_set(7, POWER_STATE_ON), Err(ScmiError::Protocol(ScmiStatus::NotFound)));
}

#[test]
fn test_clients_through_trait_object() {
    let (mut harness, _scp) = scp_harness();
    let executor: &mut dyn ScmiCommandExecutor = &mut harness.channel;

    assert_eq!(executor.clock_rate_get(1), Ok(SCP_CLOCK1_RANGE[0]));
    assert_eq!(executor.power_state_get(0), Ok(POWER_STATE_ON));
}

#[test]
fn test_unanswered_protocol_command_times_out() {
    let mut harness = TestHarness::new(scripted(|_, _, _| Reply::Ignore));

    assert_eq!(harness.channel.discover_vendor(), Err(ScmiError::Timeout));
    assert_eq!(harness.channel.discover_vendor(), Err(ScmiError::ChannelBusy));
}
