//! Constants shared by the SCMI integration tests.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use std::sync::Once;

use patina_scmi::config::ScmiTransportConfiguration;

/// Base of the simulated mailbox region.
pub const TEST_MAILBOX_BASE: u64 = 0x4540_0000;

/// Size of the simulated mailbox region. Holds 25 payload words.
pub const TEST_MAILBOX_SIZE: usize = 0x80;

/// Address the scripted agent expects the doorbell to be rung at.
pub const TEST_DOORBELL_ADDRESS: u64 = 0x2A4C_0020;

/// Poll interval used by the tests, in microseconds.
pub const TEST_POLL_INTERVAL_US: u64 = 10;

/// Poll budget used by the tests.
pub const TEST_POLL_MAX_ITERATIONS: u32 = 8;

/// SCMI `SUCCESS` status word.
pub const STATUS_SUCCESS: u32 = 0;

/// Returns the transport configuration used by most tests.
pub fn test_config() -> ScmiTransportConfiguration {
    ScmiTransportConfiguration {
        mailbox_base: TEST_MAILBOX_BASE,
        mailbox_size: TEST_MAILBOX_SIZE,
        doorbell_address: TEST_DOORBELL_ADDRESS,
        poll_interval_us: TEST_POLL_INTERVAL_US,
        poll_max_iterations: TEST_POLL_MAX_ITERATIONS,
        ..Default::default()
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` once per test binary.
pub fn init_logging() {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();

        // Silent unless RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            builder.filter_level(log::LevelFilter::Off);
        }

        builder.is_test(true).init();
    });
}
