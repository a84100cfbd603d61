//! Test Harness
//!
//! Wires a real [`ScmiChannel`] to the shared memory fake, the scripted agent, and a counting stall.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use patina_scmi::channel::ScmiChannel;
use patina_scmi::config::ScmiTransportConfiguration;
use patina_scmi::mailbox::ScmiMailbox;
use patina_scmi::transport::ScmiTransport;

use super::constants::{init_logging, test_config};
use super::fake_agent::{CountingStall, FakeAgent, Responder};
use super::shared_memory::SharedMemory;

pub struct TestHarness {
    pub channel: ScmiChannel,
    pub memory: SharedMemory,
    pub agent: FakeAgent,
    pub stall: CountingStall,
}

impl TestHarness {
    /// Creates a harness using [`test_config`].
    pub fn new(responder: impl Responder + 'static) -> Self {
        Self::with_config(test_config(), responder)
    }

    pub fn with_config(config: ScmiTransportConfiguration, responder: impl Responder + 'static) -> Self {
        init_logging();

        let memory = SharedMemory::new(config.mailbox_base, config.mailbox_size);
        let agent = FakeAgent::new(memory.clone(), responder);
        let stall = CountingStall::new(memory.clone());

        let mailbox = ScmiMailbox::from_config(&config, Box::new(memory.clone())).expect("valid test mailbox");
        let transport = ScmiTransport::new(config, Box::new(agent.clone()), Box::new(stall.clone()));

        Self { channel: ScmiChannel::new(transport, mailbox), memory, agent, stall }
    }
}
