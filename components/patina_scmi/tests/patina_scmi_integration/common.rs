//! Common Test Infrastructure for Patina SCMI Integration Tests
//!
//! This module provides the shared memory fake, the scripted remote agent, and the simulated SCP used across all
//! SCMI integration tests.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

pub mod constants;
pub mod harness;
pub mod shared_memory;

// Re-export commonly used items for test infrastructure
pub use {constants::*, fake_agent::*, harness::*, shared_memory::*, simulated_scp::*};
