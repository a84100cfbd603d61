//! Shared Memory Fake
//!
//! An in-memory mailbox region shared between the agent under test and the scripted remote agent. Every access the
//! agent makes through [`VolatileMemory`] is recorded so tests can assert on ordering.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use std::cell::RefCell;
use std::rc::Rc;

use patina_scmi::hal::VolatileMemory;
use patina_scmi::mailbox::CHANNEL_STATUS_OFFSET;

/// An observable step taken by the agent under test.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MemoryEvent {
    /// Word read at an offset into the region.
    Read(usize),
    /// Word written at an offset into the region.
    Write(usize, u32),
    Barrier,
    Doorbell,
    Stall(u64),
}

struct SharedMemoryState {
    base: u64,
    words: Vec<u32>,
    events: Vec<MemoryEvent>,
    /// Status reads left before the remote agent sets the free bit.
    release_after_status_reads: Option<u32>,
}

/// The simulated mailbox region.
#[derive(Clone)]
pub struct SharedMemory {
    state: Rc<RefCell<SharedMemoryState>>,
}

impl SharedMemory {
    /// Creates a zeroed region of `size` bytes at `base`.
    pub fn new(base: u64, size: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(SharedMemoryState {
                base,
                words: vec![0; size.div_ceil(4)],
                events: Vec::new(),
                release_after_status_reads: None,
            })),
        }
    }

    /// Reads a word without recording it.
    pub fn word(&self, offset: usize) -> u32 {
        self.state.borrow().words[offset / 4]
    }

    /// Writes a word without recording it.
    pub fn set_word(&self, offset: usize, value: u32) {
        self.state.borrow_mut().words[offset / 4] = value;
    }

    /// Sets the free bit once `reads` more status reads have happened. The read that exhausts the count observes
    /// the free bit.
    pub fn release_after_status_reads(&self, reads: u32) {
        if reads == 0 {
            self.set_word(CHANNEL_STATUS_OFFSET, self.word(CHANNEL_STATUS_OFFSET) | 1);
        } else {
            self.state.borrow_mut().release_after_status_reads = Some(reads);
        }
    }

    /// Records a step taken outside the region, such as ringing the doorbell.
    pub fn record(&self, event: MemoryEvent) {
        self.state.borrow_mut().events.push(event);
    }

    /// Returns every recorded step, oldest first.
    pub fn events(&self) -> Vec<MemoryEvent> {
        self.state.borrow().events.clone()
    }

    /// Forgets every recorded step.
    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    /// Returns the number of channel status reads made by the agent.
    pub fn status_reads(&self) -> usize {
        self.events().iter().filter(|event| **event == MemoryEvent::Read(CHANNEL_STATUS_OFFSET)).count()
    }

    fn offset(&self, address: u64) -> usize {
        let base = self.state.borrow().base;
        assert!(address >= base, "access below the mailbox: {address:#X}");
        (address - base) as usize
    }
}

impl VolatileMemory for SharedMemory {
    fn read32(&self, address: u64) -> u32 {
        let offset = self.offset(address);
        let mut state = self.state.borrow_mut();
        state.events.push(MemoryEvent::Read(offset));

        if offset == CHANNEL_STATUS_OFFSET {
            if let Some(reads) = state.release_after_status_reads {
                if reads <= 1 {
                    state.words[offset / 4] |= 1;
                    state.release_after_status_reads = None;
                } else {
                    state.release_after_status_reads = Some(reads - 1);
                }
            }
        }

        state.words[offset / 4]
    }

    fn write32(&self, address: u64, value: u32) {
        let offset = self.offset(address);
        let mut state = self.state.borrow_mut();
        state.events.push(MemoryEvent::Write(offset, value));
        state.words[offset / 4] = value;
    }

    fn barrier(&self) {
        self.record(MemoryEvent::Barrier);
    }
}
