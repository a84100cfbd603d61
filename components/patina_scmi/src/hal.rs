//! SCMI Hardware Access
//!
//! The capabilities the SCMI transport needs from the platform: volatile access to the shared mailbox, a doorbell to
//! signal the remote agent, and a stall to wait between status polls. The transport only depends on these traits so
//! it can be exercised without real hardware.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use r_efi::efi;

#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

/// Volatile Memory Access
///
/// Reads and writes 32-bit little-endian words at physical addresses. Accesses are never elided, merged, or reordered
/// with respect to each other by the implementation.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait VolatileMemory {
    /// Reads the word at `address`.
    fn read32(&self, address: efi::PhysicalAddress) -> u32;

    /// Writes `value` to the word at `address`.
    fn write32(&self, address: efi::PhysicalAddress, value: u32);

    /// Orders all memory accesses issued before the call against all accesses issued after it, as observed by
    /// other agents sharing the memory.
    fn barrier(&self);
}

/// Remote Agent Doorbell
///
/// Notifies the remote agent that a request is waiting in the mailbox. There is no acknowledgement.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait Doorbell {
    /// Rings the doorbell register at `address`.
    fn notify(&self, address: efi::PhysicalAddress);
}

/// Busy Wait
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait Stall {
    /// Blocks the caller for at least `micros` microseconds.
    fn stall(&self, micros: u64);
}

/// Issues a full system data memory barrier.
pub fn data_memory_barrier() {
    cfg_if::cfg_if! {
        if #[cfg(all(not(test), target_arch = "aarch64"))] {
            // SAFETY: `dmb sy` only orders memory accesses and has no other architectural effect.
            unsafe { core::arch::asm!("dmb sy", options(nostack, preserves_flags)) };
        } else {
            core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
        }
    }
}

/// Memory mapped I/O accessor.
///
/// The production [`VolatileMemory`] implementation.
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Creates a new MMIO accessor.
    ///
    /// ## Safety
    ///
    /// - Every address passed to this accessor must be mapped, 4-byte aligned, and valid for volatile access.
    /// - No other code may hold a Rust reference to the memory behind those addresses.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl VolatileMemory for Mmio {
    fn read32(&self, address: efi::PhysicalAddress) -> u32 {
        // SAFETY: The creator of `Mmio` guarantees the address is mapped and aligned.
        u32::from_le(unsafe { core::ptr::read_volatile(address as usize as *const u32) })
    }

    fn write32(&self, address: efi::PhysicalAddress, value: u32) {
        // SAFETY: The creator of `Mmio` guarantees the address is mapped and aligned.
        unsafe { core::ptr::write_volatile(address as usize as *mut u32, value.to_le()) }
    }

    fn barrier(&self) {
        data_memory_barrier();
    }
}

/// A doorbell signalled by writing a fixed value to a memory mapped register.
#[derive(Debug)]
pub struct MmioDoorbell<M: VolatileMemory> {
    memory: M,
    value: u32,
}

impl<M: VolatileMemory> MmioDoorbell<M> {
    /// Creates a doorbell that writes `value` through `memory` each time it is rung.
    pub fn new(memory: M, value: u32) -> Self {
        Self { memory, value }
    }
}

impl<M: VolatileMemory> Doorbell for MmioDoorbell<M> {
    fn notify(&self, address: efi::PhysicalAddress) {
        log::trace!(target: "scmi", "Ringing doorbell: address={:#X}, value={:#X}", address, self.value);
        self.memory.write32(address, self.value);
    }
}

/// Iterations of `spin_loop` treated as one microsecond where no architectural counter is available.
#[cfg(not(all(not(test), target_arch = "aarch64")))]
const SPINS_PER_MICROSECOND: u64 = 100;

/// A stall backed by the AArch64 generic timer.
///
/// Other architectures fall back to a calibrated spin loop.
#[derive(Debug, Default)]
pub struct GenericTimerStall;

#[cfg(all(not(test), target_arch = "aarch64"))]
macro_rules! read_sysreg {
    ($name:literal) => {{
        let value: u64;
        // SAFETY: Reading the generic timer registers has no side effects.
        unsafe {
            core::arch::asm!(concat!("mrs {value:x}, ", $name), value = out(reg) value, options(nomem, nostack));
        }
        value
    }};
}

impl Stall for GenericTimerStall {
    fn stall(&self, micros: u64) {
        cfg_if::cfg_if! {
            if #[cfg(all(not(test), target_arch = "aarch64"))] {
                let frequency = read_sysreg!("cntfrq_el0");
                let ticks = frequency.saturating_mul(micros) / 1_000_000;
                let start = read_sysreg!("cntpct_el0");
                while read_sysreg!("cntpct_el0").wrapping_sub(start) < ticks {
                    core::hint::spin_loop();
                }
            } else {
                for _ in 0..micros.saturating_mul(SPINS_PER_MICROSECOND) {
                    core::hint::spin_loop();
                }
            }
        }
    }
}
