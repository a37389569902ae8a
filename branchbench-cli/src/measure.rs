//! Timing primitives
//!
//! Wall-clock time comes from `std::time::Instant`. Where the CPU exposes a
//! user-readable tick counter (RDTSC on x86_64, CNTVCT_EL0 on AArch64) ticks
//! are recorded alongside; elsewhere they read as zero.

use std::time::Instant;

#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn read_ticks() -> u64 {
    // SAFETY: RDTSC is unprivileged on every x86_64 CPU.
    unsafe { std::arch::x86_64::_rdtsc() }
}

#[cfg(target_arch = "aarch64")]
#[inline(always)]
fn read_ticks() -> u64 {
    let ticks: u64;
    // SAFETY: CNTVCT_EL0 is readable from EL0 on AArch64.
    unsafe {
        std::arch::asm!("mrs {}, cntvct_el0", out(reg) ticks, options(nostack, nomem));
    }
    ticks
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline(always)]
fn read_ticks() -> u64 {
    0
}

/// Whether tick counts are real on this platform.
pub const HAS_TICK_COUNTER: bool = cfg!(any(target_arch = "x86_64", target_arch = "aarch64"));

/// Running timer; may be read any number of times
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
    ticks_start: u64,
}

impl Timer {
    /// Start timing now
    #[inline(always)]
    pub fn start() -> Self {
        let ticks_start = read_ticks();
        Self {
            start: Instant::now(),
            ticks_start,
        }
    }

    /// Elapsed nanoseconds and ticks since [`Timer::start`]
    #[inline(always)]
    pub fn elapsed(&self) -> (u64, u64) {
        let nanos = self.start.elapsed().as_nanos() as u64;
        let ticks = read_ticks().saturating_sub(self.ticks_start);
        (nanos, ticks)
    }
}

/// Pin the calling thread to `cpu` so every timed call runs on one core.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> std::io::Result<()> {
    // SAFETY: cpu_set_t is plain data; zeroed is the empty set.
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);
        if libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

/// Pinning is only implemented on Linux.
#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu: usize) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "CPU pinning is only supported on Linux",
    ))
}
