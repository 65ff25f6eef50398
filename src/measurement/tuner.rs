//! Best-effort process tuning.
//!
//! Context switches and core migration are the dominant noise sources in
//! the timed window. Pinning to one core and raising the scheduling class
//! reduces both. This is a noise-reduction aid, not a correctness
//! requirement: every call may silently fail without permission or on
//! platforms without these knobs.

/// Pin the process to CPU 0 and request SCHED_FIFO priority 99.
///
/// Errors are deliberately ignored; an unprivileged run simply measures
/// with more jitter.
pub fn prioritize_process() {
    #[cfg(target_os = "linux")]
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(0, &mut set);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set);

        let param = libc::sched_param { sched_priority: 99 };
        libc::sched_setscheduler(0, libc::SCHED_FIFO, &param);
    }
}
