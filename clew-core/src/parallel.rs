//! Rayon thread-pool configuration

use anyhow::Result;

/// Configure the global thread pool. A count of 0 uses all available cores.
///
/// Must be called at most once, before any parallel work is dispatched;
/// later calls fail because the global pool is already built.
pub fn configure_thread_pool(threads: usize) -> Result<()> {
    let threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;

    Ok(())
}

/// Number of compute units bucket tasks will be spread across.
pub fn available_workers() -> usize {
    rayon::current_num_threads()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_workers_nonzero() {
        assert!(available_workers() > 0);
    }

    #[test]
    fn test_configure_thread_pool_auto() {
        // May fail if another test already built the global pool; both
        // outcomes leave a usable pool behind.
        let _ = configure_thread_pool(0);
        assert!(rayon::current_num_threads() > 0);
    }
}
