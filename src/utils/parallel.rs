use tracing::debug;

/// Thread count for batch pricing.
///
/// Pricing is pure CPU work, so physical cores are used unless
/// `TIERCALC_THREADS` (or `RAYON_NUM_THREADS`) says otherwise.
pub fn optimal_threads() -> usize {
    for var in ["TIERCALC_THREADS", "RAYON_NUM_THREADS"] {
        if let Ok(num) = std::env::var(var) {
            if let Ok(n) = num.trim().parse::<usize>() {
                if n > 0 {
                    debug!("Using {}={}", var, n);
                    return n;
                }
            }
        }
    }

    let physical_cores = num_cpus::get_physical();
    let logical_cores = num_cpus::get();
    let threads = physical_cores.clamp(1, 16);

    debug!(
        physical_cores,
        logical_cores,
        threads,
        "Thread pool configuration"
    );

    threads
}

/// Configure the global rayon pool once; later calls are ignored
pub fn configure_thread_pool() {
    rayon::ThreadPoolBuilder::new()
        .num_threads(optimal_threads())
        .build_global()
        .ok(); // Ignore if already configured
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_threads_is_bounded() {
        let threads = optimal_threads();
        assert!(threads >= 1);
    }

    #[test]
    fn test_configure_thread_pool_twice() {
        configure_thread_pool();
        configure_thread_pool();
        assert!(rayon::current_num_threads() >= 1);
    }
}
