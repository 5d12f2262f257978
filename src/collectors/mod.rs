//! Built-in on-demand collectors.
//!
//! # Metrics Exposed
//!
//! ## Process (Linux only)
//! - `process_cpu_seconds_total` - Total user and system CPU time
//! - `process_resident_memory_bytes` - Resident memory size
//! - `process_virtual_memory_bytes` - Virtual memory size
//! - `process_open_fds` / `process_max_fds` - File descriptor usage
//! - `process_start_time_seconds` - Start time since the unix epoch
//! - `process_threads` - Number of OS threads
//!
//! ## Runtime
//! - `tokio_runtime_workers` - Async runtime worker threads
//! - `tokio_runtime_alive_tasks` - Tasks alive in the async runtime
//! - `metric_server_build_info` - Crate version, value 1
//!
//! Every name gets `<prefix>_` prepended when a metric prefix is configured.

mod runtime;

pub use runtime::RuntimeCollector;

use prometheus::core::Collector;
use prometheus::Registry;

/// Registers the default collectors into `registry`.
///
/// The registry deduplicates: collectors already present (same names and
/// labels) are left in place, so calling this repeatedly on one registry
/// never doubles a metric family. Returns how many collectors were newly
/// registered.
pub fn register_default_collectors(
    registry: &Registry,
    prefix: &str,
) -> Result<usize, prometheus::Error> {
    let mut registered = 0;
    for collector in default_collectors(prefix)? {
        match registry.register(collector) {
            Ok(()) => registered += 1,
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(e),
        }
    }

    tracing::debug!(
        prefix,
        registered,
        "Default collectors registered"
    );
    Ok(registered)
}

fn default_collectors(prefix: &str) -> Result<Vec<Box<dyn Collector>>, prometheus::Error> {
    let mut collectors: Vec<Box<dyn Collector>> = Vec::with_capacity(2);

    #[cfg(target_os = "linux")]
    collectors.push(Box::new(
        prometheus::process_collector::ProcessCollector::new(std::process::id() as i32, prefix),
    ));

    collectors.push(Box::new(RuntimeCollector::new(prefix)?));
    Ok(collectors)
}
