//! Async runtime and build information collector.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{IntGauge, IntGaugeVec, Opts};

const METRICS_NUMBER: usize = 3;

/// On-demand collector reporting tokio runtime statistics.
///
/// Values are read from the runtime the scrape is served on; outside a
/// runtime only the build info family is reported.
pub struct RuntimeCollector {
    descs: Vec<Desc>,
    workers: IntGauge,
    alive_tasks: IntGauge,
    build_info: IntGaugeVec,
}

impl RuntimeCollector {
    /// Creates a collector whose metric names carry the given prefix.
    pub fn new(prefix: &str) -> prometheus::Result<Self> {
        let workers = IntGauge::with_opts(
            Opts::new(
                "tokio_runtime_workers",
                "Number of worker threads used by the async runtime.",
            )
            .namespace(prefix),
        )?;
        let alive_tasks = IntGauge::with_opts(
            Opts::new(
                "tokio_runtime_alive_tasks",
                "Number of tasks currently alive in the async runtime.",
            )
            .namespace(prefix),
        )?;
        let build_info = IntGaugeVec::new(
            Opts::new(
                "metric_server_build_info",
                "Build information of the metric server, value is always 1.",
            )
            .namespace(prefix),
            &["version"],
        )?;
        build_info.with_label_values(&[crate::VERSION]).set(1);

        let mut descs = Vec::with_capacity(METRICS_NUMBER);
        descs.extend(workers.desc().into_iter().cloned());
        descs.extend(alive_tasks.desc().into_iter().cloned());
        descs.extend(build_info.desc().into_iter().cloned());

        Ok(Self {
            descs,
            workers,
            alive_tasks,
            build_info,
        })
    }
}

impl Collector for RuntimeCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut mfs = Vec::with_capacity(METRICS_NUMBER);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let metrics = handle.metrics();
            self.workers.set(metrics.num_workers() as i64);
            self.alive_tasks.set(metrics.num_alive_tasks() as i64);
            mfs.extend(self.workers.collect());
            mfs.extend(self.alive_tasks.collect());
        }
        mfs.extend(self.build_info.collect());

        mfs
    }
}
