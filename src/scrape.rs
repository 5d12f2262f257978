//! Rendering a registry into the text exposition format.

use prometheus::{Encoder, Registry, TextEncoder};
use std::io::{self, Write};

/// Renders the current state of a registry into a byte sink.
///
/// Implementations must be safe to call concurrently: every scrape renders
/// independently into its own sink.
pub trait ScrapeHandler: Send + Sync {
    /// Writes one collection pass of `registry` to `sink`.
    fn render(&self, registry: &Registry, sink: &mut dyn Write) -> io::Result<()>;
}

/// Default handler using the Prometheus text encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextScrapeHandler;

impl ScrapeHandler for TextScrapeHandler {
    fn render(&self, registry: &Registry, mut sink: &mut dyn Write) -> io::Result<()> {
        let metric_families = registry.gather();
        TextEncoder::new()
            .encode(&metric_families, &mut sink)
            .map_err(|e| match e {
                prometheus::Error::Io(e) => e,
                other => io::Error::other(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{IntCounter, Opts};

    #[test]
    fn test_render_counter() {
        let registry = Registry::new();
        let counter = IntCounter::new("test_counter", "help").unwrap();
        registry.register(Box::new(counter.clone())).unwrap();
        counter.inc();

        let mut buffer = Vec::new();
        TextScrapeHandler.render(&registry, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("# TYPE test_counter counter"));
        assert!(output.contains("test_counter 1"));
    }

    #[test]
    fn test_render_empty_registry() {
        let mut buffer = Vec::new();
        TextScrapeHandler.render(&Registry::new(), &mut buffer).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_render_non_ascii_help() {
        let registry = Registry::new();
        let counter = IntCounter::with_opts(Opts::new("test_counter_rus", "русский хелп")).unwrap();
        registry.register(Box::new(counter)).unwrap();

        let mut buffer = Vec::new();
        TextScrapeHandler.render(&registry, &mut buffer).unwrap();
        assert!(String::from_utf8(buffer).unwrap().contains("русский хелп"));
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "client gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_error_propagates() {
        let registry = Registry::new();
        let counter = IntCounter::new("test_counter", "help").unwrap();
        registry.register(Box::new(counter)).unwrap();

        let err = TextScrapeHandler
            .render(&registry, &mut FailingSink)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
