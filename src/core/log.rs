use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, fmt::MakeWriter, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber. Log lines go to stderr so command output
/// on stdout stays clean.
pub fn init_logging(verbose: bool) {
    subscriber(verbose, std::io::stderr).init();
}

fn subscriber<W>(verbose: bool, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::INFO, "info")
    };
    let app_filter = Targets::new()
        .with_target("karat", level_filter)
        .with_target("tower_http", level_filter);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_writer(writer))
        .with(app_filter)
        .with(env_filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLines(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLines {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLines {
        type Writer = CapturedLines;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl CapturedLines {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    #[test]
    fn test_logs_go_to_configured_writer_only() {
        let captured = CapturedLines::default();

        tracing::subscriber::with_default(subscriber(false, captured.clone()), || {
            tracing::info!("refresh finished");
            tracing::debug!("raw feed payload");
        });

        let text = captured.text();
        assert!(text.contains("refresh finished"));
        assert!(!text.contains("raw feed payload"));
    }

    #[test]
    fn test_verbose_includes_debug() {
        let captured = CapturedLines::default();

        tracing::subscriber::with_default(subscriber(true, captured.clone()), || {
            tracing::debug!("raw feed payload");
        });

        if std::env::var_os("RUST_LOG").is_none() {
            assert!(captured.text().contains("raw feed payload"));
        }
    }
}
