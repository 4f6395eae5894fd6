//! Subscriber assembly and the JSONL file writer.
//!
//! The file writer appends one line per event and flushes after each write,
//! so `tail -f` on the log file sees events as they happen.

use crate::json_layer::JsonLayer;
use crate::LogConfig;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Append-only file writer shared by all events.
#[derive(Clone)]
pub struct FileLogWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl FileLogWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl io::Write for FileLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let result = guard.write(buf);
        guard.flush()?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

/// MakeWriter implementation for tracing-subscriber
#[derive(Clone)]
pub struct WriterFactory {
    writer: FileLogWriter,
}

impl<'a> MakeWriter<'a> for WriterFactory {
    type Writer = FileLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer.clone()
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Build and install the global subscriber.
pub fn init_subscriber(config: &LogConfig) {
    let mut open_error = None;
    let json_layer = config.log_path.as_ref().and_then(|path| {
        match FileLogWriter::new(path) {
            Ok(writer) => Some(
                JsonLayer::new(config.service_name.clone(), WriterFactory { writer })
                    .with_filter(env_filter(&config.default_level)),
            ),
            Err(e) => {
                open_error = Some((path.clone(), e));
                None
            }
        }
    });

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    let _ = tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init();

    if let Some((path, e)) = open_error {
        tracing::warn!(path = %path.display(), error = %e, "failed to open log file");
    }
}
