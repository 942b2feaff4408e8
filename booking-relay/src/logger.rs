//! Logging setup
//!
//! Console output (text or JSON) plus, when a log directory is configured,
//! two daily rotated JSON streams:
//! - `app/`: everything except the `security` target
//! - `security/`: authentication failures recorded through `security_log!`

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_logger(level: &str, format: LogFormat, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layers = match log_dir {
        Some(dir) => Some(file_layers(Path::new(dir))?),
        None => None,
    };

    let console_layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed(),
        LogFormat::Text => fmt::layer().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(file_layers)
        .with(env_filter)
        .with(console_layer)
        .try_init()?;

    Ok(())
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

fn file_layers(log_dir: &Path) -> anyhow::Result<Vec<BoxedLayer>> {
    let app_dir = log_dir.join("app");
    let security_dir = log_dir.join("security");
    fs::create_dir_all(&app_dir)?;
    fs::create_dir_all(&security_dir)?;

    let app_log = RollingFileAppender::new(Rotation::DAILY, app_dir, "app");
    let app_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::sync::Mutex::new(app_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() != "security"
        }))
        .boxed();

    let security_log = RollingFileAppender::new(Rotation::DAILY, security_dir, "security");
    let security_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::sync::Mutex::new(security_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() == "security"
        }))
        .boxed();

    Ok(vec![app_layer, security_layer])
}
