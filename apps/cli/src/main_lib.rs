use std::path::Path;

use regression_core::transport::{container_for_path, Container, JsonCodec, RegressionIo};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub type DumpIo = RegressionIo<JsonCodec, Box<dyn Container>>;

pub fn init_tracing() {
    let log_format = std::env::var("REGRESSION_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Pretty JSON over the container the path calls for.
pub fn open_dump(path: &Path) -> anyhow::Result<DumpIo> {
    Ok(RegressionIo::new(JsonCodec::pretty(), container_for_path(path)?))
}
