use std::{fs::File, path::Path, sync::Mutex};
use tracing_subscriber::EnvFilter;
use wrap_context::{arg_context, raw_context, wohyna};

pub const DEFAULT_FILTER: &str = "info";

/// The terminal belongs to the UI, so log records go to a file.
/// `RUST_LOG` overrides the default filter.
pub fn init(path: &Path) -> anyhow::Result<()> {
    let file = arg_context!(File::create(path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    raw_context!(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| wohyna!("Logger already initialized: {}", err)))?;

    anyhow::Ok(())
}
