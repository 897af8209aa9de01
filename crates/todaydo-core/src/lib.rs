pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod settings;
pub mod store;

pub use app::App;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, EndpointsConfig, HttpConfig, LocationConfig, ValidationResult};
pub use error::{AppError, NetworkError, ReqwestErrorExt, StoreError};
pub use settings::{Language, Settings, SettingsPatch, SettingsStore};
pub use store::{FileBackend, KvBackend, KvStore, MemoryBackend};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Today Do core initialized");
    Ok(())
}
