use std::fs::File;

use log::{info, warn};
use simplelog::{ConfigBuilder, WriteLogger};

use crate::settings::{self, Settings};
use crate::ui::{StatusEvent, StatusLevel};

/// Settings from the user's config file, `LUMEN_URL` and the first CLI
/// argument, in increasing precedence. A broken config file falls back to
/// defaults and is reported as a status message.
pub fn load_settings() -> (Settings, Option<StatusEvent>) {
    let cli_url = std::env::args().nth(1);
    let (base, problem) = match Settings::load() {
        Ok(s) => (s, None),
        Err(e) => (
            Settings::default(),
            Some(StatusEvent { level: StatusLevel::Warn, message: format!("Using default settings: {}", e) }),
        ),
    };
    (base.with_env().with_base_url(cli_url), problem)
}

/// Log to `<config_dir>/lumen/lumen.log`; the terminal belongs to the UI.
pub fn init_logging(settings: &Settings) {
    let Some(dir) = settings::config_dir() else { return };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let path = dir.join("lumen.log");
    let Ok(file) = File::create(&path) else { return };
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if WriteLogger::init(settings.level_filter(), config, file).is_ok() {
        info!("lumen starting, backend {}", settings.base_url);
    } else {
        warn!("logger already initialised");
    }
}
