//! `log` 门面的浏览器控制台后端。

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;

static LOGGER: ConsoleLogger = ConsoleLogger;
static INITIALIZED: OnceCell<()> = OnceCell::new();

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        let value = wasm_bindgen::JsValue::from(line);
        match record.level() {
            Level::Error => web_sys::console::error_1(&value),
            Level::Warn => web_sys::console::warn_1(&value),
            Level::Info => web_sys::console::info_1(&value),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
        }
    }

    fn flush(&self) {}
}

/// Installs the console logger once; later calls only adjust the level.
pub fn init(level: LevelFilter) {
    INITIALIZED.get_or_init(|| {
        log::set_logger(&LOGGER).ok();
    });
    log::set_max_level(level);
}

pub fn parse_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|value| value.parse().ok())
        .unwrap_or(LevelFilter::Info)
}
