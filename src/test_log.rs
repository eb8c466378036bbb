use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

thread_local! {
    static WARNINGS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Keeps warnings and errors per thread, so parallel tests never see each
/// other's messages.
struct CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            WARNINGS.with(|warnings| warnings.borrow_mut().push(record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;
static INSTALL: Once = Once::new();

/// Installs the capturing logger and forgets anything captured so far on this
/// thread.
pub fn capture_warnings() {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Warn);
        }
    });
    WARNINGS.with(|warnings| warnings.borrow_mut().clear());
}

/// Warnings and errors logged on this thread since the last call.
pub fn take_warnings() -> Vec<String> {
    WARNINGS.with(|warnings| warnings.borrow_mut().drain(..).collect())
}
