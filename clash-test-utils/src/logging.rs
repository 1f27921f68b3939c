use std::sync::Once;

use tracing_subscriber::filter::LevelFilter;

static INIT: Once = Once::new();

/// Routes engine logs to the test output.
///
/// Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(LevelFilter::DEBUG)
            .with_file(true)
            .with_line_number(true)
            .with_test_writer()
            .init();
    });
}
