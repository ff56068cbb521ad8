use cmb_logger::{LevelFilter, Logger};

#[test]
fn console_only_logger_has_no_file_sink() {
    let logger = Logger::builder()
        .name("reader-console-only")
        .level(LevelFilter::INFO)
        .bridge_level(LevelFilter::DEBUG)
        .init()
        .expect("logger should initialize");

    assert!(!logger.has_file_sink());
}
