use cmb_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn second_install_reports_subscriber_error() {
    let _logger = Logger::builder()
        .name("reader-init-twice")
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");

    let err = Logger::builder()
        .name("reader-init-twice-second")
        .level(LevelFilter::WARN)
        .init()
        .expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }), "got {err}");
}
