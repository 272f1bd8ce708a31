use std::sync::Once;

use crate::{Document, ParseError};

static TRACING: Once = Once::new();

/// Install the env-filtered subscriber once, so `STYX_LOG=trace cargo test`
/// shows lexer/parser traces for a failing case.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_env("STYX_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn doc(source: &str) -> Document {
    init_tracing();
    crate::parse(source).expect("expected a successful parse")
}

pub fn parse_err(source: &str) -> ParseError {
    init_tracing();
    crate::parse(source).expect_err("expected a parse error")
}
