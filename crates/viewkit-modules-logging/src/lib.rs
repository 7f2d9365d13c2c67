use env_logger::{Builder, Env};

/// Install env_logger as the `log` backend.
///
/// `RUST_LOG` wins over `default_filter`. Returns `false` if a logger was
/// already installed.
pub fn init(default_filter: &str) -> bool {
    let ok = Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .format_target(true)
        .try_init()
        .is_ok();

    if ok {
        log::debug!(target: "viewkit::logging", "logger.init filter='{}'", default_filter);
    }
    ok
}
