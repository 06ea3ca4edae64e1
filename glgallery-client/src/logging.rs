//! Logger setup.

use log::LevelFilter;

/// The level to log at: `RUST_LOG` if it holds a valid level, otherwise `configured`.
pub fn effective_level(configured: LevelFilter, env: Option<&str>) -> LevelFilter {
    env.and_then(|value| value.trim().parse().ok())
        .unwrap_or(configured)
}

/// Installs the global logger, writing timestamped lines to stdout. Until [`set_level`] is
/// called the level comes from `RUST_LOG`, defaulting to `info`.
pub fn init() -> Result<(), String> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Trace)
        .chain(std::io::stdout())
        .apply()
        .map_err(|e| e.to_string())?;
    set_level(LevelFilter::Info);
    Ok(())
}

/// Applies the configured level, still letting `RUST_LOG` override it.
pub fn set_level(configured: LevelFilter) {
    log::set_max_level(effective_level(
        configured,
        std::env::var("RUST_LOG").ok().as_deref(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_only_when_valid() {
        assert_eq!(
            effective_level(LevelFilter::Info, Some("debug")),
            LevelFilter::Debug
        );
        assert_eq!(
            effective_level(LevelFilter::Warn, Some("TRACE ")),
            LevelFilter::Trace
        );
        assert_eq!(
            effective_level(LevelFilter::Info, Some("loud")),
            LevelFilter::Info
        );
        assert_eq!(effective_level(LevelFilter::Error, None), LevelFilter::Error);
    }
}
