//! Logger installation for binaries built on `ferrous_app`.

use std::str::FromStr;

use anyhow::Context;
use log::LevelFilter;

/// Parses a level name such as `"info"` or `"trace"`.
pub fn parse_level(name: &str) -> anyhow::Result<LevelFilter> {
    LevelFilter::from_str(name).with_context(|| format!("unknown log level `{name}`"))
}

/// Installs a stdout `fern` dispatcher as the global logger.
///
/// Lines look like `[   1.204s INFO  ferrous_instancing::renderer] message`,
/// with the time measured from installation. Fails if a logger is already set.
pub fn init_logger(level: LevelFilter) -> anyhow::Result<()> {
    let start = std::time::Instant::now();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:>8.3}s {:<5} {}] {}",
                start.elapsed().as_secs_f32(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
        .context("a global logger is already installed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("OFF").unwrap(), LevelFilter::Off);
        assert!(parse_level("loud").is_err());
    }
}
