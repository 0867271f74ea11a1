use log::LevelFilter;

/// Env var holding an `env_logger` filter, e.g. `ASTRAEA_LOG=debug`.
pub const LOG_ENV: &str = "ASTRAEA_LOG";

/// Stderr logger. `--quiet` and `--verbose` override the env filter.
pub fn init(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV, "warn"));
    if quiet {
        builder.filter_level(LevelFilter::Error);
    } else if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.target(env_logger::Target::Stderr).try_init();
}
