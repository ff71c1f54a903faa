// ABOUTME: Shared logging setup for jpom binaries
// ABOUTME: init_for() logs to stderr with chosen crates at a level, RUST_LOG replacing the defaults

use tracing_subscriber::EnvFilter;

/// Crate-filtered logging to stderr. Default: `level` for each named crate, WARN for
/// everything else (reqwest and hyper are chatty at debug). A valid RUST_LOG
/// replaces these defaults entirely.
pub fn init_for(crates: &[&str], level: tracing::Level) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(build_filter(env.as_deref(), crates, level))
        .init();
}

fn default_directives(crates: &[&str], level: tracing::Level) -> String {
    let level = level.as_str().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(crates.iter().map(|c| format!("{c}={level}")));
    directives.join(",")
}

fn build_filter(env: Option<&str>, crates: &[&str], level: tracing::Level) -> EnvFilter {
    env.filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives(crates, level)))
}
