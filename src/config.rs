use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "PLANPILOT_DATA_DIR";

/// Data directory used when neither the flag nor the env var is set.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Resolve the data directory.
///
/// An explicit `--data-dir` wins, then `PLANPILOT_DATA_DIR`, then `./data`.
/// An empty env var counts as unset.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| {
        std::env::var(DATA_DIR_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Install the stderr log subscriber, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-var tests must not run concurrently.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn resolve_data_dir_precedence() {
        let _guard = ENV_LOCK.lock().unwrap();

        unsafe { std::env::set_var(DATA_DIR_ENV, "/srv/planpilot") };
        assert_eq!(
            resolve_data_dir(Some(PathBuf::from("/tmp/flag"))),
            PathBuf::from("/tmp/flag")
        );
        assert_eq!(resolve_data_dir(None), PathBuf::from("/srv/planpilot"));

        unsafe { std::env::set_var(DATA_DIR_ENV, "") };
        assert_eq!(resolve_data_dir(None), PathBuf::from(DEFAULT_DATA_DIR));

        unsafe { std::env::remove_var(DATA_DIR_ENV) };
        assert_eq!(resolve_data_dir(None), PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn init_tracing_twice_is_harmless() {
        init_tracing();
        init_tracing();
    }
}
