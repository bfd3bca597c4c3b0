use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` names one.
///
/// Uniforge itself logs layout compiles at debug and uploads at trace, so
/// info keeps the output to device selection. The wgpu internals stay at warn.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` uses `env_logger` directives, for example
/// `"uniforge_layout=trace"` to see every serialized block.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// Picks the directives to install: explicit config, then `RUST_LOG`, then
/// [`DEFAULT_FILTER`].
fn resolve_filter(config: Option<String>, env: Option<String>) -> String {
    config
        .or(env)
        .unwrap_or_else(|| DEFAULT_FILTER.to_owned())
}

static INIT: Once = Once::new();

/// Installs the `env_logger` backend once per process.
///
/// Later calls are no-ops. If a logger is already installed (test harnesses
/// often do this) the existing one is kept.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(config.env_filter, std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        if builder.try_init().is_err() {
            return;
        }
        log::debug!("uniforge logging initialized ({filter})");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins_over_environment() {
        let filter = resolve_filter(Some("uniforge_layout=trace".into()), Some("error".into()));
        assert_eq!(filter, "uniforge_layout=trace");
    }

    #[test]
    fn environment_used_when_config_is_silent() {
        assert_eq!(resolve_filter(None, Some("warn".into())), "warn");
    }

    #[test]
    fn default_quiets_wgpu_internals() {
        let filter = resolve_filter(None, None);
        assert_eq!(filter, DEFAULT_FILTER);
        assert!(filter.contains("wgpu_hal=warn"));
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig {
            env_filter: Some("debug".into()),
            ..Default::default()
        });
        init_logging(LoggingConfig::default());
    }
}
