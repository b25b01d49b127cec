//! Logging setup for Tsudoi binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive, e.g. `tsudoi_server=debug,tower_http=debug`.
///
/// Crate names are normalized to their module form (`-` becomes `_`).
pub fn default_directive(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// `targets` lists the crates (and binary) whose events are enabled at
/// `default_log_level`. The whole filter can be overridden with `RUST_LOG`.
///
/// # Examples
///
/// ```no_run
/// use tsudoi_shared::logger::setup_logger;
///
/// setup_logger(&["tsudoi-server", "tower_http"], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_normalizes_crate_names() {
        // テスト項目: クレート名のハイフンがアンダースコアに変換される
        // given (前提条件):
        let targets = ["tsudoi-server", "tower_http"];

        // when (操作):
        let directive = default_directive(&targets, "info");

        // then (期待する結果):
        assert_eq!(directive, "tsudoi_server=info,tower_http=info");
    }

    #[test]
    fn test_default_directive_with_no_targets() {
        // テスト項目: 対象が空の場合は空文字列になる
        // given (前提条件):
        let targets: [&str; 0] = [];

        // when (操作):
        let directive = default_directive(&targets, "debug");

        // then (期待する結果):
        assert!(directive.is_empty());
    }
}
