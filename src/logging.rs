//! ログ初期化
//!
//! 標準出力はプロトコル応答に使うため、ログは標準エラーへ出す。

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` が無ければ `warn`（`--verbose` 時は `debug`）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // 二重初期化（テストなど）は無視
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
