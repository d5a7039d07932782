//! lawkb CLI 入口

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // 日志初始化
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // 执行 CLI
    let cli = lawkb::cli::Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(lawkb::cli::run(cli))
}
