// apps/ff_cli/src/main.rs

//! FerroFlow 命令行驱动
//!
//! 读入 JSON 设置文件，驱动边界条件流水线与时间步控制器。
//! 应用层零泛型：配置经 `SolverConfig`，并行与通信取单进程实现
//! （多进程由 MPI 启动器注入对应实现）。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// FerroFlow 求解器命令行工具
#[derive(Parser)]
#[command(name = "ff_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FerroFlow unstructured finite-volume CFD solver", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行计算
    Run(commands::run::RunArgs),
    /// 显示设置摘要
    Info(commands::info::InfoArgs),
    /// 验证设置文件
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // FF_LOG_TO_STDOUT 强制日志写标准流（默认也是标准流，
    // 环境变量存在时同时压掉 ANSI 控制符，便于重定向）
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);
    if ff_config::log_to_stdout() {
        tracing::subscriber::set_global_default(builder.with_ansi(false).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
