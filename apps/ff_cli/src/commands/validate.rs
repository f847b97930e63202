// apps/ff_cli/src/commands/validate.rs

//! 设置文件验证命令
//!
//! 读入并做组合一致性检查；严格模式下警告也视为失败。

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{error, info, warn};

use ff_config::{SolverConfig, TimeStepMode};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 设置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== FerroFlow 设置验证 ===");

    let config = match SolverConfig::from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            bail!("设置文件无效: {}", args.config.display());
        }
    };

    let mut warnings = 0usize;

    if config.time_step_mode == TimeStepMode::Constant && config.time_step.varrdt != 0.1 {
        warn!("常数时间步下 varrdt 不生效");
        warnings += 1;
    }
    if config.time_step.coumax <= 0.0 && config.time_step_mode.is_variable() {
        warn!("变时间步但 Courant 限制关闭（coumax ≤ 0）");
        warnings += 1;
    }
    if config.models.radiative_transfer && config.turbulence.is_les() {
        warn!("LES 与辐射传热联用尚未充分验证");
        warnings += 1;
    }

    if warnings > 0 {
        warn!("验证通过，{warnings} 条警告");
        if args.strict {
            bail!("严格模式: 警告视为失败");
        }
    } else {
        info!("验证通过");
    }
    Ok(())
}
