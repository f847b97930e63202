// apps/ff_cli/src/commands/info.rs

//! 显示设置摘要命令

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use ff_config::SolverConfig;

/// 信息参数
#[derive(Args)]
pub struct InfoArgs {
    /// 设置文件路径（缺省显示默认设置）
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => SolverConfig::from_file(path)
            .with_context(|| format!("读入设置文件失败: {}", path.display()))?,
        None => SolverConfig::default(),
    };

    info!("=== FerroFlow 设置摘要 ===");
    info!("时间步模式: {:?}", config.time_step_mode);
    info!(
        "时间步: dtref={:.3e}, 范围=[{:.1e}, {:.1e}], coumax={}, foumax={}, varrdt={}",
        config.time_step.dtref,
        config.time_step.dtmin,
        config.time_step.dtmax,
        config.time_step.coumax,
        config.time_step.foumax,
        config.time_step.varrdt,
    );
    info!("湍流模型: {:?}, 壁面函数: {:?}", config.turbulence, config.wall_function);
    info!(
        "物理模型: 大气={}, 冷却塔={}, 燃烧={:?}, 煤粉={}, 可压缩={}, 辐射={}, VOF={}, 转子/定子={:?}, ALE={:?}",
        config.models.atmospheric,
        config.models.cooling_towers,
        config.models.combustion,
        config.models.pulverised_coal,
        config.models.compressible,
        config.models.radiative_transfer,
        config.models.vof,
        config.models.turbomachinery,
        config.models.ale,
    );
    info!(
        "物性: ρ0={} kg/m³, μ0={} Pa·s, g={:?}",
        config.rho0, config.mu0, config.gravity
    );

    Ok(())
}
