//! # transitionable-cli
//!
//! 无渲染的可过渡节点驱动器：加载节点配置和模拟脚本，
//! 在模拟时钟上推进过渡并打印每个事件时的节点快照。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p transitionable-cli -- run --scene transitionable-cli/scenes/button.json \
//!     --script transitionable-cli/scripts/button.json
//! cargo run -p transitionable-cli -- run --scene transitionable-cli/scenes/panel.json \
//!     --script transitionable-cli/scripts/panel.json --json --log-level debug
//! cargo run -p transitionable-cli -- check transitionable-cli/scenes/button.json
//! ```

mod config;
mod simulation;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Level;
use transitionable::NodeConfig;

use crate::config::SimulationConfig;

#[derive(Parser)]
#[command(name = "transitionable-cli")]
#[command(about = "可过渡节点驱动器 - 在模拟时钟上播放状态过渡")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 日志级别（trace/debug/info/warn/error）
    #[arg(long, default_value = "info", global = true)]
    log_level: Level,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行模拟脚本
    Run {
        /// 节点配置文件
        #[arg(long)]
        scene: PathBuf,

        /// 模拟脚本文件
        #[arg(long)]
        script: PathBuf,

        /// 每帧时长（毫秒），覆盖脚本中的 frame_ms
        #[arg(long)]
        frame_ms: Option<f32>,

        /// 以 JSON Lines 格式输出
        #[arg(long)]
        json: bool,
    },

    /// 检查节点配置文件
    Check {
        /// 配置文件路径
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(cli.command) {
        eprintln!("❌ {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            scene,
            script,
            frame_ms,
            json,
        } => {
            let scene = load_scene(&scene)?;
            let mut sim = SimulationConfig::load(&script)?;
            if let Some(frame_ms) = frame_ms {
                sim.frame_ms = frame_ms;
                sim.validate()?;
            }

            let reports = simulation::run(&scene, &sim)?;
            for report in &reports {
                if json {
                    println!("{}", serde_json::to_string(report)?);
                } else {
                    println!("{report}");
                }
            }
        }
        Commands::Check { paths } => {
            let mut failed = 0;
            for path in &paths {
                match load_scene(path) {
                    Ok(config) => eprintln!(
                        "✅ {}: {} 个状态, {} 个过渡",
                        path.display(),
                        config.states.len(),
                        config.transitions.len()
                    ),
                    Err(e) => {
                        eprintln!("[ERROR] {}: {e:#}", path.display());
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{failed} 个配置文件检查失败");
            }
        }
    }
    Ok(())
}

/// 加载并验证节点配置
fn load_scene(path: &Path) -> anyhow::Result<NodeConfig> {
    let config = NodeConfig::load(path)?;
    config.validate()?;
    Ok(config)
}
