//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-core`: 运行 transitionable 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `config-check`: 检查节点配置文件（解析、取值范围、过渡两端）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use transitionable::{NodeConfig, SceneNode, TransitionableNode, TweenRegistry};
use walkdir::WalkDir;

/// 默认的节点配置目录（相对于 workspace root）
const DEFAULT_SCENES_DIR: &str = "transitionable-cli/scenes";

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    let status = cmd.status();
    match status {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-core" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "transitionable", "--html"]);
            run("cargo llvm-cov -p transitionable --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 排除 xtask，避免稀释信号
            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "--workspace", "--exclude", "xtask", "--html"]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "config-check" => {
            let path = args.next();
            config_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-core        运行 transitionable 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  config-check    检查节点配置文件

CONFIG-CHECK:
  cargo xtask config-check [path]

  不带参数：检查 transitionable-cli/scenes/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 解析错误
    - 取值范围（alpha、tint_amount、tint、时长）
    - 配置能否应用到节点（状态、过渡的创建）

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-core      -> cargo xtask cov-core
  cargo cov-workspace -> cargo xtask cov-workspace
  cargo config-check  -> cargo xtask config-check
"#
    );
}

//=============================================================================
// config-check 命令实现
//=============================================================================

/// 配置检查结果
#[derive(Default)]
struct ConfigCheckResult {
    /// 检查的文件数量
    files_checked: usize,
    /// 出错的文件
    errors: Vec<(String, String)>,
    /// 警告
    warnings: Vec<(String, String)>,
}

/// 执行配置检查
fn config_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_config_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(DEFAULT_SCENES_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认配置目录不存在: {}\n请在 workspace 根目录运行，或指定配置路径",
                    dir.display()
                );
            }
            collect_config_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到配置文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个配置文件...\n", files.len());

    let mut result = ConfigCheckResult::default();
    for file in &files {
        check_config_file(file, &mut result);
    }

    print_check_result(&result);

    if !result.errors.is_empty() {
        anyhow::bail!("配置检查发现错误");
    }
    Ok(())
}

/// 收集目录下的所有配置文件
fn collect_config_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个配置文件
fn check_config_file(file: &Path, result: &mut ConfigCheckResult) {
    let id = file.display().to_string();
    result.files_checked += 1;

    let config = match NodeConfig::load(file) {
        Ok(c) => c,
        Err(e) => {
            result.errors.push((id, e.to_string()));
            return;
        }
    };

    if let Err(e) = config.validate() {
        result.errors.push((id, e.to_string()));
        return;
    }

    if config.states.is_empty() {
        result
            .warnings
            .push((id.clone(), "没有声明任何状态".to_string()));
    }

    // 过渡两端不在 states 中时会被创建为空状态
    for t in &config.transitions {
        for name in [&t.from, &t.to] {
            if !config.states.contains_key(name) {
                result.warnings.push((
                    id.clone(),
                    format!("过渡 '{}' -> '{}' 引用了未声明的状态 '{}'", t.from, t.to, name),
                ));
            }
        }
    }

    if let Some(initial) = &config.initial_state
        && !config.states.contains_key(initial)
    {
        result
            .warnings
            .push((id.clone(), format!("初始状态 '{}' 未声明", initial)));
    }

    // 应用到一个临时节点上
    let registry = TweenRegistry::new();
    let node = TransitionableNode::new(SceneNode::new(), &registry);
    if let Err(e) = node.apply_config(&config) {
        result.errors.push((id, e.to_string()));
    }
}

/// 输出检查结果
fn print_check_result(result: &ConfigCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个配置文件", result.files_checked);
    eprintln!();

    for (id, message) in &result.errors {
        eprintln!("[ERROR] {}: {}", id, message);
    }
    for (id, message) in &result.warnings {
        eprintln!("[WARN] {}: {}", id, message);
    }

    let error_count = result.errors.len();
    let warn_count = result.warnings.len();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {} 个错误, {} 个警告", error_count, warn_count);
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", warn_count);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
