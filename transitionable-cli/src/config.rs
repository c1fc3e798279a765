//! # Config 模块
//!
//! 模拟脚本：在模拟时钟上按时间点切换节点的当前状态。
//!
//! ```json
//! {
//!   "frame_ms": 16,
//!   "steps": [
//!     { "at_ms": 0, "set_current": "over" },
//!     { "at_ms": 100, "set_current": "down" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// 单个脚本步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// 执行时间（毫秒）
    pub at_ms: f32,
    /// 切换到的状态
    pub set_current: String,
}

/// 模拟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 每帧时长（毫秒）
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f32,

    /// 模拟时长上限（毫秒）
    #[serde(default = "default_max_ms")]
    pub max_ms: f32,

    /// 开始模拟前切换到的状态
    #[serde(default)]
    pub initial_state: Option<String>,

    /// 脚本步骤
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_ms: default_frame_ms(),
            max_ms: default_max_ms(),
            initial_state: None,
            steps: Vec::new(),
        }
    }
}

fn default_frame_ms() -> f32 {
    16.0
}

fn default_max_ms() -> f32 {
    10_000.0
}

impl SimulationConfig {
    /// 加载模拟脚本
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取模拟脚本失败: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("模拟脚本解析失败: {}", path.display()))?;
        config.validate()?;
        config
            .steps
            .sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.frame_ms <= 0.0 {
            anyhow::bail!("frame_ms 必须大于 0: {}", self.frame_ms);
        }
        if self.max_ms < 0.0 {
            anyhow::bail!("max_ms 不能为负: {}", self.max_ms);
        }
        for step in &self.steps {
            if step.at_ms < 0.0 {
                anyhow::bail!("步骤时间不能为负: {}", step.at_ms);
            }
            if step.set_current.is_empty() {
                anyhow::bail!("步骤 {}ms 的状态名为空", step.at_ms);
            }
        }
        Ok(())
    }
}
