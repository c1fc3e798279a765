//! # Config 模块
//!
//! 可过渡节点的声明式配置：状态、过渡和默认参数。
//!
//! ```json
//! {
//!   "defaults": { "duration_ms": 200, "easing": "ease_in_out_quad" },
//!   "initial_state": "up",
//!   "states": {
//!     "up":   { "scale": 1.0 },
//!     "over": { "scale": 1.25, "tint": 16777088, "tint_amount": 0.5 }
//!   },
//!   "transitions": [ { "from": "over", "to": "down", "duration_ms": 100 } ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::MAX_COLOR;
use crate::error::ConfigError;
use crate::state::StateRecord;
use crate::target::HostNode;
use crate::transition::DEFAULT_DURATION_MS;
use crate::tween::EasingFunction;

/// 新建过渡使用的默认参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionDefaults {
    /// 时长（毫秒）
    #[serde(default = "default_duration_ms")]
    pub duration_ms: f32,

    /// 缓动函数
    #[serde(default)]
    pub easing: EasingFunction,
}

impl Default for TransitionDefaults {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            easing: EasingFunction::default(),
        }
    }
}

fn default_duration_ms() -> f32 {
    DEFAULT_DURATION_MS
}

/// 单个状态的配置
///
/// 省略的字段不写入状态。`scale` 是均匀缩放，`scale_x` / `scale_y` 在其之后写入。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f32>,
    /// 旋转角度（弧度）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    /// 透明度 (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// 着色颜色（0xRRGGBB）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint: Option<u32>,
    /// 着色强度 (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint_amount: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl StateConfig {
    /// 写入状态
    pub fn apply_to<H: HostNode>(&self, state: &StateRecord<H>) {
        if let Some(x) = self.x {
            state.set_x(x);
        }
        if let Some(y) = self.y {
            state.set_y(y);
        }
        if let Some(scale) = self.scale {
            state.set_scale(scale);
        }
        if let Some(sx) = self.scale_x {
            state.scale().write(0, sx);
        }
        if let Some(sy) = self.scale_y {
            state.scale().write(1, sy);
        }
        if let Some(rotation) = self.rotation {
            state.set_rotation(rotation);
        }
        if let Some(alpha) = self.alpha {
            state.set_alpha(alpha);
        }
        if let Some(width) = self.width {
            state.set_width(width);
        }
        if let Some(height) = self.height {
            state.set_height(height);
        }
        if let Some(tint) = self.tint {
            state.set_tint(tint);
        }
        if let Some(amount) = self.tint_amount {
            state.set_tint_amount(amount);
        }
        if let Some(visible) = self.visible {
            state.set_visible(visible);
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        check_unit(self.alpha, name, "alpha")?;
        check_unit(self.tint_amount, name, "tint_amount")?;

        if let Some(tint) = self.tint.filter(|&t| t > MAX_COLOR) {
            return Err(ConfigError::Invalid {
                message: format!("状态 '{}' 的 tint 超出 0xFFFFFF: {:#x}", name, tint),
            });
        }
        Ok(())
    }
}

fn check_unit(value: Option<f32>, state: &str, field: &str) -> Result<(), ConfigError> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => Err(ConfigError::Invalid {
            message: format!("状态 '{}' 的 {} 必须在 0.0 - 1.0 之间: {}", state, field, v),
        }),
        _ => Ok(()),
    }
}

/// 单个过渡的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// 起始状态
    pub from: String,
    /// 目标状态
    pub to: String,
    /// 时长（毫秒），省略时使用默认值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f32>,
    /// 缓动函数，省略时使用默认值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingFunction>,
}

/// 节点配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// 过渡默认参数
    #[serde(default)]
    pub defaults: TransitionDefaults,

    /// 初始状态，省略时按名称排序最先应用的状态成为当前状态
    #[serde(default)]
    pub initial_state: Option<String>,

    /// 状态（按名称排序应用）
    #[serde(default)]
    pub states: BTreeMap<String, StateConfig>,

    /// 需要单独调整参数的过渡
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
}

impl NodeConfig {
    /// 从 JSON 字符串解析
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 加载配置文件
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.duration_ms < 0.0 {
            return Err(ConfigError::Invalid {
                message: format!("默认时长不能为负: {}", self.defaults.duration_ms),
            });
        }

        if self.initial_state.as_deref() == Some("") {
            return Err(ConfigError::Invalid {
                message: "initial_state 不能为空字符串".to_string(),
            });
        }

        for (name, state) in &self.states {
            if name.is_empty() {
                return Err(ConfigError::Invalid {
                    message: "状态名不能为空".to_string(),
                });
            }
            state.validate(name)?;
        }

        for transition in &self.transitions {
            if transition.from.is_empty() || transition.to.is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "过渡 '{}' -> '{}' 的状态名不能为空",
                        transition.from, transition.to
                    ),
                });
            }
            if transition.from == transition.to {
                return Err(ConfigError::Invalid {
                    message: format!("过渡的两端不能是同一个状态: '{}'", transition.from),
                });
            }
            if let Some(duration) = transition.duration_ms.filter(|&d| d < 0.0) {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "过渡 '{}' -> '{}' 的时长不能为负: {}",
                        transition.from, transition.to, duration
                    ),
                });
            }
        }

        Ok(())
    }
}
