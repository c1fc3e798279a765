//! # Tween 模块
//!
//! 补间引擎，负责属性快照随时间的插值。
//!
//! ## 核心概念
//!
//! - `EasingFunction`: 缓动函数
//! - `PropertyTween`: 单个快照补间，管理一组 f32 字段的时间变化
//! - `TweenRegistry`: 显式的逐帧调度器，由宿主每帧推进一次
//! - `FrameTask`: 注册表中的逐帧任务接口
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut tween = PropertyTween::new(&from, &to, 200.0, EasingFunction::default());
//!
//! while tween.update(16.0) {
//!     node.set_state_properties(tween.values());
//! }
//! ```

mod easing;
mod registry;
mod tween;

pub use easing::EasingFunction;
pub use registry::{FrameTask, RegistryEvent, TaskId, TweenRegistry};
pub use tween::{PropertyTween, TweenState};
