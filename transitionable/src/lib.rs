//! # Transitionable
//!
//! 场景节点的命名视觉状态与状态之间的定时过渡。
//!
//! ## 架构概述
//!
//! 节点声明若干命名状态（位置、缩放、旋转、尺寸、透明度、着色、可见性），
//! 切换当前状态时自动在两个状态之间播放补间过渡。补间由显式的
//! [`TweenRegistry`] 逐帧推进，宿主每帧调用一次 `update`：
//!
//! ```text
//! Host                               Transitionable
//!   │                                      │
//!   │──── set_current("over") ───────────►│ 创建 / 播放过渡
//!   │                                      │
//!   │──── registry.update(dt) ───────────►│ 插值写入 HostNode
//!   │◄─── Vec<RegistryEvent> ─────────────│
//! ```
//!
//! ## 核心类型
//!
//! - [`TransitionableNode`]：拥有状态和过渡的节点
//! - [`StateRecord`]：单个命名状态的属性集合
//! - [`Transition`]：两个状态之间的过渡，完成时兑现 [`Completion`]
//! - [`HostNode`] / [`OverlayClip`]：宿主场景图需要提供的能力
//! - [`SceneNode`] / [`FrameClip`]：只记录属性值的参考宿主实现
//!
//! ## 使用示例
//!
//! ```ignore
//! use transitionable::{SceneNode, TransitionableNode, TweenRegistry};
//!
//! let registry = TweenRegistry::new();
//! let button = TransitionableNode::new(SceneNode::new(), &registry);
//!
//! button.state("up")?.set_scale(1.0);
//! button.state("over")?.set_scale(1.25).set_tint(0xFFFF80).set_tint_amount(0.5);
//!
//! button.set_current("over")?;
//! while registry.has_active_tasks() {
//!     registry.update(16.0);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`reactive`]：可观察的数值字段组
//! - [`color`]：着色颜色矩阵
//! - [`properties`]：扁平化的属性快照
//! - [`tween`]：缓动函数、快照补间和逐帧调度器
//! - [`target`]：宿主接口
//! - [`scene`]：参考宿主
//! - [`state`] / [`transition`] / [`node`]：状态机
//! - [`config`]：声明式配置
//! - [`error`]：错误类型定义

pub mod color;
pub mod config;
pub mod error;
pub mod node;
pub mod properties;
pub mod reactive;
pub mod scene;
pub mod state;
pub mod target;
pub mod transition;
pub mod tween;

// 重导出核心类型
pub use color::ColorMatrix;
pub use config::{NodeConfig, StateConfig, TransitionConfig, TransitionDefaults};
pub use error::{ConfigError, TransitionError, TransitionResult};
pub use node::TransitionableNode;
pub use properties::{NumericProperty, StateProperties};
pub use reactive::ReactiveValueGroup;
pub use scene::{FrameClip, SceneNode};
pub use state::{StateProperty, StateRecord};
pub use target::{ClipHandle, HostNode, NodeTarget, OverlayClip};
pub use transition::{Completion, Transition};
pub use tween::{EasingFunction, FrameTask, PropertyTween, RegistryEvent, TaskId, TweenRegistry};
