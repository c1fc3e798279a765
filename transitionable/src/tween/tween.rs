//! # Tween 模块
//!
//! 属性快照补间。
//!
//! 核心设计：补间只关注快照中数值字段的时间轴变化，
//! 不关心这些值最终被应用到哪里。

use super::EasingFunction;
use crate::properties::{NumericProperty, StateProperties};

/// 补间状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenState {
    /// 正在播放
    #[default]
    Playing,
    /// 已完成
    Completed,
}

/// 单个插值通道
#[derive(Debug, Clone, Copy, PartialEq)]
struct Channel {
    property: NumericProperty,
    from: f32,
    to: f32,
}

/// 快照补间
///
/// 把一个可变缓冲区从 `from` 快照插值到 `to` 快照：
/// - 两端都有且不同的数值字段参与插值
/// - 只有一端有的字段固定为那一端的值
/// - `visible` 不插值，保持起点的值
#[derive(Debug, Clone)]
pub struct PropertyTween {
    /// 参与插值的通道
    channels: Vec<Channel>,
    /// 插值缓冲区
    buffer: StateProperties,
    /// 时长（毫秒）
    duration_ms: f32,
    /// 缓动函数
    easing: EasingFunction,
    /// 已经过的时间（毫秒）
    elapsed_ms: f32,
    /// 当前进度（0.0 - 1.0，已应用缓动）
    progress: f32,
    /// 当前状态
    state: TweenState,
}

impl PropertyTween {
    /// 创建补间
    pub fn new(
        from: &StateProperties,
        to: &StateProperties,
        duration_ms: f32,
        easing: EasingFunction,
    ) -> Self {
        let mut buffer = *from;
        let mut channels = Vec::new();

        for property in NumericProperty::ALL {
            match (from.get(property), to.get(property)) {
                (Some(a), Some(b)) if a != b => channels.push(Channel {
                    property,
                    from: a,
                    to: b,
                }),
                (None, Some(b)) => buffer.set(property, Some(b)),
                _ => {}
            }
        }

        if buffer.visible.is_none() {
            buffer.visible = to.visible;
        }

        Self {
            channels,
            buffer,
            duration_ms: duration_ms.max(0.0),
            easing,
            elapsed_ms: 0.0,
            progress: 0.0,
            state: TweenState::Playing,
        }
    }

    /// 更新补间
    ///
    /// # 返回
    /// - `true`: 补间仍在进行中
    /// - `false`: 补间已结束
    pub fn update(&mut self, dt_ms: f32) -> bool {
        if self.state == TweenState::Completed {
            return false;
        }

        self.elapsed_ms += dt_ms.max(0.0);

        let raw_progress = if self.duration_ms <= 0.0 {
            1.0
        } else {
            self.elapsed_ms / self.duration_ms
        };

        if raw_progress >= 1.0 {
            self.force_complete();
            false
        } else {
            self.progress = self.easing.apply(raw_progress);
            self.write_buffer();
            true
        }
    }

    /// 强制完成，缓冲区写入终点值
    pub fn force_complete(&mut self) {
        self.progress = 1.0;
        self.state = TweenState::Completed;
        for channel in &self.channels {
            self.buffer.set(channel.property, Some(channel.to));
        }
    }

    fn write_buffer(&mut self) {
        for channel in &self.channels {
            let value = channel.from + (channel.to - channel.from) * self.progress;
            self.buffer.set(channel.property, Some(value));
        }
    }

    /// 当前插值结果
    pub fn values(&self) -> &StateProperties {
        &self.buffer
    }

    /// 当前进度（已应用缓动）
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// 当前状态
    pub fn state(&self) -> TweenState {
        self.state
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.state == TweenState::Completed
    }

    /// 参与插值的属性
    pub fn tweened_properties(&self) -> impl Iterator<Item = NumericProperty> + '_ {
        self.channels.iter().map(|c| c.property)
    }

    /// 时长（毫秒）
    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// 缓动函数
    pub fn easing(&self) -> EasingFunction {
        self.easing
    }
}
