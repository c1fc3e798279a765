//! # Target 模块
//!
//! 宿主场景节点的接口，以及状态和过渡写入的目标。
//!
//! ## 核心概念
//!
//! - `HostNode`: 宿主场景图节点需要提供的能力（位置、缩放、旋转、尺寸、
//!   透明度、可见性、颜色矩阵效果槽、子节点列表）
//! - `OverlayClip`: 与过渡同时播放的一次性叠加动画
//! - `NodeTarget`: 一个可过渡节点的"可视表面"：宿主节点 + 着色参数
//!
//! 渲染、资源加载等都由宿主负责，这里只描述需要消费的能力。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::color::{self, ColorMatrix};
use crate::properties::StateProperties;

/// 宿主场景图节点
///
/// 实现者是共享句柄：`clone()` 得到指向同一节点的句柄，
/// 所有写入方法只需要 `&self`（内部可变性）。`PartialEq` 按节点身份比较。
pub trait HostNode: Clone + PartialEq + 'static {
    /// 设置位置 X
    fn set_position_x(&self, x: f32);
    /// 设置位置 Y
    fn set_position_y(&self, y: f32);
    /// 设置缩放 X
    fn set_scale_x(&self, x: f32);
    /// 设置缩放 Y
    fn set_scale_y(&self, y: f32);
    /// 设置旋转角度（弧度）
    fn set_rotation(&self, rotation: f32);
    /// 设置宽度
    fn set_width(&self, width: f32);
    /// 设置高度
    fn set_height(&self, height: f32);
    /// 设置透明度
    fn set_alpha(&self, alpha: f32);
    /// 设置可见性
    fn set_visible(&self, visible: bool);
    /// 设置着色颜色矩阵效果
    fn set_color_matrix(&self, matrix: ColorMatrix);
    /// 添加子节点
    fn add_child(&self, child: &Self);
    /// 移除子节点
    fn remove_child(&self, child: &Self);
}

/// 叠加动画（一次性序列帧）
///
/// 过渡播放时把叠加动画挂到目标节点上，过渡的补间结束后
/// 还要等待所有叠加动画播放完毕才算完成。
pub trait OverlayClip<H: HostNode> {
    /// 需要挂到目标节点上的显示节点
    fn display(&self) -> H;
    /// 跳到指定帧并开始播放
    fn goto_and_play(&mut self, frame: usize);
    /// 设置是否循环
    fn set_looping(&mut self, looping: bool);
    /// 停止播放并回到起始帧
    fn stop(&mut self);
    /// 推进播放时间
    fn advance(&mut self, dt_ms: f32);
    /// 是否已播放完毕
    fn is_finished(&self) -> bool;
}

/// 叠加动画句柄
pub type ClipHandle<H> = Rc<RefCell<dyn OverlayClip<H>>>;

/// 可过渡节点的可视表面
///
/// 状态安装、实时属性修改和过渡的逐帧插值都写到这里；
/// 同一时刻只有其中一方在写。
pub struct NodeTarget<H: HostNode> {
    /// 宿主节点
    host: H,
    /// 着色颜色（0xRRGGBB）
    tint: Cell<u32>,
    /// 着色强度
    tint_amount: Cell<f32>,
}

impl<H: HostNode> std::fmt::Debug for NodeTarget<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTarget")
            .field("tint", &format_args!("{:06x}", self.tint.get()))
            .field("tint_amount", &self.tint_amount.get())
            .finish()
    }
}

impl<H: HostNode> NodeTarget<H> {
    /// 创建可视表面
    pub fn new(host: H) -> Self {
        Self {
            host,
            tint: Cell::new(0),
            tint_amount: Cell::new(0.0),
        }
    }

    /// 宿主节点
    pub fn host(&self) -> &H {
        &self.host
    }

    /// 应用属性快照
    ///
    /// 只写入快照中存在的字段；`tint_r/g/b` 合并成一次颜色写入，
    /// 缺失的通道沿用当前颜色。
    pub fn apply(&self, p: &StateProperties) {
        if let Some(x) = p.position_x {
            self.host.set_position_x(x);
        }
        if let Some(y) = p.position_y {
            self.host.set_position_y(y);
        }
        if let Some(x) = p.scale_x {
            self.host.set_scale_x(x);
        }
        if let Some(y) = p.scale_y {
            self.host.set_scale_y(y);
        }
        if let Some(rotation) = p.rotation {
            self.host.set_rotation(rotation);
        }
        if let Some(width) = p.width {
            self.host.set_width(width);
        }
        if let Some(height) = p.height {
            self.host.set_height(height);
        }

        let mut tint_changed = false;
        if p.has_tint() {
            let [r, g, b] = color::hex2rgb(self.tint.get());
            let rgb = [
                p.tint_r.unwrap_or(r),
                p.tint_g.unwrap_or(g),
                p.tint_b.unwrap_or(b),
            ];
            self.tint.set(color::rgb2hex(rgb));
            tint_changed = true;
        }
        if let Some(amount) = p.tint_amount {
            self.tint_amount.set(amount);
            tint_changed = true;
        }
        if tint_changed {
            self.update_tint();
        }

        if let Some(alpha) = p.alpha {
            self.host.set_alpha(alpha);
        }
        if let Some(visible) = p.visible {
            self.host.set_visible(visible);
        }
    }

    /// 着色颜色
    pub fn tint(&self) -> u32 {
        self.tint.get()
    }

    /// 设置着色颜色，立即更新颜色矩阵
    ///
    /// 着色强度为 0（默认）时颜色不会产生可见效果。
    pub fn set_tint(&self, tint: u32) {
        self.tint.set(tint & color::MAX_COLOR);
        self.update_tint();
    }

    /// 着色强度
    pub fn tint_amount(&self) -> f32 {
        self.tint_amount.get()
    }

    /// 设置着色强度，立即更新颜色矩阵
    pub fn set_tint_amount(&self, amount: f32) {
        self.tint_amount.set(amount);
        self.update_tint();
    }

    fn update_tint(&self) {
        self.host
            .set_color_matrix(color::tint(self.tint.get(), self.tint_amount.get()));
    }

    /// 向宿主节点添加子节点
    pub fn add_child(&self, child: &H) {
        self.host.add_child(child);
    }

    /// 从宿主节点移除子节点
    pub fn remove_child(&self, child: &H) {
        self.host.remove_child(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneNode;

    #[test]
    fn test_apply_only_present_fields() {
        let host = SceneNode::new();
        host.set_position_x(5.0);
        host.set_alpha(0.3);
        let target = NodeTarget::new(host.clone());

        target.apply(&StateProperties {
            position_y: Some(7.0),
            scale_x: Some(2.0),
            ..Default::default()
        });

        assert_eq!(host.position(), (5.0, 7.0));
        assert_eq!(host.scale(), (2.0, 1.0));
        assert_eq!(host.alpha(), 0.3);
        assert!(host.color_matrix().is_none());
    }

    #[test]
    fn test_apply_tint_channels_jointly() {
        let host = SceneNode::new();
        let target = NodeTarget::new(host.clone());

        target.apply(&StateProperties {
            tint_r: Some(1.0),
            tint_g: Some(0.5),
            tint_b: Some(0.0),
            tint_amount: Some(1.0),
            ..Default::default()
        });

        assert_eq!(target.tint(), 0xFF8000);
        assert_eq!(target.tint_amount(), 1.0);
        assert_eq!(host.color_matrix(), Some(color::tint(0xFF8000, 1.0)));
    }

    #[test]
    fn test_missing_tint_channel_keeps_current() {
        let target = NodeTarget::new(SceneNode::new());
        target.set_tint(0x102030);

        target.apply(&StateProperties {
            tint_r: Some(1.0),
            ..Default::default()
        });
        assert_eq!(target.tint(), 0xFF2030);
    }

    #[test]
    fn test_set_tint_updates_matrix() {
        let host = SceneNode::new();
        let target = NodeTarget::new(host.clone());

        target.set_tint(0xFF0000);
        assert_eq!(host.color_matrix(), Some(ColorMatrix::identity()));

        target.set_tint_amount(0.5);
        assert_eq!(host.color_matrix(), Some(color::tint(0xFF0000, 0.5)));
    }

    #[test]
    fn test_visible_and_size() {
        let host = SceneNode::new();
        let target = NodeTarget::new(host.clone());
        target.apply(&StateProperties {
            width: Some(200.0),
            height: Some(40.0),
            visible: Some(false),
            ..Default::default()
        });
        assert_eq!(host.size(), (200.0, 40.0));
        assert!(!host.visible());
    }
}
