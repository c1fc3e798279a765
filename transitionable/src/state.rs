//! # State 模块
//!
//! 单个视觉状态的属性集合。
//!
//! 一个 `StateRecord` 属于某个可过渡节点，保存该状态下的目标属性值，
//! 以及只在该状态安装期间挂到节点上的子节点。
//!
//! ## 安装语义
//!
//! - `install()`：把当前快照应用到目标，并添加附属子节点
//! - `uninstall()`：移除附属子节点，属性值保留
//! - 安装期间修改属性会立即重新应用（实时编辑）

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::color;
use crate::properties::StateProperties;
use crate::reactive::ReactiveValueGroup;
use crate::target::{HostNode, NodeTarget};

/// 单个状态属性的写入
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateProperty {
    /// 位置 (x, y)
    Position(f32, f32),
    /// 位置 X
    X(f32),
    /// 位置 Y
    Y(f32),
    /// 均匀缩放
    Scale(f32),
    /// 缩放 (x, y)
    ScaleXY(f32, f32),
    /// 旋转角度（弧度）
    Rotation(f32),
    /// 透明度
    Alpha(f32),
    /// 宽度
    Width(f32),
    /// 高度
    Height(f32),
    /// 着色颜色（0xRRGGBB）
    Tint(u32),
    /// 着色强度
    TintAmount(f32),
    /// 可见性
    Visible(bool),
}

/// reactive `{x, y}` 组中字段的下标
const X: usize = 0;
const Y: usize = 1;

struct StateData<H: HostNode> {
    /// 状态名（在所属节点内唯一）
    name: String,
    /// 所属节点的可视表面
    target: Rc<NodeTarget<H>>,
    position: Rc<ReactiveValueGroup>,
    scale: Rc<ReactiveValueGroup>,
    rotation: Option<f32>,
    alpha: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    tint: Option<u32>,
    tint_amount: Option<f32>,
    visible: Option<bool>,
    /// 只在本状态安装期间挂到目标上的子节点
    children: Vec<H>,
    /// 是否已安装
    installed: bool,
}

/// 状态记录
///
/// 共享句柄，克隆得到同一个状态。
pub struct StateRecord<H: HostNode> {
    inner: Rc<RefCell<StateData<H>>>,
}

impl<H: HostNode> Clone for StateRecord<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: HostNode> std::fmt::Debug for StateRecord<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("StateRecord")
            .field("name", &data.name)
            .field("installed", &data.installed)
            .field("children", &data.children.len())
            .finish()
    }
}

impl<H: HostNode> StateRecord<H> {
    /// 创建状态
    pub fn new(name: impl Into<String>, target: Rc<NodeTarget<H>>) -> Self {
        let record = Self {
            inner: Rc::new(RefCell::new(StateData {
                name: name.into(),
                target,
                position: Rc::new(ReactiveValueGroup::xy()),
                scale: Rc::new(ReactiveValueGroup::xy()),
                rotation: None,
                alpha: None,
                width: None,
                height: None,
                tint: None,
                tint_amount: None,
                visible: None,
                children: Vec::new(),
                installed: false,
            })),
        };

        let (position, scale) = {
            let data = record.inner.borrow();
            (data.position.clone(), data.scale.clone())
        };
        Self::watch(&position, Rc::downgrade(&record.inner));
        Self::watch(&scale, Rc::downgrade(&record.inner));

        record
    }

    /// 组内字段变化时实时重新应用
    fn watch(group: &ReactiveValueGroup, weak: Weak<RefCell<StateData<H>>>) {
        group.set_on_change(move || {
            if let Some(inner) = weak.upgrade() {
                StateRecord { inner }.reapply_if_installed();
            }
        });
    }

    /// 状态名
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// 是否已安装
    pub fn is_installed(&self) -> bool {
        self.inner.borrow().installed
    }

    /// 所属节点的可视表面
    pub(crate) fn target(&self) -> Rc<NodeTarget<H>> {
        self.inner.borrow().target.clone()
    }

    /// 两个状态是否属于同一节点
    pub fn same_target(&self, other: &StateRecord<H>) -> bool {
        Rc::ptr_eq(&self.inner.borrow().target, &other.inner.borrow().target)
    }

    /// 是否为同一个状态
    pub fn ptr_eq(&self, other: &StateRecord<H>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ========== 属性 ==========

    /// 位置 `{x, y}`
    ///
    /// 写入字段与 `set_position` 效果相同（安装期间实时重新应用）。
    pub fn position(&self) -> Rc<ReactiveValueGroup> {
        self.inner.borrow().position.clone()
    }

    /// 缩放 `{x, y}`
    pub fn scale(&self) -> Rc<ReactiveValueGroup> {
        self.inner.borrow().scale.clone()
    }

    pub fn rotation(&self) -> Option<f32> {
        self.inner.borrow().rotation
    }

    pub fn alpha(&self) -> Option<f32> {
        self.inner.borrow().alpha
    }

    pub fn width(&self) -> Option<f32> {
        self.inner.borrow().width
    }

    pub fn height(&self) -> Option<f32> {
        self.inner.borrow().height
    }

    pub fn tint(&self) -> Option<u32> {
        self.inner.borrow().tint
    }

    pub fn tint_amount(&self) -> Option<f32> {
        self.inner.borrow().tint_amount
    }

    pub fn visible(&self) -> Option<bool> {
        self.inner.borrow().visible
    }

    /// 写入属性
    ///
    /// 状态已安装时立即重新计算快照并应用到目标。
    pub fn set_property(&self, property: StateProperty) -> &Self {
        let (position, scale) = {
            let data = self.inner.borrow();
            (data.position.clone(), data.scale.clone())
        };

        // 位置和缩放经由 reactive 组写入，由组的回调负责重新应用
        match property {
            StateProperty::Position(x, y) => {
                position.write(X, x);
                position.write(Y, y);
                return self;
            }
            StateProperty::X(x) => {
                position.write(X, x);
                return self;
            }
            StateProperty::Y(y) => {
                position.write(Y, y);
                return self;
            }
            StateProperty::Scale(s) => {
                scale.write(X, s);
                scale.write(Y, s);
                return self;
            }
            StateProperty::ScaleXY(x, y) => {
                scale.write(X, x);
                scale.write(Y, y);
                return self;
            }
            _ => {}
        }

        {
            let mut data = self.inner.borrow_mut();
            match property {
                StateProperty::Rotation(v) => data.rotation = Some(v),
                StateProperty::Alpha(v) => data.alpha = Some(v),
                StateProperty::Width(v) => data.width = Some(v),
                StateProperty::Height(v) => data.height = Some(v),
                StateProperty::Tint(v) => data.tint = Some(v & color::MAX_COLOR),
                StateProperty::TintAmount(v) => data.tint_amount = Some(v),
                StateProperty::Visible(v) => data.visible = Some(v),
                StateProperty::Position(..)
                | StateProperty::X(_)
                | StateProperty::Y(_)
                | StateProperty::Scale(_)
                | StateProperty::ScaleXY(..) => {}
            }
        }

        self.reapply_if_installed();
        self
    }

    pub fn set_position(&self, x: f32, y: f32) -> &Self {
        self.set_property(StateProperty::Position(x, y))
    }

    pub fn set_x(&self, x: f32) -> &Self {
        self.set_property(StateProperty::X(x))
    }

    pub fn set_y(&self, y: f32) -> &Self {
        self.set_property(StateProperty::Y(y))
    }

    /// 均匀缩放
    pub fn set_scale(&self, scale: f32) -> &Self {
        self.set_property(StateProperty::Scale(scale))
    }

    pub fn set_scale_xy(&self, x: f32, y: f32) -> &Self {
        self.set_property(StateProperty::ScaleXY(x, y))
    }

    /// 旋转角度（弧度）
    pub fn set_rotation(&self, rotation: f32) -> &Self {
        self.set_property(StateProperty::Rotation(rotation))
    }

    pub fn set_alpha(&self, alpha: f32) -> &Self {
        self.set_property(StateProperty::Alpha(alpha))
    }

    pub fn set_width(&self, width: f32) -> &Self {
        self.set_property(StateProperty::Width(width))
    }

    pub fn set_height(&self, height: f32) -> &Self {
        self.set_property(StateProperty::Height(height))
    }

    /// 着色颜色（0xRRGGBB）
    pub fn set_tint(&self, tint: u32) -> &Self {
        self.set_property(StateProperty::Tint(tint))
    }

    pub fn set_tint_amount(&self, amount: f32) -> &Self {
        self.set_property(StateProperty::TintAmount(amount))
    }

    pub fn set_visible(&self, visible: bool) -> &Self {
        self.set_property(StateProperty::Visible(visible))
    }

    /// 扁平化快照
    ///
    /// 只包含显式设置过的字段。
    pub fn properties(&self) -> StateProperties {
        let data = self.inner.borrow();
        let mut p = StateProperties {
            position_x: data.position.get("x"),
            position_y: data.position.get("y"),
            scale_x: data.scale.get("x"),
            scale_y: data.scale.get("y"),
            rotation: data.rotation,
            width: data.width,
            height: data.height,
            alpha: data.alpha,
            tint_amount: data.tint_amount,
            visible: data.visible,
            ..Default::default()
        };

        if let Some(tint) = data.tint {
            let [r, g, b] = color::hex2rgb(tint);
            p.tint_r = Some(r);
            p.tint_g = Some(g);
            p.tint_b = Some(b);
        }

        p
    }

    fn reapply_if_installed(&self) {
        let target = {
            let data = self.inner.borrow();
            if !data.installed {
                return;
            }
            data.target.clone()
        };
        target.apply(&self.properties());
    }

    // ========== 安装 ==========

    /// 安装：应用全部属性并添加附属子节点
    pub fn install(&self) {
        let (target, children, name) = {
            let mut data = self.inner.borrow_mut();
            data.installed = true;
            (data.target.clone(), data.children.clone(), data.name.clone())
        };

        debug!(state = %name, children = children.len(), "安装状态");
        target.apply(&self.properties());
        for child in &children {
            target.add_child(child);
        }
    }

    /// 卸载：移除附属子节点，属性值保留
    pub fn uninstall(&self) {
        let (target, children, name) = {
            let mut data = self.inner.borrow_mut();
            data.installed = false;
            (data.target.clone(), data.children.clone(), data.name.clone())
        };

        debug!(state = %name, "卸载状态");
        for child in &children {
            target.remove_child(child);
        }
    }

    // ========== 子节点 ==========

    /// 附属子节点
    pub fn children(&self) -> Vec<H> {
        self.inner.borrow().children.clone()
    }

    /// 添加附属子节点，已安装时同步添加到目标
    pub fn add_child(&self, child: &H) -> &Self {
        let (installed, target) = {
            let mut data = self.inner.borrow_mut();
            data.children.push(child.clone());
            (data.installed, data.target.clone())
        };
        if installed {
            target.add_child(child);
        }
        self
    }

    /// 移除附属子节点，已安装时同步从目标移除
    pub fn remove_child(&self, child: &H) -> &Self {
        let (installed, target, removed) = {
            let mut data = self.inner.borrow_mut();
            let before = data.children.len();
            data.children.retain(|c| c != child);
            (data.installed, data.target.clone(), data.children.len() != before)
        };
        if installed && removed {
            target.remove_child(child);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneNode;

    fn make_state(name: &str) -> (StateRecord<SceneNode>, SceneNode) {
        let host = SceneNode::with_label("target");
        let target = Rc::new(NodeTarget::new(host.clone()));
        (StateRecord::new(name, target), host)
    }

    #[test]
    fn test_properties_only_contain_set_fields() {
        let (state, _) = make_state("up");
        assert!(state.properties().is_empty());

        state.set_x(10.0).set_alpha(0.5);
        let p = state.properties();
        assert_eq!(p.position_x, Some(10.0));
        assert_eq!(p.position_y, None);
        assert_eq!(p.alpha, Some(0.5));
        assert_eq!(p.scale_x, None);
        assert_eq!(p.rotation, None);
        assert_eq!(p.visible, None);
    }

    #[test]
    fn test_tint_decomposed() {
        let (state, _) = make_state("over");
        state.set_tint(0xFF0000).set_tint_amount(0.5);
        let p = state.properties();
        assert_eq!(p.tint_r, Some(1.0));
        assert_eq!(p.tint_g, Some(0.0));
        assert_eq!(p.tint_b, Some(0.0));
        assert_eq!(p.tint_amount, Some(0.5));
    }

    #[test]
    fn test_uniform_scale() {
        let (state, _) = make_state("big");
        state.set_scale(1.5);
        let p = state.properties();
        assert_eq!(p.scale_x, Some(1.5));
        assert_eq!(p.scale_y, Some(1.5));
    }

    #[test]
    fn test_install_applies_and_leaves_omitted_fields() {
        let (state, host) = make_state("up");
        host.set_rotation(0.25);
        host.set_alpha(0.75);

        state.set_position(3.0, 4.0);
        state.install();

        assert!(state.is_installed());
        assert_eq!(host.position(), (3.0, 4.0));
        assert_eq!(host.rotation(), 0.25);
        assert_eq!(host.alpha(), 0.75);
    }

    #[test]
    fn test_live_edit_when_installed() {
        let (state, host) = make_state("up");
        state.install();

        state.set_alpha(0.2);
        assert_eq!(host.alpha(), 0.2);

        // reactive 组的写入同样生效
        state.position().set("y", 9.0).unwrap();
        assert_eq!(host.position().1, 9.0);
    }

    #[test]
    fn test_no_live_edit_when_not_installed() {
        let (state, host) = make_state("up");
        state.set_alpha(0.2);
        state.scale().set("x", 3.0).unwrap();
        assert_eq!(host.alpha(), 1.0);
        assert_eq!(host.scale(), (1.0, 1.0));
    }

    #[test]
    fn test_uninstall_keeps_values() {
        let (state, host) = make_state("up");
        state.set_alpha(0.4);
        state.install();
        state.uninstall();
        assert!(!state.is_installed());

        host.set_alpha(1.0);
        state.install();
        assert_eq!(host.alpha(), 0.4);
    }

    #[test]
    fn test_children_follow_installation() {
        let (state, host) = make_state("down");
        let icon = SceneNode::with_label("icon");

        state.add_child(&icon);
        assert!(!host.contains_child(&icon));

        state.install();
        assert!(host.contains_child(&icon));

        state.uninstall();
        assert!(!host.contains_child(&icon));
        assert_eq!(state.children(), vec![icon.clone()]);
    }

    #[test]
    fn test_children_mirrored_while_installed() {
        let (state, host) = make_state("down");
        state.install();

        let icon = SceneNode::with_label("icon");
        state.add_child(&icon);
        assert!(host.contains_child(&icon));

        state.remove_child(&icon);
        assert!(!host.contains_child(&icon));
        assert!(state.children().is_empty());
    }

    #[test]
    fn test_same_target() {
        let host = SceneNode::new();
        let target = Rc::new(NodeTarget::new(host));
        let a = StateRecord::new("a", target.clone());
        let b = StateRecord::new("b", target);
        let (c, _) = make_state("c");

        assert!(a.same_target(&b));
        assert!(!a.same_target(&c));
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }
}
