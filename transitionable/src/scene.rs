//! # Scene 模块
//!
//! 参考宿主实现：只记录属性值的场景节点和序列帧叠加动画。
//!
//! 真实项目中这些能力由图形框架提供；这里的实现用于无渲染运行
//! （命令行驱动、测试），不做任何绘制。
//!
//! ## 设计说明
//!
//! `SceneNode` 使用 `Rc<RefCell<T>>` 实现内部可变性，
//! 克隆得到的句柄指向同一个节点，相等性按节点身份比较。

use std::cell::RefCell;
use std::rc::Rc;

use crate::color::ColorMatrix;
use crate::target::{HostNode, OverlayClip};

/// 场景节点的内部数据
struct SceneNodeData {
    /// 标签（用于调试）
    pub label: String,
    /// 位置 X
    pub position_x: f32,
    /// 位置 Y
    pub position_y: f32,
    /// 缩放 X
    pub scale_x: f32,
    /// 缩放 Y
    pub scale_y: f32,
    /// 旋转角度（弧度）
    pub rotation: f32,
    /// 宽度
    pub width: f32,
    /// 高度
    pub height: f32,
    /// 透明度 (0.0 - 1.0)
    pub alpha: f32,
    /// 是否可见
    pub visible: bool,
    /// 着色颜色矩阵（从未设置时为 `None`）
    pub color_matrix: Option<ColorMatrix>,
    /// 子节点
    pub children: Vec<SceneNode>,
}

impl Default for SceneNodeData {
    fn default() -> Self {
        Self {
            label: String::new(),
            position_x: 0.0,
            position_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            width: 0.0,
            height: 0.0,
            alpha: 1.0,
            visible: true,
            color_matrix: None,
            children: Vec::new(),
        }
    }
}

/// 场景节点
#[derive(Clone, Default)]
pub struct SceneNode {
    data: Rc<RefCell<SceneNodeData>>,
}

impl PartialEq for SceneNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for SceneNode {}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data.borrow();
        f.debug_struct("SceneNode")
            .field("label", &data.label)
            .field("position", &(data.position_x, data.position_y))
            .field("scale", &(data.scale_x, data.scale_y))
            .field("rotation", &data.rotation)
            .field("alpha", &data.alpha)
            .field("visible", &data.visible)
            .field("children", &data.children.len())
            .finish()
    }
}

impl SceneNode {
    /// 创建新的场景节点
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建带标签的场景节点
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            data: Rc::new(RefCell::new(SceneNodeData {
                label: label.into(),
                ..Default::default()
            })),
        }
    }

    /// 标签
    pub fn label(&self) -> String {
        self.data.borrow().label.clone()
    }

    /// 位置
    pub fn position(&self) -> (f32, f32) {
        let data = self.data.borrow();
        (data.position_x, data.position_y)
    }

    /// 缩放
    pub fn scale(&self) -> (f32, f32) {
        let data = self.data.borrow();
        (data.scale_x, data.scale_y)
    }

    /// 旋转角度（弧度）
    pub fn rotation(&self) -> f32 {
        self.data.borrow().rotation
    }

    /// 尺寸
    pub fn size(&self) -> (f32, f32) {
        let data = self.data.borrow();
        (data.width, data.height)
    }

    /// 透明度
    pub fn alpha(&self) -> f32 {
        self.data.borrow().alpha
    }

    /// 是否可见
    pub fn visible(&self) -> bool {
        self.data.borrow().visible
    }

    /// 着色颜色矩阵
    pub fn color_matrix(&self) -> Option<ColorMatrix> {
        self.data.borrow().color_matrix
    }

    /// 子节点列表（句柄拷贝）
    pub fn children(&self) -> Vec<SceneNode> {
        self.data.borrow().children.clone()
    }

    /// 子节点数量
    pub fn child_count(&self) -> usize {
        self.data.borrow().children.len()
    }

    /// 是否包含指定子节点
    pub fn contains_child(&self, child: &SceneNode) -> bool {
        self.data.borrow().children.iter().any(|c| c == child)
    }
}

impl HostNode for SceneNode {
    fn set_position_x(&self, x: f32) {
        self.data.borrow_mut().position_x = x;
    }

    fn set_position_y(&self, y: f32) {
        self.data.borrow_mut().position_y = y;
    }

    fn set_scale_x(&self, x: f32) {
        self.data.borrow_mut().scale_x = x;
    }

    fn set_scale_y(&self, y: f32) {
        self.data.borrow_mut().scale_y = y;
    }

    fn set_rotation(&self, rotation: f32) {
        self.data.borrow_mut().rotation = rotation;
    }

    fn set_width(&self, width: f32) {
        self.data.borrow_mut().width = width;
    }

    fn set_height(&self, height: f32) {
        self.data.borrow_mut().height = height;
    }

    fn set_alpha(&self, alpha: f32) {
        self.data.borrow_mut().alpha = alpha;
    }

    fn set_visible(&self, visible: bool) {
        self.data.borrow_mut().visible = visible;
    }

    fn set_color_matrix(&self, matrix: ColorMatrix) {
        self.data.borrow_mut().color_matrix = Some(matrix);
    }

    /// 已经是子节点时移动到末尾
    fn add_child(&self, child: &Self) {
        let mut data = self.data.borrow_mut();
        data.children.retain(|c| c != child);
        data.children.push(child.clone());
    }

    fn remove_child(&self, child: &Self) {
        self.data.borrow_mut().children.retain(|c| c != child);
    }
}

/// 序列帧叠加动画
///
/// 以固定帧率播放 `frame_count` 帧；不循环时播放到最后一帧之后结束。
#[derive(Debug)]
pub struct FrameClip {
    /// 显示节点
    display: SceneNode,
    /// 总帧数
    frame_count: usize,
    /// 每帧时长（毫秒）
    frame_ms: f32,
    /// 当前帧
    current_frame: usize,
    /// 当前帧已播放时间
    elapsed_ms: f32,
    playing: bool,
    looping: bool,
    finished: bool,
}

impl FrameClip {
    /// 创建序列帧动画
    pub fn new(frame_count: usize, fps: f32) -> Self {
        Self {
            display: SceneNode::with_label("clip"),
            frame_count,
            frame_ms: 1000.0 / fps.max(1.0),
            current_frame: 0,
            elapsed_ms: 0.0,
            playing: false,
            looping: true,
            finished: false,
        }
    }

    /// 包装成叠加动画句柄
    pub fn into_handle(self) -> Rc<RefCell<FrameClip>> {
        Rc::new(RefCell::new(self))
    }

    /// 当前帧
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// 是否正在播放
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// 是否循环
    pub fn is_looping(&self) -> bool {
        self.looping
    }
}

impl OverlayClip<SceneNode> for FrameClip {
    fn display(&self) -> SceneNode {
        self.display.clone()
    }

    fn goto_and_play(&mut self, frame: usize) {
        self.current_frame = frame.min(self.frame_count.saturating_sub(1));
        self.elapsed_ms = 0.0;
        self.playing = true;
        self.finished = false;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.current_frame = 0;
        self.elapsed_ms = 0.0;
    }

    fn advance(&mut self, dt_ms: f32) {
        if !self.playing {
            return;
        }
        if self.frame_count == 0 {
            self.playing = false;
            self.finished = true;
            return;
        }

        self.elapsed_ms += dt_ms;
        while self.elapsed_ms >= self.frame_ms {
            self.elapsed_ms -= self.frame_ms;
            if self.current_frame + 1 < self.frame_count {
                self.current_frame += 1;
            } else if self.looping {
                self.current_frame = 0;
            } else {
                self.playing = false;
                self.finished = true;
                break;
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
