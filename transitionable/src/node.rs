//! # Node 模块
//!
//! 可过渡节点：拥有一组命名状态和状态之间的过渡，
//! 切换当前状态时自动播放对应的过渡。
//!
//! ## 状态切换规则
//!
//! - 第一个创建的状态立即成为当前状态（直接安装，不播放过渡）
//! - 切换到当前状态是无操作
//! - 过渡播放期间切换：排队一个从进行中过渡的终点出发的过渡，
//!   队列深度为 1，新的请求替换旧的
//! - 过渡完成后自动播放排队的过渡
//! - 切换会先传播给所有附属的可过渡子节点
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let registry = TweenRegistry::new();
//! let button = TransitionableNode::new(SceneNode::new(), &registry);
//!
//! button.state("up")?.set_scale(1.0);
//! button.state("over")?.set_scale(1.25).set_tint(0xFFFF80).set_tint_amount(0.5);
//! button.transition("up", "over")?.set_duration(150.0);
//!
//! button.set_current("over")?;
//! loop {
//!     registry.update(16.0);
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, error};

use crate::config::{NodeConfig, TransitionDefaults};
use crate::error::{ConfigError, TransitionError, TransitionResult};
use crate::properties::StateProperties;
use crate::scene::SceneNode;
use crate::state::StateRecord;
use crate::target::{HostNode, NodeTarget};
use crate::transition::{Completion, Transition};
use crate::tween::TweenRegistry;

struct NodeData<H: HostNode> {
    /// 可视表面
    target: Rc<NodeTarget<H>>,
    /// 逐帧调度器
    registry: TweenRegistry,
    /// 新建过渡的默认参数
    defaults: TransitionDefaults,
    /// 状态（名称 -> 状态）
    states: HashMap<String, StateRecord<H>>,
    /// 状态的创建顺序
    state_order: Vec<String>,
    /// 过渡（(起始, 目标) -> 过渡）
    transitions: HashMap<(String, String), Transition<H>>,
    /// 当前状态名
    current: Option<String>,
    /// 正在播放的过渡
    in_flight: Option<Transition<H>>,
    /// 排队的过渡
    queued: Option<Transition<H>>,
    /// 附属的可过渡子节点
    children: Vec<TransitionableNode<H>>,
}

/// 可过渡节点
///
/// 共享句柄，克隆得到同一个节点。
pub struct TransitionableNode<H: HostNode = SceneNode> {
    inner: Rc<RefCell<NodeData<H>>>,
}

impl<H: HostNode> Clone for TransitionableNode<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: HostNode> std::fmt::Debug for TransitionableNode<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("TransitionableNode")
            .field("current", &data.current)
            .field("states", &data.state_order)
            .field("transitions", &data.transitions.len())
            .field("transitioning", &data.in_flight.is_some())
            .field("queued", &data.queued.is_some())
            .field("children", &data.children.len())
            .finish()
    }
}

impl<H: HostNode> TransitionableNode<H> {
    /// 创建节点
    pub fn new(host: H, registry: &TweenRegistry) -> Self {
        Self::with_defaults(host, registry, TransitionDefaults::default())
    }

    /// 创建节点，指定新建过渡的默认参数
    pub fn with_defaults(host: H, registry: &TweenRegistry, defaults: TransitionDefaults) -> Self {
        Self {
            inner: Rc::new(RefCell::new(NodeData {
                target: Rc::new(NodeTarget::new(host)),
                registry: registry.clone(),
                defaults,
                states: HashMap::new(),
                state_order: Vec::new(),
                transitions: HashMap::new(),
                current: None,
                in_flight: None,
                queued: None,
                children: Vec::new(),
            })),
        }
    }

    /// 宿主节点
    pub fn host(&self) -> H {
        self.inner.borrow().target.host().clone()
    }

    pub fn registry(&self) -> TweenRegistry {
        self.inner.borrow().registry.clone()
    }

    pub fn defaults(&self) -> TransitionDefaults {
        self.inner.borrow().defaults
    }

    /// 是否为同一个节点
    pub fn ptr_eq(&self, other: &TransitionableNode<H>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ========== 状态与过渡 ==========

    /// 获取状态，不存在时创建
    ///
    /// 节点的第一个状态立即成为当前状态并安装，同时传播给已附属的子节点。
    pub fn state(&self, name: &str) -> TransitionResult<StateRecord<H>> {
        if name.is_empty() {
            return Err(TransitionError::EmptyStateName);
        }

        let (state, first, children) = {
            let mut data = self.inner.borrow_mut();
            if let Some(state) = data.states.get(name) {
                return Ok(state.clone());
            }

            let state = StateRecord::new(name, data.target.clone());
            data.states.insert(name.to_string(), state.clone());
            data.state_order.push(name.to_string());

            let first = data.current.is_none();
            if first {
                data.current = Some(name.to_string());
            }
            (state, first, data.children.clone())
        };

        debug!(state = %name, first, "创建状态");
        if first {
            state.install();
            for child in &children {
                child.set_current(name)?;
            }
        }
        Ok(state)
    }

    /// 查找已存在的状态
    pub fn find_state(&self, name: &str) -> Option<StateRecord<H>> {
        self.inner.borrow().states.get(name).cloned()
    }

    /// 状态名（按创建顺序）
    pub fn state_names(&self) -> Vec<String> {
        self.inner.borrow().state_order.clone()
    }

    /// 获取过渡，不存在时以默认参数创建（两端的状态也会被创建）
    pub fn transition(&self, from: &str, to: &str) -> TransitionResult<Transition<H>> {
        let key = (from.to_string(), to.to_string());
        if let Some(transition) = self.inner.borrow().transitions.get(&key) {
            return Ok(transition.clone());
        }

        let from_state = self.state(from)?;
        let to_state = self.state(to)?;
        let transition = Transition::new(from_state, to_state)?;

        let defaults = self.defaults();
        transition
            .set_duration(defaults.duration_ms)
            .set_easing(defaults.easing);

        debug!(from = %from, to = %to, "创建过渡");
        self.inner
            .borrow_mut()
            .transitions
            .insert(key, transition.clone());
        Ok(transition)
    }

    // ========== 当前状态 ==========

    /// 当前状态名
    pub fn current(&self) -> Option<String> {
        self.inner.borrow().current.clone()
    }

    /// 切换当前状态
    ///
    /// 切换先传播给所有附属的可过渡子节点；未知的状态名会创建一个空状态。
    pub fn set_current(&self, name: &str) -> TransitionResult<()> {
        if name.is_empty() {
            return Err(TransitionError::EmptyStateName);
        }

        let children = self.inner.borrow().children.clone();
        for child in &children {
            child.set_current(name)?;
        }

        if self.current().as_deref() == Some(name) {
            return Ok(());
        }

        self.state(name)?;

        // 第一个状态在上一步已经成为当前状态
        let (previous, in_flight) = {
            let data = self.inner.borrow();
            if data.current.as_deref() == Some(name) {
                return Ok(());
            }
            (data.current.clone(), data.in_flight.clone())
        };

        if let Some(in_flight) = in_flight {
            let destination = in_flight.to_name();
            let queued = if destination == name {
                None
            } else {
                Some(self.transition(&destination, name)?)
            };

            debug!(
                from = %destination,
                to = %name,
                cleared = queued.is_none(),
                "过渡进行中，更新排队"
            );
            let mut data = self.inner.borrow_mut();
            data.queued = queued;
            data.current = Some(name.to_string());
            return Ok(());
        }

        let Some(previous) = previous else {
            let state = self.state(name)?;
            self.inner.borrow_mut().current = Some(name.to_string());
            state.install();
            return Ok(());
        };

        let transition = self.transition(&previous, name)?;
        self.start(transition)?;
        self.inner.borrow_mut().current = Some(name.to_string());
        Ok(())
    }

    /// 播放过渡并在完成时处理排队
    fn start(&self, transition: Transition<H>) -> TransitionResult<()> {
        let registry = self.registry();
        self.inner.borrow_mut().in_flight = Some(transition.clone());

        let completion = match transition.play(&registry) {
            Ok(completion) => completion,
            Err(e) => {
                self.inner.borrow_mut().in_flight = None;
                return Err(e);
            }
        };
        self.watch(&completion);
        Ok(())
    }

    fn watch(&self, completion: &Completion) {
        let weak: Weak<RefCell<NodeData<H>>> = Rc::downgrade(&self.inner);
        completion.subscribe(move || {
            if let Some(inner) = weak.upgrade() {
                TransitionableNode { inner }.on_transition_complete();
            }
        });
    }

    fn on_transition_complete(&self) {
        let queued = {
            let mut data = self.inner.borrow_mut();
            data.in_flight = None;
            data.queued.take()
        };

        if let Some(next) = queued {
            debug!(from = %next.from_name(), to = %next.to_name(), "播放排队的过渡");
            let reached = next.from_name();
            if let Err(e) = self.start(next) {
                error!(error = %e, "播放排队的过渡失败");
                // 节点停在刚完成的过渡终点
                self.inner.borrow_mut().current = Some(reached);
            }
        }
    }

    /// 是否有过渡正在播放
    pub fn is_transitioning(&self) -> bool {
        self.inner.borrow().in_flight.is_some()
    }

    /// 正在播放的过渡
    pub fn active_transition(&self) -> Option<Transition<H>> {
        self.inner.borrow().in_flight.clone()
    }

    /// 排队的过渡
    pub fn queued_transition(&self) -> Option<Transition<H>> {
        self.inner.borrow().queued.clone()
    }

    /// 把属性快照直接写到宿主节点上
    pub fn set_state_properties(&self, properties: &StateProperties) {
        let target = self.inner.borrow().target.clone();
        target.apply(properties);
    }

    // ========== 着色 ==========

    /// 着色颜色（0xRRGGBB）
    pub fn tint(&self) -> u32 {
        self.inner.borrow().target.tint()
    }

    pub fn set_tint(&self, tint: u32) {
        let target = self.inner.borrow().target.clone();
        target.set_tint(tint);
    }

    /// 着色强度
    pub fn tint_amount(&self) -> f32 {
        self.inner.borrow().target.tint_amount()
    }

    pub fn set_tint_amount(&self, amount: f32) {
        let target = self.inner.borrow().target.clone();
        target.set_tint_amount(amount);
    }

    // ========== 子节点 ==========

    /// 附属的可过渡子节点
    pub fn transitionable_children(&self) -> Vec<TransitionableNode<H>> {
        self.inner.borrow().children.clone()
    }

    /// 添加可过渡子节点
    ///
    /// 子节点同时挂到宿主节点上；当前状态已确定时，子节点立即切换到同名状态。
    pub fn add_transitionable_child(&self, child: &TransitionableNode<H>) -> TransitionResult<()> {
        let (target, current) = {
            let mut data = self.inner.borrow_mut();
            if !data.children.iter().any(|c| c.ptr_eq(child)) {
                data.children.push(child.clone());
            }
            (data.target.clone(), data.current.clone())
        };

        target.add_child(&child.host());
        if let Some(current) = current {
            child.set_current(&current)?;
        }
        Ok(())
    }

    /// 移除可过渡子节点
    pub fn remove_transitionable_child(&self, child: &TransitionableNode<H>) {
        let target = {
            let mut data = self.inner.borrow_mut();
            data.children.retain(|c| !c.ptr_eq(child));
            data.target.clone()
        };
        target.remove_child(&child.host());
    }

    // ========== 配置 ==========

    /// 按配置声明状态和过渡
    ///
    /// 配置的默认参数替换节点的默认参数，只影响之后新建的过渡。
    pub fn apply_config(&self, config: &NodeConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.inner.borrow_mut().defaults = config.defaults;

        if let Some(initial) = &config.initial_state {
            self.state(initial)?;
        }

        for (name, state_config) in &config.states {
            let state = self.state(name)?;
            state_config.apply_to(&state);
        }

        for tc in &config.transitions {
            let transition = self.transition(&tc.from, &tc.to)?;
            if let Some(duration) = tc.duration_ms {
                transition.set_duration(duration);
            }
            if let Some(easing) = tc.easing {
                transition.set_easing(easing);
            }
        }

        if let Some(initial) = &config.initial_state {
            self.set_current(initial)?;
        }

        debug!(
            states = config.states.len(),
            transitions = config.transitions.len(),
            "应用节点配置"
        );
        Ok(())
    }
}
