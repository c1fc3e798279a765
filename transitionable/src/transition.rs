//! # Transition 模块
//!
//! 同一节点上两个状态之间的定时过渡。
//!
//! ## 生命周期
//!
//! ```text
//! idle --play()--> playing --补间结束且叠加动画播完--> idle
//! ```
//!
//! 播放时先卸载起始状态，再由注册表逐帧把插值结果写到目标上；
//! 结束时安装目标状态、兑现 [`Completion`]、调用完成回调。
//! 每次播放的收尾只执行一次。

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::{TransitionError, TransitionResult};
use crate::state::StateRecord;
use crate::target::{ClipHandle, HostNode, NodeTarget};
use crate::tween::{EasingFunction, FrameTask, PropertyTween, TweenRegistry};

/// 默认过渡时长（毫秒）
pub const DEFAULT_DURATION_MS: f32 = 200.0;

/// 完成回调
pub type CompleteCallback = Box<dyn FnMut()>;

#[derive(Default)]
struct CompletionInner {
    resolved: bool,
    subscribers: Vec<Box<dyn FnOnce()>>,
}

/// 单次播放的完成事件
///
/// 每次 `play()` 返回一个新的事件，最多兑现一次。
#[derive(Clone, Default)]
pub struct Completion {
    inner: Rc<RefCell<CompletionInner>>,
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Completion")
            .field("resolved", &inner.resolved)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl Completion {
    fn new() -> Self {
        Self::default()
    }

    /// 是否已兑现
    pub fn is_resolved(&self) -> bool {
        self.inner.borrow().resolved
    }

    /// 订阅完成事件
    ///
    /// 已兑现时立即执行。
    pub fn subscribe(&self, callback: impl FnOnce() + 'static) {
        if self.is_resolved() {
            callback();
            return;
        }
        self.inner.borrow_mut().subscribers.push(Box::new(callback));
    }

    fn resolve(&self) {
        let subscribers = {
            let mut inner = self.inner.borrow_mut();
            if inner.resolved {
                return;
            }
            inner.resolved = true;
            std::mem::take(&mut inner.subscribers)
        };
        for callback in subscribers {
            callback();
        }
    }
}

struct TransitionData<H: HostNode> {
    from: StateRecord<H>,
    to: StateRecord<H>,
    /// 时长（毫秒）
    duration_ms: f32,
    easing: EasingFunction,
    /// 叠加动画
    clips: Vec<ClipHandle<H>>,
    on_complete: Option<CompleteCallback>,
    playing: bool,
}

/// 状态过渡
///
/// 共享句柄，克隆得到同一个过渡。
pub struct Transition<H: HostNode> {
    inner: Rc<RefCell<TransitionData<H>>>,
}

impl<H: HostNode> Clone for Transition<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: HostNode> std::fmt::Debug for Transition<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Transition")
            .field("from", &data.from.name())
            .field("to", &data.to.name())
            .field("duration_ms", &data.duration_ms)
            .field("easing", &data.easing)
            .field("clips", &data.clips.len())
            .field("playing", &data.playing)
            .finish()
    }
}

impl<H: HostNode> Transition<H> {
    /// 创建过渡
    ///
    /// 两个状态必须属于同一节点。
    pub fn new(from: StateRecord<H>, to: StateRecord<H>) -> TransitionResult<Self> {
        if !from.same_target(&to) {
            return Err(TransitionError::TargetMismatch {
                from: from.name(),
                to: to.name(),
            });
        }

        Ok(Self {
            inner: Rc::new(RefCell::new(TransitionData {
                from,
                to,
                duration_ms: DEFAULT_DURATION_MS,
                easing: EasingFunction::default(),
                clips: Vec::new(),
                on_complete: None,
                playing: false,
            })),
        })
    }

    pub fn from_state(&self) -> StateRecord<H> {
        self.inner.borrow().from.clone()
    }

    pub fn to_state(&self) -> StateRecord<H> {
        self.inner.borrow().to.clone()
    }

    pub fn from_name(&self) -> String {
        self.inner.borrow().from.name()
    }

    pub fn to_name(&self) -> String {
        self.inner.borrow().to.name()
    }

    /// 时长（毫秒）
    pub fn duration(&self) -> f32 {
        self.inner.borrow().duration_ms
    }

    /// 设置时长（毫秒），下一次播放生效
    pub fn set_duration(&self, duration_ms: f32) -> &Self {
        self.inner.borrow_mut().duration_ms = duration_ms.max(0.0);
        self
    }

    pub fn easing(&self) -> EasingFunction {
        self.inner.borrow().easing
    }

    /// 设置缓动函数，下一次播放生效
    pub fn set_easing(&self, easing: EasingFunction) -> &Self {
        self.inner.borrow_mut().easing = easing;
        self
    }

    /// 是否正在播放
    pub fn is_playing(&self) -> bool {
        self.inner.borrow().playing
    }

    /// 是否为同一个过渡
    pub fn ptr_eq(&self, other: &Transition<H>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ========== 叠加动画 ==========

    /// 添加叠加动画
    pub fn add_movie_clip(&self, clip: ClipHandle<H>) -> &Self {
        self.inner.borrow_mut().clips.push(clip);
        self
    }

    /// 移除叠加动画
    pub fn remove_movie_clip(&self, clip: &ClipHandle<H>) -> &Self {
        let mut data = self.inner.borrow_mut();
        let before = data.clips.len();
        data.clips.retain(|c| !Rc::ptr_eq(c, clip));
        if data.clips.len() == before {
            warn!(
                from = %data.from.name(),
                to = %data.to.name(),
                "移除的叠加动画不在过渡中，已忽略"
            );
        }
        self
    }

    /// 叠加动画列表
    pub fn movie_clips(&self) -> Vec<ClipHandle<H>> {
        self.inner.borrow().clips.clone()
    }

    // ========== 完成回调 ==========

    /// 设置完成回调（替换已有回调），每次播放完成调用一次
    pub fn set_on_complete(&self, callback: impl FnMut() + 'static) -> &Self {
        self.inner.borrow_mut().on_complete = Some(Box::new(callback));
        self
    }

    /// 移除完成回调
    pub fn clear_on_complete(&self) -> &Self {
        self.inner.borrow_mut().on_complete = None;
        self
    }

    // ========== 播放 ==========

    /// 播放过渡
    ///
    /// 补间由 `registry` 逐帧推进，本函数返回时只完成了起始步骤。
    pub fn play(&self, registry: &TweenRegistry) -> TransitionResult<Completion> {
        let (from, to, clips, duration_ms, easing) = {
            let mut data = self.inner.borrow_mut();
            if data.playing {
                return Err(TransitionError::AlreadyPlaying {
                    from: data.from.name(),
                    to: data.to.name(),
                });
            }
            data.playing = true;
            (
                data.from.clone(),
                data.to.clone(),
                data.clips.clone(),
                data.duration_ms,
                data.easing,
            )
        };

        let label = format!("{} -> {}", from.name(), to.name());
        debug!(
            transition = %label,
            duration_ms,
            easing = ?easing,
            clips = clips.len(),
            "开始过渡"
        );

        from.uninstall();

        let target = from.target();
        for clip in &clips {
            let display = clip.borrow().display();
            target.add_child(&display);
            let mut clip = clip.borrow_mut();
            clip.set_looping(false);
            clip.goto_and_play(0);
        }

        let tween = PropertyTween::new(&from.properties(), &to.properties(), duration_ms, easing);
        let completion = Completion::new();

        registry.add(Box::new(TransitionDriver {
            transition: self.clone(),
            label,
            target,
            tween,
            tween_done: false,
            clips,
            completion: completion.clone(),
        }));

        Ok(completion)
    }

    /// 收尾：停止叠加动画、安装目标状态、通知完成
    fn finish(&self, target: &NodeTarget<H>, clips: &[ClipHandle<H>], completion: &Completion) {
        for clip in clips {
            let display = {
                let mut clip = clip.borrow_mut();
                clip.stop();
                clip.display()
            };
            target.remove_child(&display);
        }

        let to = self.to_state();
        to.install();

        let callback = {
            let mut data = self.inner.borrow_mut();
            data.playing = false;
            data.on_complete.take()
        };

        completion.resolve();

        if let Some(mut callback) = callback {
            callback();
            // 回调执行期间可能设置了新的回调
            let mut data = self.inner.borrow_mut();
            if data.on_complete.is_none() {
                data.on_complete = Some(callback);
            }
        }
    }
}

/// 过渡的逐帧任务
struct TransitionDriver<H: HostNode> {
    transition: Transition<H>,
    label: String,
    target: Rc<NodeTarget<H>>,
    tween: PropertyTween,
    /// 补间已结束，等待叠加动画
    tween_done: bool,
    clips: Vec<ClipHandle<H>>,
    completion: Completion,
}

impl<H: HostNode> FrameTask for TransitionDriver<H> {
    fn tick(&mut self, dt_ms: f32) -> bool {
        if !self.tween_done {
            let running = self.tween.update(dt_ms);
            self.target.apply(self.tween.values());
            self.tween_done = !running;
        }

        for clip in &self.clips {
            clip.borrow_mut().advance(dt_ms);
        }

        let clips_done = self.clips.iter().all(|clip| clip.borrow().is_finished());
        if !(self.tween_done && clips_done) {
            return true;
        }

        debug!(transition = %self.label, "过渡完成");
        self.transition
            .finish(&self.target, &self.clips, &self.completion);
        false
    }

    fn label(&self) -> String {
        format!("transition {}", self.label)
    }

    fn cancel(&mut self) {
        if !self.tween_done {
            self.tween.force_complete();
            self.target.apply(self.tween.values());
        }
        debug!(transition = %self.label, "过渡被清除，立即完成");
        self.transition
            .finish(&self.target, &self.clips, &self.completion);
    }
}
