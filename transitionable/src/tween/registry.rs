//! # Registry 模块
//!
//! 补间注册表：显式的逐帧调度器。
//!
//! 宿主每帧调用一次 [`TweenRegistry::update`]，注册表推进所有活跃任务。
//! 注册表是共享句柄（`Clone`），节点树中的所有节点持有同一个注册表。
//!
//! ```rust,ignore
//! let registry = TweenRegistry::new();
//! let node = TransitionableNode::new(SceneNode::new(), &registry);
//!
//! // 主循环
//! loop {
//!     registry.update(frame_ms);
//! }
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

/// 任务 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

impl TaskId {
    /// 创建新的任务 ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TaskId({})", self.0)
    }
}

/// 注册表事件
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// 任务加入
    Started(TaskId),
    /// 任务结束并被移除
    Finished(TaskId),
}

/// 逐帧任务
pub trait FrameTask {
    /// 推进一帧
    ///
    /// # 返回
    /// - `true`: 任务仍需继续
    /// - `false`: 任务已结束，将被移除
    fn tick(&mut self, dt_ms: f32) -> bool;

    /// 任务描述（用于日志）
    fn label(&self) -> String {
        "task".to_string()
    }

    /// 任务被 [`TweenRegistry::clear`] 丢弃前调用，用于立即收尾
    fn cancel(&mut self) {}
}

struct Entry {
    id: TaskId,
    task: Box<dyn FrameTask>,
}

#[derive(Default)]
struct RegistryInner {
    /// 活跃任务（按加入顺序）
    tasks: Vec<Entry>,
    /// 下一个任务 ID
    next_id: u64,
    /// 清空计数，用于识别更新过程中的 `clear`
    epoch: u64,
    /// 待处理的事件队列
    events: Vec<RegistryEvent>,
}

/// 补间注册表
#[derive(Clone, Default)]
pub struct TweenRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl std::fmt::Debug for TweenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenRegistry")
            .field("tasks", &self.active_count())
            .finish()
    }
}

impl TweenRegistry {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入任务
    ///
    /// 在 `update` 过程中加入的任务从下一次 `update` 开始推进。
    pub fn add(&self, task: Box<dyn FrameTask>) -> TaskId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = TaskId::new(inner.next_id);
        trace!(task = %task.label(), id = %id, "加入帧任务");
        inner.tasks.push(Entry { id, task });
        inner.events.push(RegistryEvent::Started(id));
        id
    }

    /// 推进所有任务一帧
    ///
    /// # 返回
    /// 本次更新产生的事件（包括上次更新之后 `add` 产生的 `Started`）
    pub fn update(&self, dt_ms: f32) -> Vec<RegistryEvent> {
        let (mut tasks, epoch) = {
            let mut inner = self.inner.borrow_mut();
            (std::mem::take(&mut inner.tasks), inner.epoch)
        };

        // 推进期间不持有借用：任务回调可以再次访问注册表
        let mut finished = Vec::new();
        tasks.retain_mut(|entry| {
            let alive = entry.task.tick(dt_ms);
            if !alive {
                trace!(task = %entry.task.label(), id = %entry.id, "帧任务结束");
                finished.push(entry.id);
            }
            alive
        });

        let cleared = {
            let mut inner = self.inner.borrow_mut();
            if inner.epoch == epoch {
                tasks.append(&mut inner.tasks);
                inner.tasks = tasks;
                Vec::new()
            } else {
                tasks
            }
        };
        // 更新期间被清空：幸存的任务同样需要收尾
        cancel_all(cleared);

        let mut inner = self.inner.borrow_mut();
        inner
            .events
            .extend(finished.into_iter().map(RegistryEvent::Finished));

        std::mem::take(&mut inner.events)
    }

    /// 是否有活跃任务
    pub fn has_active_tasks(&self) -> bool {
        !self.inner.borrow().tasks.is_empty()
    }

    /// 活跃任务数量
    pub fn active_count(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// 丢弃所有任务和事件
    ///
    /// 每个任务先收到一次 [`FrameTask::cancel`]，过渡借此立即完成。
    /// 收尾中新加入的任务保留到下一次 `update`。
    pub fn clear(&self) {
        let tasks = {
            let mut inner = self.inner.borrow_mut();
            inner.events.clear();
            inner.epoch += 1;
            std::mem::take(&mut inner.tasks)
        };
        cancel_all(tasks);
    }

    /// 是否与另一个句柄共享同一个注册表
    pub fn ptr_eq(&self, other: &TweenRegistry) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

fn cancel_all(tasks: Vec<Entry>) {
    for mut entry in tasks {
        trace!(task = %entry.task.label(), id = %entry.id, "帧任务被清除");
        entry.task.cancel();
    }
}
