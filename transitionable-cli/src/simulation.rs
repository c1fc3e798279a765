//! # Simulation 模块
//!
//! 在模拟时钟上驱动一个 `SceneNode` 节点，记录每个注册表事件时的节点快照。

use serde::Serialize;
use tracing::{info, warn};
use transitionable::{NodeConfig, RegistryEvent, SceneNode, TransitionableNode, TweenRegistry};

use crate::config::SimulationConfig;

/// 事件发生时的节点快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// 模拟时间（毫秒）
    pub time_ms: f32,
    /// 事件描述
    pub event: String,
    /// 当前状态
    pub current: Option<String>,
    /// 是否有过渡正在播放
    pub transitioning: bool,
    pub position: (f32, f32),
    pub scale: (f32, f32),
    pub rotation: f32,
    pub size: (f32, f32),
    pub alpha: f32,
    pub visible: bool,
    /// 着色颜色（#RRGGBB）
    pub tint: String,
    pub tint_amount: f32,
}

impl FrameReport {
    fn capture(time_ms: f32, event: String, node: &TransitionableNode) -> Self {
        let host = node.host();
        Self {
            time_ms,
            event,
            current: node.current(),
            transitioning: node.is_transitioning(),
            position: host.position(),
            scale: host.scale(),
            rotation: host.rotation(),
            size: host.size(),
            alpha: host.alpha(),
            visible: host.visible(),
            tint: format!("#{:06X}", node.tint()),
            tint_amount: node.tint_amount(),
        }
    }
}

impl std::fmt::Display for FrameReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:>7.1}ms] {:<18} current={:<8} pos=({:.2}, {:.2}) scale=({:.3}, {:.3}) alpha={:.3} tint={}@{:.3}{}",
            self.time_ms,
            self.event,
            self.current.as_deref().unwrap_or("-"),
            self.position.0,
            self.position.1,
            self.scale.0,
            self.scale.1,
            self.alpha,
            self.tint,
            self.tint_amount,
            if self.visible { "" } else { " (hidden)" },
        )
    }
}

/// 运行模拟
///
/// 所有脚本步骤执行完毕且注册表空闲时结束；超过 `max_ms` 时提前结束。
pub fn run(scene: &NodeConfig, sim: &SimulationConfig) -> anyhow::Result<Vec<FrameReport>> {
    let registry = TweenRegistry::new();
    let node = TransitionableNode::new(SceneNode::with_label("node"), &registry);
    node.apply_config(scene)?;

    if let Some(initial) = &sim.initial_state {
        node.set_current(initial)?;
    }

    let mut reports = vec![FrameReport::capture(0.0, "start".to_string(), &node)];
    let mut steps = sim.steps.iter().peekable();
    let mut time_ms = 0.0_f32;

    loop {
        while let Some(step) = steps.next_if(|s| s.at_ms <= time_ms) {
            info!(time_ms, state = %step.set_current, "切换状态");
            node.set_current(&step.set_current)?;
            reports.push(FrameReport::capture(
                time_ms,
                format!("set_current {}", step.set_current),
                &node,
            ));
        }

        if steps.peek().is_none() && !registry.has_active_tasks() {
            break;
        }
        if time_ms >= sim.max_ms {
            warn!(max_ms = sim.max_ms, "模拟超时，提前结束");
            break;
        }

        time_ms += sim.frame_ms;
        for event in registry.update(sim.frame_ms) {
            let label = match event {
                RegistryEvent::Started(id) => format!("started {}", id.0),
                RegistryEvent::Finished(id) => format!("finished {}", id.0),
            };
            reports.push(FrameReport::capture(time_ms, label, &node));
        }
    }

    reports.push(FrameReport::capture(time_ms, "end".to_string(), &node));
    Ok(reports)
}
