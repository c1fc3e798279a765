//! # 状态切换集成测试
//!
//! 测试 TransitionableNode → Transition → TweenRegistry → SceneNode 的链路。
//! 所有时间推进都通过注册表的 `update` 完成，不依赖真实时钟。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use transitionable::{
    ClipHandle, EasingFunction, FrameClip, NodeConfig, OverlayClip, RegistryEvent, SceneNode,
    TransitionableNode, TweenRegistry,
};

const FRAME_MS: f32 = 16.0;

/// 推进注册表直到没有活跃任务
fn run_until_idle(registry: &TweenRegistry) -> usize {
    let mut frames = 0;
    while registry.has_active_tasks() {
        registry.update(FRAME_MS);
        frames += 1;
        assert!(frames < 10_000, "注册表没有停下来");
    }
    frames
}

/// 创建带 up / over / down 三个状态的按钮
fn button(registry: &TweenRegistry) -> (TransitionableNode, SceneNode) {
    let host = SceneNode::with_label("button");
    let node = TransitionableNode::new(host.clone(), registry);
    node.state("up").unwrap().set_alpha(1.0).set_x(0.0);
    node.state("over").unwrap().set_alpha(0.5).set_x(50.0);
    node.state("down").unwrap().set_alpha(0.0).set_x(100.0);
    (node, host)
}

/// 统计过渡完成次数
fn count_completions(node: &TransitionableNode, from: &str, to: &str) -> Rc<Cell<usize>> {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    node.transition(from, to)
        .unwrap()
        .set_on_complete(move || counter.set(counter.get() + 1));
    calls
}

/// 第一个状态立即生效，不产生过渡
#[test]
fn test_first_state_installed_without_transition() {
    let registry = TweenRegistry::new();
    let host = SceneNode::new();
    let node = TransitionableNode::new(host.clone(), &registry);

    let a = node.state("a").unwrap();
    a.set_scale(2.0);

    assert_eq!(node.current().as_deref(), Some("a"));
    assert!(a.is_installed());
    assert_eq!(host.scale(), (2.0, 2.0));
    assert!(!registry.has_active_tasks());
}

/// 切换到当前状态不创建过渡，也没有完成通知
#[test]
fn test_set_current_to_current_is_silent() {
    let registry = TweenRegistry::new();
    let (node, _) = button(&registry);
    let calls = count_completions(&node, "up", "over");

    node.set_current("up").unwrap();

    assert!(!node.is_transitioning());
    assert!(registry.update(FRAME_MS).is_empty());
    assert_eq!(calls.get(), 0);
}

/// 过渡中切换：当前过渡继续，结束后自动播放排队的过渡
#[test]
fn test_queued_transition_follows_in_flight() {
    let registry = TweenRegistry::new();
    let (node, host) = button(&registry);
    let up_over = count_completions(&node, "up", "over");
    let over_down = count_completions(&node, "over", "down");

    node.set_current("over").unwrap();
    registry.update(FRAME_MS);
    node.set_current("down").unwrap();

    assert_eq!(node.current().as_deref(), Some("down"));
    let active = node.active_transition().unwrap();
    assert_eq!((active.from_name(), active.to_name()), ("up".into(), "over".into()));
    let queued = node.queued_transition().unwrap();
    assert_eq!((queued.from_name(), queued.to_name()), ("over".into(), "down".into()));

    run_until_idle(&registry);

    assert_eq!(up_over.get(), 1);
    assert_eq!(over_down.get(), 1);
    assert!(!node.is_transitioning());
    assert!(node.queued_transition().is_none());
    assert_eq!(host.position().0, 100.0);
    assert_eq!(host.alpha(), 0.0);
    assert!(node.state("down").unwrap().is_installed());
    assert!(!node.state("over").unwrap().is_installed());
}

/// 连续两次排队只保留最后一次，起点是进行中过渡的终点
#[test]
fn test_queue_depth_is_one() {
    let registry = TweenRegistry::new();
    let (node, _) = button(&registry);
    node.state("hidden").unwrap().set_visible(false);
    let over_down = count_completions(&node, "over", "down");
    let over_hidden = count_completions(&node, "over", "hidden");

    node.set_current("over").unwrap();
    node.set_current("down").unwrap();
    node.set_current("hidden").unwrap();

    let queued = node.queued_transition().unwrap();
    assert_eq!(queued.from_name(), "over");
    assert_eq!(queued.to_name(), "hidden");

    run_until_idle(&registry);

    assert_eq!(over_down.get(), 0);
    assert_eq!(over_hidden.get(), 1);
    assert_eq!(node.current().as_deref(), Some("hidden"));
}

/// 过渡中切回进行中过渡的终点：清空排队
#[test]
fn test_requeue_to_destination_clears_queue() {
    let registry = TweenRegistry::new();
    let (node, _) = button(&registry);

    node.set_current("over").unwrap();
    node.set_current("down").unwrap();
    assert!(node.queued_transition().is_some());

    node.set_current("over").unwrap();
    assert!(node.queued_transition().is_none());
    assert_eq!(node.current().as_deref(), Some("over"));

    run_until_idle(&registry);
    assert!(node.state("over").unwrap().is_installed());
}

/// 排队的过渡在下一帧开始，不在完成回调内同步推进
#[test]
fn test_registry_events_for_chained_transitions() {
    let registry = TweenRegistry::new();
    let (node, _) = button(&registry);
    node.transition("up", "over").unwrap().set_duration(32.0);
    node.transition("over", "down").unwrap().set_duration(32.0);

    node.set_current("over").unwrap();
    node.set_current("down").unwrap();

    let mut started = 0;
    let mut finished = 0;
    for _ in 0..20 {
        for event in registry.update(FRAME_MS) {
            match event {
                RegistryEvent::Started(_) => started += 1,
                RegistryEvent::Finished(_) => finished += 1,
            }
        }
    }
    assert_eq!(started, 2);
    assert_eq!(finished, 2);
}

/// 状态只写入显式设置的字段，安装时不改动其它字段
#[test]
fn test_install_leaves_omitted_fields_untouched() {
    let registry = TweenRegistry::new();
    let host = SceneNode::new();
    let node = TransitionableNode::new(host.clone(), &registry);

    node.state("base").unwrap().set_rotation(0.5).set_width(80.0);
    node.state("moved").unwrap().set_position(10.0, 20.0);

    let props = node.state("moved").unwrap().properties();
    assert_eq!(props.position_x, Some(10.0));
    assert_eq!(props.rotation, None);
    assert_eq!(props.width, None);
    assert_eq!(props.alpha, None);

    node.set_current("moved").unwrap();
    run_until_idle(&registry);

    assert_eq!(host.position(), (10.0, 20.0));
    assert_eq!(host.rotation(), 0.5);
    assert_eq!(host.size().0, 80.0);
}

/// 当前状态确定后添加子节点：子节点立即切换到同名状态
#[test]
fn test_add_child_after_current_set() {
    let registry = TweenRegistry::new();
    let (parent, parent_host) = button(&registry);

    let child_host = SceneNode::with_label("label");
    let child = TransitionableNode::new(child_host.clone(), &registry);
    child.state("idle").unwrap();
    child.state("up").unwrap().set_alpha(0.25);

    parent.add_transitionable_child(&child).unwrap();

    assert!(parent_host.contains_child(&child_host));
    assert_eq!(child.current().as_deref(), Some("up"));
    run_until_idle(&registry);
    assert_eq!(child_host.alpha(), 0.25);
}

/// 切换会先传播给子节点
#[test]
fn test_set_current_propagates_to_children() {
    let registry = TweenRegistry::new();
    let (parent, _) = button(&registry);

    let child = TransitionableNode::new(SceneNode::new(), &registry);
    child.state("up").unwrap();
    child.state("down").unwrap().set_scale(0.5);
    parent.add_transitionable_child(&child).unwrap();

    parent.set_current("down").unwrap();
    assert_eq!(child.current().as_deref(), Some("down"));
    assert!(child.is_transitioning());

    run_until_idle(&registry);
    assert_eq!(child.host().scale(), (0.5, 0.5));

    parent.remove_transitionable_child(&child);
    parent.set_current("up").unwrap();
    assert_eq!(child.current().as_deref(), Some("down"));
    assert!(!parent.host().contains_child(&child.host()));
}

/// 着色通道随过渡插值
#[test]
fn test_tint_interpolates() {
    let registry = TweenRegistry::new();
    let host = SceneNode::new();
    let node = TransitionableNode::new(host.clone(), &registry);

    node.state("plain")
        .unwrap()
        .set_tint(0x000000)
        .set_tint_amount(0.0);
    node.state("red")
        .unwrap()
        .set_tint(0xFF0000)
        .set_tint_amount(1.0);
    node.transition("plain", "red")
        .unwrap()
        .set_duration(100.0)
        .set_easing(EasingFunction::Linear);

    node.set_current("red").unwrap();
    registry.update(50.0);
    assert_eq!(node.tint(), 0x800000);
    assert!((node.tint_amount() - 0.5).abs() < 1e-6);

    registry.update(50.0);
    assert_eq!(node.tint(), 0xFF0000);
    assert_eq!(node.tint_amount(), 1.0);
    assert_eq!(
        host.color_matrix(),
        Some(transitionable::color::tint(0xFF0000, 1.0))
    );
}

/// 叠加动画播放完才算完成
#[test]
fn test_overlay_clip_delays_completion() {
    let registry = TweenRegistry::new();
    let (node, host) = button(&registry);

    let clip = FrameClip::new(10, 10.0).into_handle();
    let handle: ClipHandle<SceneNode> = clip.clone();
    let transition = node.transition("up", "over").unwrap();
    transition.set_duration(100.0).add_movie_clip(handle);

    let display = clip.borrow().display();
    node.set_current("over").unwrap();
    assert!(host.contains_child(&display));

    registry.update(200.0);
    assert!(node.is_transitioning());
    assert!(!node.state("over").unwrap().is_installed());

    run_until_idle(&registry);
    assert!(!node.is_transitioning());
    assert!(!host.contains_child(&display));
    assert!(clip.borrow().is_finished());
}

/// 完成回调里切换状态
#[test]
fn test_set_current_from_completion_callback() {
    let registry = TweenRegistry::new();
    let (node, _) = button(&registry);

    let slot = Rc::new(RefCell::new(Some(node.clone())));
    node.transition("up", "over").unwrap().set_on_complete(move || {
        if let Some(node) = slot.borrow_mut().take() {
            node.set_current("down").unwrap();
        }
    });

    node.set_current("over").unwrap();
    run_until_idle(&registry);

    assert_eq!(node.current().as_deref(), Some("down"));
    assert!(node.state("down").unwrap().is_installed());
}

/// 实时编辑已安装状态
#[test]
fn test_live_edit_installed_state() {
    let registry = TweenRegistry::new();
    let (node, host) = button(&registry);

    node.state("up").unwrap().position().set("y", 42.0).unwrap();
    assert_eq!(host.position().1, 42.0);

    // 未安装的状态不影响宿主
    node.state("down").unwrap().set_alpha(0.9);
    assert_eq!(host.alpha(), 1.0);
}

/// 从配置构建节点并驱动
#[test]
fn test_config_driven_button() {
    let registry = TweenRegistry::new();
    let host = SceneNode::new();
    let node = TransitionableNode::new(host.clone(), &registry);

    let config = NodeConfig::from_json_str(
        r#"{
            "defaults": { "duration_ms": 64, "easing": "linear" },
            "initial_state": "up",
            "states": {
                "up":   { "scale": 1.0, "tint": 16777215, "tint_amount": 0.0 },
                "over": { "scale": 1.25, "tint": 16777088, "tint_amount": 0.5 }
            }
        }"#,
    )
    .unwrap();
    node.apply_config(&config).unwrap();

    node.set_current("over").unwrap();
    let frames = run_until_idle(&registry);

    assert_eq!(frames, 4);
    assert_eq!(host.scale(), (1.25, 1.25));
    assert_eq!(node.tint(), 0xFFFF80);
    assert_eq!(node.tint_amount(), 0.5);
}

/// 清空注册表时进行中的过渡立即完成，节点可以继续切换
#[test]
fn test_clear_registry_mid_transition() {
    let registry = TweenRegistry::new();
    let (node, host) = button(&registry);
    let calls = count_completions(&node, "up", "over");

    node.set_current("over").unwrap();
    registry.update(FRAME_MS);
    assert!(node.is_transitioning());

    registry.clear();
    assert!(!node.is_transitioning());
    assert!(node.state("over").unwrap().is_installed());
    assert_eq!(host.alpha(), 0.5);
    assert_eq!(calls.get(), 1);

    node.set_current("down").unwrap();
    assert!(node.is_transitioning());
    run_until_idle(&registry);
    assert!(node.state("down").unwrap().is_installed());
    assert_eq!(host.alpha(), 0.0);
    assert_eq!(host.position().0, 100.0);
}

/// 清空时排队的过渡接着播放
#[test]
fn test_clear_registry_promotes_queue() {
    let registry = TweenRegistry::new();
    let (node, host) = button(&registry);

    node.set_current("over").unwrap();
    node.set_current("down").unwrap();
    registry.clear();

    let active = node.active_transition().unwrap();
    assert_eq!(active.from_name(), "over");
    assert_eq!(active.to_name(), "down");
    assert!(registry.has_active_tasks());

    run_until_idle(&registry);
    assert_eq!(node.current().as_deref(), Some("down"));
    assert_eq!(host.alpha(), 0.0);
}
