//! # Easing 模块
//!
//! 过渡使用的缓动曲线。
//!
//! 每个曲线族（二次、三次、正弦等）只定义缓入形状 `f(t)`，
//! 缓出和缓入缓出由它镜像得到：
//!
//! ```text
//! out(t)    = 1 - f(1 - t)
//! in_out(t) = f(2t) / 2              (t < 0.5)
//!           = 1 - f(2 - 2t) / 2      (t >= 0.5)
//! ```
//!
//! 默认曲线是二次缓入缓出。

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// 缓动函数
///
/// 配置文件中使用 snake_case 名称，如 `"ease_in_out_quad"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    EaseInQuad,
    EaseOutQuad,
    /// 二次缓入缓出
    #[default]
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    /// 弹性缓出（越过终点后回弹）
    EaseOutElastic,
    /// 弹跳缓出
    EaseOutBounce,
}

/// 曲线方向
#[derive(Clone, Copy)]
enum Mode {
    In,
    Out,
    InOut,
}

impl Mode {
    fn shape(self, f: fn(f32) -> f32, t: f32) -> f32 {
        match self {
            Mode::In => f(t),
            Mode::Out => 1.0 - f(1.0 - t),
            Mode::InOut if t < 0.5 => f(2.0 * t) / 2.0,
            Mode::InOut => 1.0 - f(2.0 - 2.0 * t) / 2.0,
        }
    }
}

fn quad(t: f32) -> f32 {
    t * t
}

fn cubic(t: f32) -> f32 {
    t * t * t
}

fn sine(t: f32) -> f32 {
    1.0 - (t * PI / 2.0).cos()
}

impl EasingFunction {
    /// 全部缓动函数
    pub const ALL: [EasingFunction; 12] = [
        Self::Linear,
        Self::EaseInQuad,
        Self::EaseOutQuad,
        Self::EaseInOutQuad,
        Self::EaseInCubic,
        Self::EaseOutCubic,
        Self::EaseInOutCubic,
        Self::EaseInSine,
        Self::EaseOutSine,
        Self::EaseInOutSine,
        Self::EaseOutElastic,
        Self::EaseOutBounce,
    ];

    /// 配置文件中使用的名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseInQuad => "ease_in_quad",
            Self::EaseOutQuad => "ease_out_quad",
            Self::EaseInOutQuad => "ease_in_out_quad",
            Self::EaseInCubic => "ease_in_cubic",
            Self::EaseOutCubic => "ease_out_cubic",
            Self::EaseInOutCubic => "ease_in_out_cubic",
            Self::EaseInSine => "ease_in_sine",
            Self::EaseOutSine => "ease_out_sine",
            Self::EaseInOutSine => "ease_in_out_sine",
            Self::EaseOutElastic => "ease_out_elastic",
            Self::EaseOutBounce => "ease_out_bounce",
        }
    }

    /// 计算缓动值
    ///
    /// `t` 为时间进度，超出 `[0, 1]` 时先截断。
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseInQuad => Mode::In.shape(quad, t),
            Self::EaseOutQuad => Mode::Out.shape(quad, t),
            Self::EaseInOutQuad => Mode::InOut.shape(quad, t),
            Self::EaseInCubic => Mode::In.shape(cubic, t),
            Self::EaseOutCubic => Mode::Out.shape(cubic, t),
            Self::EaseInOutCubic => Mode::InOut.shape(cubic, t),
            Self::EaseInSine => Mode::In.shape(sine, t),
            Self::EaseOutSine => Mode::Out.shape(sine, t),
            Self::EaseInOutSine => Mode::InOut.shape(sine, t),
            Self::EaseOutElastic => elastic_out(t),
            Self::EaseOutBounce => bounce_out(t),
        }
    }
}

impl std::fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn elastic_out(t: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let period = 2.0 * PI / 3.0;
    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * period).sin() + 1.0
}

/// 四段抛物线
fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;

    let (offset, base) = if t < 1.0 / D {
        (0.0, 0.0)
    } else if t < 2.0 / D {
        (1.5 / D, 0.75)
    } else if t < 2.5 / D {
        (2.25 / D, 0.9375)
    } else {
        (2.625 / D, 0.984375)
    };
    let t = t - offset;
    N * t * t + base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_default_is_quad_in_out() {
        let easing = EasingFunction::default();
        assert_eq!(easing, EasingFunction::EaseInOutQuad);
        assert!(close(easing.apply(0.25), 0.125));
        assert!(close(easing.apply(0.5), 0.5));
        assert!(close(easing.apply(0.75), 0.875));
    }

    #[test]
    fn test_endpoints() {
        for easing in EasingFunction::ALL {
            assert!(easing.apply(0.0).abs() < 0.001, "{}", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{}", easing);
        }
    }

    #[test]
    fn test_out_mirrors_in() {
        for t in [0.1, 0.3, 0.6, 0.9] {
            let a = EasingFunction::EaseInCubic.apply(t);
            let b = EasingFunction::EaseOutCubic.apply(1.0 - t);
            assert!(close(a, 1.0 - b));
        }
    }

    #[test]
    fn test_in_out_symmetric() {
        for easing in [
            EasingFunction::EaseInOutQuad,
            EasingFunction::EaseInOutCubic,
            EasingFunction::EaseInOutSine,
        ] {
            assert!(close(easing.apply(0.5), 0.5), "{}", easing);
            assert!(close(easing.apply(0.2), 1.0 - easing.apply(0.8)), "{}", easing);
        }
    }

    #[test]
    fn test_clamp() {
        let easing = EasingFunction::Linear;
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
    }

    #[test]
    fn test_elastic_overshoots() {
        let peak = (1..100)
            .map(|i| EasingFunction::EaseOutElastic.apply(i as f32 / 100.0))
            .fold(0.0_f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_bounce_stays_in_range() {
        for i in 0..=100 {
            let v = EasingFunction::EaseOutBounce.apply(i as f32 / 100.0);
            assert!((0.0..=1.0 + 1e-5).contains(&v));
        }
    }

    #[test]
    fn test_serde_names() {
        for easing in EasingFunction::ALL {
            let json = serde_json::to_string(&easing).unwrap();
            assert_eq!(json, format!("\"{}\"", easing.name()));
        }

        let parsed: EasingFunction = serde_json::from_str(r#""ease_out_bounce""#).unwrap();
        assert_eq!(parsed, EasingFunction::EaseOutBounce);
    }
}
