//! # Properties 模块
//!
//! 状态属性快照。
//!
//! 快照是扁平化的属性集合，每个字段都是可选的：
//! **缺失表示"保持不变"，而不是"重置为 0"**。

use serde::{Deserialize, Serialize};

/// 可插值的数值属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericProperty {
    PositionX,
    PositionY,
    ScaleX,
    ScaleY,
    Rotation,
    Width,
    Height,
    Alpha,
    TintR,
    TintG,
    TintB,
    TintAmount,
}

impl NumericProperty {
    /// 全部数值属性
    pub const ALL: [NumericProperty; 12] = [
        Self::PositionX,
        Self::PositionY,
        Self::ScaleX,
        Self::ScaleY,
        Self::Rotation,
        Self::Width,
        Self::Height,
        Self::Alpha,
        Self::TintR,
        Self::TintG,
        Self::TintB,
        Self::TintAmount,
    ];

    /// 属性名称（用于日志和调试）
    pub fn name(&self) -> &'static str {
        match self {
            Self::PositionX => "position_x",
            Self::PositionY => "position_y",
            Self::ScaleX => "scale_x",
            Self::ScaleY => "scale_y",
            Self::Rotation => "rotation",
            Self::Width => "width",
            Self::Height => "height",
            Self::Alpha => "alpha",
            Self::TintR => "tint_r",
            Self::TintG => "tint_g",
            Self::TintB => "tint_b",
            Self::TintAmount => "tint_amount",
        }
    }
}

impl std::fmt::Display for NumericProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 扁平化的状态属性快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f32>,
    /// 旋转角度（弧度）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// 透明度 (0.0 - 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
    /// 着色颜色红色通道（归一化）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint_r: Option<f32>,
    /// 着色颜色绿色通道（归一化）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint_g: Option<f32>,
    /// 着色颜色蓝色通道（归一化）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint_b: Option<f32>,
    /// 着色强度 (0.0 - 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint_amount: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl StateProperties {
    /// 空快照
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取数值属性
    pub fn get(&self, property: NumericProperty) -> Option<f32> {
        match property {
            NumericProperty::PositionX => self.position_x,
            NumericProperty::PositionY => self.position_y,
            NumericProperty::ScaleX => self.scale_x,
            NumericProperty::ScaleY => self.scale_y,
            NumericProperty::Rotation => self.rotation,
            NumericProperty::Width => self.width,
            NumericProperty::Height => self.height,
            NumericProperty::Alpha => self.alpha,
            NumericProperty::TintR => self.tint_r,
            NumericProperty::TintG => self.tint_g,
            NumericProperty::TintB => self.tint_b,
            NumericProperty::TintAmount => self.tint_amount,
        }
    }

    /// 写入数值属性
    pub fn set(&mut self, property: NumericProperty, value: Option<f32>) {
        let slot = match property {
            NumericProperty::PositionX => &mut self.position_x,
            NumericProperty::PositionY => &mut self.position_y,
            NumericProperty::ScaleX => &mut self.scale_x,
            NumericProperty::ScaleY => &mut self.scale_y,
            NumericProperty::Rotation => &mut self.rotation,
            NumericProperty::Width => &mut self.width,
            NumericProperty::Height => &mut self.height,
            NumericProperty::Alpha => &mut self.alpha,
            NumericProperty::TintR => &mut self.tint_r,
            NumericProperty::TintG => &mut self.tint_g,
            NumericProperty::TintB => &mut self.tint_b,
            NumericProperty::TintAmount => &mut self.tint_amount,
        };
        *slot = value;
    }

    /// 是否包含着色颜色的任一通道
    pub fn has_tint(&self) -> bool {
        self.tint_r.is_some() || self.tint_g.is_some() || self.tint_b.is_some()
    }

    /// 是否没有任何字段
    pub fn is_empty(&self) -> bool {
        NumericProperty::ALL.iter().all(|p| self.get(*p).is_none()) && self.visible.is_none()
    }

    /// 已设置的数值属性
    pub fn numeric_fields(&self) -> impl Iterator<Item = (NumericProperty, f32)> + '_ {
        NumericProperty::ALL
            .iter()
            .filter_map(|p| self.get(*p).map(|v| (*p, v)))
    }

    /// 用 `other` 中已设置的字段覆盖自身
    pub fn merge(&mut self, other: &StateProperties) {
        for (property, value) in other.numeric_fields() {
            self.set(property, Some(value));
        }
        if other.visible.is_some() {
            self.visible = other.visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut p = StateProperties::new();
        assert!(p.is_empty());

        p.set(NumericProperty::Alpha, Some(0.5));
        assert_eq!(p.alpha, Some(0.5));
        assert_eq!(p.get(NumericProperty::Alpha), Some(0.5));
        assert!(!p.is_empty());

        p.set(NumericProperty::Alpha, None);
        assert!(p.is_empty());
    }

    #[test]
    fn test_every_property_is_addressable() {
        let mut p = StateProperties::new();
        for (i, property) in NumericProperty::ALL.iter().enumerate() {
            p.set(*property, Some(i as f32));
        }
        for (i, property) in NumericProperty::ALL.iter().enumerate() {
            assert_eq!(p.get(*property), Some(i as f32), "{}", property);
        }
    }

    #[test]
    fn test_merge() {
        let mut base = StateProperties {
            position_x: Some(1.0),
            alpha: Some(1.0),
            ..Default::default()
        };
        let overlay = StateProperties {
            alpha: Some(0.0),
            visible: Some(false),
            ..Default::default()
        };

        base.merge(&overlay);
        assert_eq!(base.position_x, Some(1.0));
        assert_eq!(base.alpha, Some(0.0));
        assert_eq!(base.visible, Some(false));
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let p = StateProperties {
            scale_x: Some(2.0),
            visible: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"scale_x":2.0,"visible":true}"#);

        let back: StateProperties = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
