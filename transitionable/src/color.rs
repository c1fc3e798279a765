//! # Color 模块
//!
//! 着色用的颜色矩阵工具。
//!
//! 颜色以 `0xRRGGBB` 打包的 `u32` 表示，归一化 RGB 以 `[f32; 3]` 表示，
//! 每个通道范围 0.0 - 1.0。

use serde::{Deserialize, Serialize};

/// 亮度系数（红）
pub const LUMA_R: f32 = 0.299;
/// 亮度系数（绿）
pub const LUMA_G: f32 = 0.587;
/// 亮度系数（蓝）
pub const LUMA_B: f32 = 0.114;

/// 24 位颜色的最大值
pub const MAX_COLOR: u32 = 0xFF_FFFF;

/// 4x4 颜色矩阵（行优先）
///
/// 最后一列为平移量，着色矩阵中始终为 0；最后一行保持 alpha 不变。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMatrix(pub [f32; 16]);

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl ColorMatrix {
    /// 单位矩阵
    #[rustfmt::skip]
    pub const fn identity() -> Self {
        Self([
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// 是否为单位矩阵
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// 获取第 `index` 行
    pub fn row(&self, index: usize) -> [f32; 4] {
        let start = index * 4;
        [
            self.0[start],
            self.0[start + 1],
            self.0[start + 2],
            self.0[start + 3],
        ]
    }
}

/// 着色矩阵
///
/// `amount` 为 0 时得到单位矩阵；为 1 时每个输出通道等于输入亮度
/// 乘以着色颜色对应通道。中间值在两者之间线性混合。
#[rustfmt::skip]
pub fn tint(color: u32, amount: f32) -> ColorMatrix {
    let [r, g, b] = hex2rgb(color);
    let q = 1.0 - amount;

    let r_a = amount * r;
    let g_a = amount * g;
    let b_a = amount * b;

    ColorMatrix([
        q + r_a * LUMA_R, r_a * LUMA_G, r_a * LUMA_B, 0.0,
        g_a * LUMA_R, q + g_a * LUMA_G, g_a * LUMA_B, 0.0,
        b_a * LUMA_R, b_a * LUMA_G, q + b_a * LUMA_B, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// 直接着色矩阵（兼容用）
///
/// 不做亮度混合，颜色通道直接乘到对角线上。
#[rustfmt::skip]
pub fn direct_tint(color: u32, amount: f32) -> ColorMatrix {
    let [r, g, b] = hex2rgb(color);
    let q = 1.0 - amount;

    ColorMatrix([
        q + amount * r, 0.0, 0.0, 0.0,
        0.0, q + amount * g, 0.0, 0.0,
        0.0, 0.0, q + amount * b, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// 打包颜色转归一化 RGB
pub fn hex2rgb(color: u32) -> [f32; 3] {
    [
        ((color >> 16) & 0xFF) as f32 / 255.0,
        ((color >> 8) & 0xFF) as f32 / 255.0,
        (color & 0xFF) as f32 / 255.0,
    ]
}

/// 归一化 RGB 转打包颜色
///
/// 每个通道先限制到 0.0 - 1.0，再四舍五入到 8 位。
pub fn rgb2hex(rgb: [f32; 3]) -> u32 {
    let channel = |v: f32| -> u32 { (v.clamp(0.0, 1.0) * 255.0).round() as u32 };
    (channel(rgb[0]) << 16) | (channel(rgb[1]) << 8) | channel(rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }

    #[test]
    fn test_round_trip_all_colors() {
        for color in 0..=MAX_COLOR {
            assert_eq!(rgb2hex(hex2rgb(color)), color, "color {:06x}", color);
        }
    }

    #[test]
    fn test_hex2rgb() {
        assert_eq!(hex2rgb(0xFF0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex2rgb(0x00FF00), [0.0, 1.0, 0.0]);
        assert_eq!(hex2rgb(0x000000), [0.0, 0.0, 0.0]);
        // 高于 24 位的部分被忽略
        assert_eq!(hex2rgb(0xFF00_00FF), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_rgb2hex_clamps() {
        assert_eq!(rgb2hex([1.5, -0.2, 0.5]), 0xFF0080);
    }

    #[test]
    fn test_tint_zero_is_identity() {
        for color in [0x000000, 0xFFFFFF, 0xFF8000, 0x123456] {
            assert!(tint(color, 0.0).is_identity());
            assert!(direct_tint(color, 0.0).is_identity());
        }
    }

    #[test]
    fn test_full_tint_is_luma_only() {
        let color = 0xFF8040;
        let [r, g, b] = hex2rgb(color);
        let m = tint(color, 1.0);

        for (i, c) in [r, g, b].into_iter().enumerate() {
            let row = m.row(i);
            assert_close(row[0], c * LUMA_R);
            assert_close(row[1], c * LUMA_G);
            assert_close(row[2], c * LUMA_B);
            assert_eq!(row[3], 0.0);
        }
        assert_eq!(m.row(3), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_white_full_tint_is_grayscale() {
        let m = tint(0xFFFFFF, 1.0);
        for i in 0..3 {
            let row = m.row(i);
            assert_close(row[0] + row[1] + row[2], 1.0);
        }
    }

    #[test]
    fn test_half_tint_blends() {
        let m = tint(0x000000, 0.5);
        // 黑色着色只剩下 q * 单位矩阵
        assert_close(m.row(0)[0], 0.5);
        assert_close(m.row(1)[1], 0.5);
        assert_close(m.row(2)[2], 0.5);
        assert_eq!(m.row(0)[1], 0.0);
    }

    #[test]
    fn test_direct_tint_diagonal() {
        let m = direct_tint(0xFF0000, 1.0);
        assert_eq!(m.row(0), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(m.row(1), [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(m.row(2), [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(m.row(3), [0.0, 0.0, 0.0, 1.0]);
    }
}
