//! 颜色编码辅助
//!
//! 机构树内部只存储十六进制颜色字符串（如 `"#FF0000"`），编码/解码由外部
//! 协作方负责。这里只提供默认背景色和一个 RGB 转十六进制的便捷函数。

/// 默认画布背景色（深蓝，RGB = 0, 0, 32）
pub const DEFAULT_BACKGROUND_COLOR: &str = "#000020";

/// RGB 分量转十六进制颜色字符串
pub fn hex_color(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}
