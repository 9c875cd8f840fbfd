//! # TTML 解析器 - 常量定义
//!
//! 该模块包含了在解析 TTML 文件时用到的 XML 标签和属性的常量定义。

pub(super) const TAG_P: &[u8] = b"p";
pub(super) const TAG_SPAN: &[u8] = b"span";

pub(super) const ATTR_BEGIN: &str = "begin";
pub(super) const ATTR_END: &str = "end";
