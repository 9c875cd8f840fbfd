//! # TTML 解析器的工具函数
//!
//! 属性提取与 XML 实体解码。

use lyric_sync_core::ConvertError;
use quick_xml::{
    Reader,
    events::{BytesRef, BytesStart},
};
use tracing::warn;

/// 按出现顺序读取元素上的全部属性。
pub(super) fn collect_attributes(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
) -> Result<Vec<(String, String)>, ConvertError> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = reader.decoder().decode(attr.key.as_ref())?.into_owned();
        let value = attr
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

/// 获取单个属性的字符串值。
pub(super) fn get_string_attribute(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    name: &str,
) -> Result<Option<String>, ConvertError> {
    e.try_get_attribute(name)?
        .map(|attr| {
            attr.decode_and_unescape_value(reader.decoder())
                .map(std::borrow::Cow::into_owned)
                .map_err(ConvertError::Xml)
        })
        .transpose()
}

/// 将一个实体引用（`&amp;`、`&#x4E2D;` 等）解码为字符。
///
/// 无法识别的实体会被记录到警告中并返回 `None`。
pub(super) fn decode_entity(
    e: &BytesRef,
    warnings: &mut Vec<String>,
) -> Result<Option<char>, ConvertError> {
    let entity_name = std::str::from_utf8(e.as_ref())
        .map_err(|err| ConvertError::Internal(format!("无法将实体名解码为UTF-8: {err}")))?;

    let decoded = if let Some(num_str) = entity_name.strip_prefix('#') {
        let (radix, code_point_str) = num_str
            .strip_prefix('x')
            .map_or((10, num_str), |stripped| (16, stripped));
        u32::from_str_radix(code_point_str, radix)
            .ok()
            .and_then(char::from_u32)
    } else {
        match entity_name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => None,
        }
    };

    if decoded.is_none() {
        warn!("忽略了无法识别的XML实体 '&{entity_name};'");
        warnings.push(format!("忽略了无法识别的XML实体 '&{entity_name};'"));
    }
    Ok(decoded)
}
