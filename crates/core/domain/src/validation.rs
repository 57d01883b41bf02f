//! 输入格式校验。

/// 校验 MAC 地址格式（`01:23:45:67:89:AB` 或 `01-23-45-67-89-AB`）。
pub fn is_valid_mac_address(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() != 17 {
        return false;
    }
    bytes.iter().enumerate().all(|(index, byte)| {
        if index % 3 == 2 {
            *byte == b':' || *byte == b'-'
        } else {
            byte.is_ascii_hexdigit()
        }
    })
}
