use serde::{Deserialize, Serialize};

// 页面抓取结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub charset: String,               // encoding_rs 规范名称, 如 "GBK"
    pub charset_source: CharsetSource, // 编码来源
    pub content_length: usize,         // 原始字节数
    pub body: String,
}

impl FetchedPage {
    pub fn into_body(self) -> String {
        self.body
    }
}

// 编码来源
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CharsetSource {
    /// `Content-Type` 响应头中的 charset 参数
    Header,
    /// HTML `<meta>` 标签
    Meta,
    /// 都没有, 使用 UTF-8
    Default,
}
