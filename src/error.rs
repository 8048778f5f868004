use thiserror::Error;

/// 种子子系统（编码、最小化器提取、种子索引）的错误类型。
///
/// 查询不到的 key、空的 query / target 集合都不是错误，只返回空结果。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SeedError {
    /// 参数非法（k / w 为 0、percentile 不在 [0, 1] 等），在做任何工作之前返回
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// 字段超出打包宽度（position >= 2^31 等）
    #[error("seed field out of range: {0}")]
    Capacity(String),
}

impl SeedError {
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn capacity<S: Into<String>>(message: S) -> Self {
        Self::Capacity(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SeedError>;
