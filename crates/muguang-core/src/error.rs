//! 统一错误类型定义.
//!
//! 所有 muguang crate 共用的错误类型, 支持跨模块传播.
//! 加载类错误携带出错的文件路径与字节偏移, 便于直接定位输入问题.

use thiserror::Error;

/// muguang 统一错误类型
#[derive(Debug, Error)]
pub enum MuguangError {
    /// 无效参数 (配置阶段, 任何加载发生之前)
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 打开输入文件失败
    #[error("打开文件失败: {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    /// 读取输入文件失败 (含整帧边界前的提前结束)
    #[error("读取失败: {path} 偏移 {offset}: {source}")]
    Read {
        path: String,
        offset: u64,
        source: std::io::Error,
    },

    /// 文件尾部含不完整帧
    #[error("文件 {path} 大小 {size} 字节不是整帧 {frame_bytes} 字节的倍数")]
    PartialFrame {
        path: String,
        size: u64,
        frame_bytes: u64,
    },

    /// 输入文件为空, 没有任何可播放的帧
    #[error("输入文件为空: {path}")]
    EmptyInput { path: String },
}

/// muguang 统一 Result 类型
pub type MuguangResult<T> = Result<T, MuguangError>;
