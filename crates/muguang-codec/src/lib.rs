//! # muguang-codec
//!
//! muguang 核心算法库: 运动估计、前景/背景分层、DCT 变换引擎与帧渲染.
//!
//! 管线 (加载期一次完成, 播放期只做量化 + 反变换):
//!
//! ```text
//! 平面存储 -> 运动估计 -> 分层 -> 前向 DCT 缓存
//!                                     |
//!            播放: (掩码, 注视点) -> 量化 -> 反 DCT -> 重建图像
//! ```

pub mod dct;
pub mod layers;
pub mod motion;
pub mod render;
pub mod video;

// 重导出常用类型
pub use dct::{CosTable, DctCache};
pub use motion::{MacroBlock, MacroBlockGrid};
pub use render::{GazePoint, RgbImage};
pub use video::{CompressedVideo, FrameData};
