//! 视频配置定义.
//!
//! `VideoParams` 是用户可调的输入参数, `VideoConfig` 在其上校验并派生
//! 填充尺寸与帧数, 构造之后不再变化. 各管线阶段以 `&VideoConfig` 借用.

use crate::channel::NUM_CHANNELS_RGB;
use crate::error::{MuguangError, MuguangResult};

/// 默认宏块边长 (像素)
pub const DEFAULT_MACROBLOCK_SIZE: usize = 16;

/// 默认 DCT 块边长 (像素)
pub const DEFAULT_DCT_BLOCK_SIZE: usize = 8;

/// 默认运动搜索范围 (像素, 2 的幂)
pub const DEFAULT_SEARCH_PARAM: usize = 16;

/// 默认注视窗口边长 (像素)
pub const DEFAULT_GAZE_SIZE: usize = 64;

/// 用户可调参数 (由 CLI 构造)
#[derive(Debug, Clone)]
pub struct VideoParams {
    /// 帧宽 (像素)
    pub frame_width: usize,
    /// 帧高 (像素)
    pub frame_height: usize,
    /// 宏块边长
    pub macroblock_size: usize,
    /// DCT 块边长
    pub dct_block_size: usize,
    /// 运动搜索范围 (必须是 >= 2 的 2 的幂)
    pub search_param: usize,
    /// 注视窗口边长
    pub gaze_size: usize,
    /// 前景量化强度 (>= 1)
    pub fg_quant: u32,
    /// 背景量化强度 (>= 1)
    pub bg_quant: u32,
    /// 注视窗口开关
    pub gaze_enabled: bool,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            frame_width: 960,
            frame_height: 540,
            macroblock_size: DEFAULT_MACROBLOCK_SIZE,
            dct_block_size: DEFAULT_DCT_BLOCK_SIZE,
            search_param: DEFAULT_SEARCH_PARAM,
            gaze_size: DEFAULT_GAZE_SIZE,
            fg_quant: 1,
            bg_quant: 1,
            gaze_enabled: false,
        }
    }
}

/// 视频配置 (构造后不可变)
///
/// 填充尺寸向上对齐到宏块边长的倍数, 帧数由文件大小推出.
#[derive(Debug, Clone)]
pub struct VideoConfig {
    pub frame_width: usize,
    pub frame_height: usize,
    pub macroblock_size: usize,
    pub dct_block_size: usize,
    pub search_param: usize,
    pub gaze_size: usize,
    pub fg_quant: u32,
    pub bg_quant: u32,
    pub gaze_enabled: bool,
    /// 帧宽, 向上取整到宏块倍数
    pub frame_width_padded: usize,
    /// 帧高, 向上取整到宏块倍数
    pub frame_height_padded: usize,
    /// 填充后单平面的字节数
    pub frame_size_padded: usize,
    /// 输入文件包含的帧数
    pub num_frames: usize,
}

impl VideoConfig {
    /// 校验参数并由输入文件大小派生完整配置
    ///
    /// 尾部不完整帧与空文件均视为加载错误并拒绝.
    pub fn derive(params: VideoParams, input_path: &str, file_size: u64) -> MuguangResult<Self> {
        if params.frame_width == 0 || params.frame_height == 0 {
            return Err(MuguangError::InvalidArgument(
                "帧宽和帧高不能为 0".into(),
            ));
        }
        if params.macroblock_size == 0 || params.dct_block_size == 0 {
            return Err(MuguangError::InvalidArgument(
                "宏块与 DCT 块边长不能为 0".into(),
            ));
        }
        if params.macroblock_size % params.dct_block_size != 0 {
            return Err(MuguangError::InvalidArgument(format!(
                "宏块边长 {} 必须是 DCT 块边长 {} 的倍数",
                params.macroblock_size, params.dct_block_size,
            )));
        }
        if params.search_param < 2 || !params.search_param.is_power_of_two() {
            return Err(MuguangError::InvalidArgument(format!(
                "搜索范围必须是 >= 2 的 2 的幂: {}",
                params.search_param,
            )));
        }
        if params.fg_quant < 1 || params.bg_quant < 1 {
            return Err(MuguangError::InvalidArgument(
                "量化强度必须 >= 1".into(),
            ));
        }

        let frame_bytes = (params.frame_width * params.frame_height * NUM_CHANNELS_RGB) as u64;
        if file_size == 0 {
            return Err(MuguangError::EmptyInput {
                path: input_path.to_string(),
            });
        }
        if file_size % frame_bytes != 0 {
            return Err(MuguangError::PartialFrame {
                path: input_path.to_string(),
                size: file_size,
                frame_bytes,
            });
        }
        let num_frames = (file_size / frame_bytes) as usize;

        let frame_width_padded = params.frame_width.div_ceil(params.macroblock_size)
            * params.macroblock_size;
        let frame_height_padded = params.frame_height.div_ceil(params.macroblock_size)
            * params.macroblock_size;

        Ok(Self {
            frame_width: params.frame_width,
            frame_height: params.frame_height,
            macroblock_size: params.macroblock_size,
            dct_block_size: params.dct_block_size,
            search_param: params.search_param,
            gaze_size: params.gaze_size,
            fg_quant: params.fg_quant,
            bg_quant: params.bg_quant,
            gaze_enabled: params.gaze_enabled,
            frame_width_padded,
            frame_height_padded,
            frame_size_padded: frame_width_padded * frame_height_padded,
            num_frames,
        })
    }

    /// 单帧在输入文件中的字节数 (R+G+B 三个未填充平面)
    pub fn frame_bytes(&self) -> u64 {
        (self.frame_width * self.frame_height * NUM_CHANNELS_RGB) as u64
    }

    /// 宏块网格列数
    pub fn mb_cols(&self) -> usize {
        self.frame_width_padded / self.macroblock_size
    }

    /// 宏块网格行数
    pub fn mb_rows(&self) -> usize {
        self.frame_height_padded / self.macroblock_size
    }

    /// 每帧宏块总数
    pub fn num_macroblocks(&self) -> usize {
        self.mb_cols() * self.mb_rows()
    }

    /// DCT 块网格列数
    pub fn dct_cols(&self) -> usize {
        self.frame_width_padded / self.dct_block_size
    }

    /// DCT 块网格行数
    pub fn dct_rows(&self) -> usize {
        self.frame_height_padded / self.dct_block_size
    }

    /// 每帧 DCT 块总数
    pub fn num_dct_blocks(&self) -> usize {
        self.dct_cols() * self.dct_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_960x540() -> VideoParams {
        VideoParams {
            fg_quant: 4,
            bg_quant: 16,
            gaze_enabled: true,
            ..VideoParams::default()
        }
    }

    #[test]
    fn test_derive_pads_to_macroblock_multiple() {
        // 960x540, 两帧
        let file_size = 960 * 540 * 3 * 2;
        let cfg = VideoConfig::derive(params_960x540(), "test.rgb", file_size).unwrap();
        assert_eq!(cfg.frame_width_padded, 960);
        assert_eq!(cfg.frame_height_padded, 544);
        assert_eq!(cfg.frame_size_padded, 960 * 544);
        assert_eq!(cfg.num_frames, 2);
        assert_eq!(cfg.mb_cols(), 60);
        assert_eq!(cfg.mb_rows(), 34);
        assert_eq!(cfg.num_macroblocks(), 60 * 34);
        assert_eq!(cfg.num_dct_blocks(), 120 * 68);
    }

    #[test]
    fn test_derive_rejects_partial_frame() {
        let file_size = 960 * 540 * 3 + 1;
        let err = VideoConfig::derive(params_960x540(), "test.rgb", file_size).unwrap_err();
        assert!(matches!(err, MuguangError::PartialFrame { .. }), "应拒绝不完整帧");
    }

    #[test]
    fn test_derive_rejects_empty_file() {
        let err = VideoConfig::derive(params_960x540(), "test.rgb", 0).unwrap_err();
        assert!(matches!(err, MuguangError::EmptyInput { .. }), "应拒绝空文件");
    }

    #[test]
    fn test_derive_rejects_zero_quant() {
        let params = VideoParams {
            fg_quant: 0,
            ..VideoParams::default()
        };
        let err = VideoConfig::derive(params, "test.rgb", 960 * 540 * 3).unwrap_err();
        assert!(matches!(err, MuguangError::InvalidArgument(_)));
    }

    #[test]
    fn test_derive_rejects_bad_search_param() {
        for bad in [0usize, 1, 3, 12] {
            let params = VideoParams {
                search_param: bad,
                ..VideoParams::default()
            };
            let err = VideoConfig::derive(params, "test.rgb", 960 * 540 * 3).unwrap_err();
            assert!(
                matches!(err, MuguangError::InvalidArgument(_)),
                "搜索范围 {bad} 应被拒绝",
            );
        }
    }

    #[test]
    fn test_derive_exact_multiple_keeps_size() {
        // 已对齐的尺寸不再填充
        let params = VideoParams {
            frame_width: 64,
            frame_height: 32,
            ..VideoParams::default()
        };
        let cfg = VideoConfig::derive(params, "test.rgb", 64 * 32 * 3).unwrap();
        assert_eq!(cfg.frame_width_padded, 64);
        assert_eq!(cfg.frame_height_padded, 32);
        assert_eq!(cfg.num_frames, 1);
    }
}
