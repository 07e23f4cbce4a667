//! 压缩视频: 预处理管线的所有者.
//!
//! `CompressedVideo` 持有配置、平面存储、余弦表和每帧的宏块网格与
//! DCT 系数缓存, 是严格的所有权树根: 各管线阶段只借用
//! `&VideoConfig` 与 `&PlaneStore`, 没有反向指针.
//!
//! 加载完成后全部数据只读, 播放期唯一的可变状态是调用方自己的
//! 输出图像缓冲.

use log::{debug, info};

use muguang_core::{loader, MuguangError, MuguangResult, PlaneStore, VideoConfig, VideoParams};

use crate::dct::{self, CosTable, DctCache};
use crate::layers;
use crate::motion::{self, MacroBlockGrid};
use crate::render::{self, GazePoint, RgbImage};

/// 一帧的预处理结果
#[derive(Debug)]
pub struct FrameData {
    /// 宏块网格 (运动向量 + 分层标记)
    pub macroblocks: MacroBlockGrid,
    /// 前向 DCT 系数缓存
    pub dct: DctCache,
}

/// 压缩视频
#[derive(Debug)]
pub struct CompressedVideo {
    config: VideoConfig,
    planes: PlaneStore,
    cos_table: CosTable,
    frames: Vec<FrameData>,
}

impl CompressedVideo {
    /// 加载输入文件并完成整条预处理管线
    ///
    /// 全内存模式: 平面存储占用 `num_frames * 4 * frame_size_padded` 字节,
    /// DCT 缓存占用 `num_frames * 3 * frame_size_padded` 个 f32.
    /// 默认 960x540 配置下约 300 帧对应 ~627 MB + ~1.5 GB.
    pub fn load(params: VideoParams, path: &str) -> MuguangResult<Self> {
        let file_size = std::fs::metadata(path)
            .map_err(|e| MuguangError::Open {
                path: path.to_string(),
                source: e,
            })?
            .len();
        let config = VideoConfig::derive(params, path, file_size)?;
        let planes = loader::load_planes(&config, path)?;
        Ok(Self::preprocess(config, planes))
    }

    /// 在已填充的平面存储上运行预处理 (加载与测试共用)
    pub fn preprocess(config: VideoConfig, planes: PlaneStore) -> Self {
        let cos_table = CosTable::new(config.dct_block_size);
        let mut frames = Vec::with_capacity(config.num_frames);

        info!("预处理 {} 帧...", config.num_frames);
        for frame in 0..config.num_frames {
            let mut grid = motion::estimate_frame(&config, &planes, frame);
            layers::assign_layers(&mut grid);
            let dct = dct::forward_frame(&config, &planes, &cos_table, frame);
            frames.push(FrameData {
                macroblocks: grid,
                dct,
            });
            debug!("已预处理帧 {}/{}", frame + 1, config.num_frames);
        }
        info!("预处理完成");

        Self {
            config,
            planes,
            cos_table,
            frames,
        }
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    pub fn num_frames(&self) -> usize {
        self.config.num_frames
    }

    /// 一帧的预处理数据
    pub fn frame(&self, index: usize) -> &FrameData {
        &self.frames[index]
    }

    /// 原始平面存储 (只读)
    pub fn planes(&self) -> &PlaneStore {
        &self.planes
    }

    /// 渲染一帧到输出图像
    pub fn render_frame(&self, index: usize, gaze: GazePoint, image: &mut RgbImage) {
        let data = &self.frames[index];
        render::render_frame(
            &self.config,
            &data.macroblocks,
            &data.dct,
            &self.cos_table,
            gaze,
            image,
        );
    }
}
