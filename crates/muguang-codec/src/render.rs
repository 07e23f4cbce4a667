//! 帧渲染.
//!
//! 对每个 DCT 块按块心选择量化强度: 注视窗口内强制 q=1,
//! 否则按块心所在宏块的前景/背景标记取 fg_quant 或 bg_quant.
//! 量化缓存的前向系数, 反变换, 再把块印到未填充尺寸的输出图像上.

use muguang_core::{VideoConfig, NUM_CHANNELS_RGB};

use crate::dct::{inverse_block, quantize_block, CosTable, DctCache};
use crate::motion::MacroBlockGrid;

/// 注视点 (帧像素坐标; enabled 为 false 时窗口不生效)
#[derive(Debug, Clone, Copy, Default)]
pub struct GazePoint {
    pub x: i32,
    pub y: i32,
    pub enabled: bool,
}

/// 重建输出图像 (交错 RGB24, 未填充尺寸)
#[derive(Debug, Clone)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    /// 交错像素数据, 长度 width * height * 3
    pub data: Vec<u8>,
}

impl RgbImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height * NUM_CHANNELS_RGB],
        }
    }

    /// 读取一个像素 (r, g, b)
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let i = (y * self.width + x) * NUM_CHANNELS_RGB;
        (self.data[i], self.data[i + 1], self.data[i + 2])
    }
}

/// 渲染一帧: 量化 + 反变换全部 DCT 块并写入输出图像
pub fn render_frame(
    config: &VideoConfig,
    grid: &MacroBlockGrid,
    cache: &DctCache,
    cos: &CosTable,
    gaze: GazePoint,
    image: &mut RgbImage,
) {
    let s = config.dct_block_size;
    let blocks_per_row = config.dct_cols();
    let mut quantized = vec![0.0f32; NUM_CHANNELS_RGB * s * s];
    let mut pixels = vec![0u8; NUM_CHANNELS_RGB * s * s];

    for index in 0..cache.num_blocks() {
        let center_x = (index % blocks_per_row) * s + s / 2;
        let center_y = (index / blocks_per_row) * s + s / 2;
        let quant = select_quant(config, grid, gaze, center_x, center_y);

        quantize_block(cache.block(index), quant, &mut quantized);
        inverse_block(cos, &quantized, &mut pixels);
        stamp_block(config, index, blocks_per_row, &pixels, image);
    }
}

/// 按块心选择量化强度
fn select_quant(
    config: &VideoConfig,
    grid: &MacroBlockGrid,
    gaze: GazePoint,
    center_x: usize,
    center_y: usize,
) -> u32 {
    let half = (config.gaze_size / 2) as i32;
    if gaze.enabled
        && (center_x as i32 - gaze.x).abs() <= half
        && (center_y as i32 - gaze.y).abs() <= half
    {
        return 1;
    }
    let mb_x = center_x / config.macroblock_size;
    let mb_y = center_y / config.macroblock_size;
    if grid.get(mb_x, mb_y).foreground {
        config.fg_quant
    } else {
        config.bg_quant
    }
}

/// 把一个重建块印到输出图像, 裁掉填充区
fn stamp_block(
    config: &VideoConfig,
    index: usize,
    blocks_per_row: usize,
    pixels: &[u8],
    image: &mut RgbImage,
) {
    let s = config.dct_block_size;
    let left = (index % blocks_per_row) * s;
    let top = (index / blocks_per_row) * s;

    for x in 0..s {
        for y in 0..s {
            let px = left + x;
            let py = top + y;
            if px >= config.frame_width || py >= config.frame_height {
                continue;
            }
            let dst = (py * image.width + px) * NUM_CHANNELS_RGB;
            for c in 0..NUM_CHANNELS_RGB {
                image.data[dst + c] = pixels[(c * s + x) * s + y];
            }
        }
    }
}
