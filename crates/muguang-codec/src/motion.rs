//! 宏块运动估计 (对数/三步搜索).
//!
//! 对帧 t >= 1 的每个宏块, 在帧 t-1 的 Y 平面上做对数搜索:
//! 步长从 search_param 逐次减半, 每步评估以当前最优位置为中心的
//! 9 个候选偏移, 直到步长为 1. 代价为逐字节绝对差之和 (SAD).
//!
//! 平局规则: 中心候选 (i=0, j=0) 在误差 <= 当前最优时胜出,
//! 其余候选仅在严格更小时替换; 候选按 i 外层 j 内层, 各自 -1 -> +1
//! 的固定顺序评估. 平坦区域因此不会漂移.

use muguang_core::{Channel, PlaneStore, VideoConfig};

/// 宏块: 运动向量, SAD 误差与前景标记
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroBlock {
    /// 水平运动分量 (目标列 - 本块列)
    pub dx: i16,
    /// 垂直运动分量 (目标行 - 本块行)
    pub dy: i16,
    /// 最终细化步的 SAD 误差
    pub sad: i32,
    /// 前景标记 (由分层器写入)
    pub foreground: bool,
}

/// 一帧的宏块网格 (行优先)
#[derive(Debug, Clone)]
pub struct MacroBlockGrid {
    blocks: Vec<MacroBlock>,
    cols: usize,
    rows: usize,
}

impl MacroBlockGrid {
    /// 创建全零网格 (帧 0 的最终状态)
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            blocks: vec![MacroBlock::default(); cols * rows],
            cols,
            rows,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 宏块总数
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &MacroBlock {
        debug_assert!(x < self.cols && y < self.rows, "宏块坐标越界: x={x}, y={y}");
        &self.blocks[y * self.cols + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut MacroBlock {
        debug_assert!(x < self.cols && y < self.rows, "宏块坐标越界: x={x}, y={y}");
        &mut self.blocks[y * self.cols + x]
    }

    /// 行优先遍历全部宏块
    pub fn blocks(&self) -> &[MacroBlock] {
        &self.blocks
    }

    /// 行优先可变遍历
    pub fn blocks_mut(&mut self) -> &mut [MacroBlock] {
        &mut self.blocks
    }

    /// 当前标记为前景的宏块数
    pub fn foreground_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.foreground).count()
    }
}

/// 对一帧的全部宏块执行运动估计
///
/// 帧 0 没有参考帧, 全部宏块保持 (0, 0, 0).
pub fn estimate_frame(config: &VideoConfig, planes: &PlaneStore, frame: usize) -> MacroBlockGrid {
    let mut grid = MacroBlockGrid::new(config.mb_cols(), config.mb_rows());
    if frame == 0 {
        return grid;
    }

    for mb_y in 0..grid.rows() {
        for mb_x in 0..grid.cols() {
            *grid.get_mut(mb_x, mb_y) = search_block(config, planes, frame, mb_x, mb_y);
        }
    }
    grid
}

/// 单个宏块的对数搜索
fn search_block(
    config: &VideoConfig,
    planes: &PlaneStore,
    frame: usize,
    mb_x: usize,
    mb_y: usize,
) -> MacroBlock {
    let m = config.macroblock_size as i32;
    let home_r = (mb_y * config.macroblock_size) as i32;
    let home_c = (mb_x * config.macroblock_size) as i32;

    let mut step = config.search_param as i32;
    let mut best_r = home_r;
    let mut best_c = home_c;
    let mut sad_current = 0i32;

    while step > 1 {
        step /= 2;
        let mut best_err = i32::MAX;
        let mut next_r = best_r;
        let mut next_c = best_c;

        for i in -1i32..=1 {
            for j in -1i32..=1 {
                let target_r = best_r + i * step;
                let target_c = best_c + j * step;
                // 越界候选直接跳过, 不做钳制
                if !block_in_bounds(config, target_r, target_c, m) {
                    continue;
                }
                let err = block_sad(config, planes, frame, home_r, home_c, target_r, target_c);
                if (i == 0 && j == 0 && err <= best_err) || err < best_err {
                    best_err = err;
                    next_r = target_r;
                    next_c = target_c;
                }
            }
        }

        best_r = next_r;
        best_c = next_c;
        sad_current = best_err;
    }

    MacroBlock {
        dx: (best_c - home_c) as i16,
        dy: (best_r - home_r) as i16,
        sad: sad_current,
        foreground: false,
    }
}

/// 宏块窗口是否完整落在填充帧内
fn block_in_bounds(config: &VideoConfig, top_left_r: i32, top_left_c: i32, m: i32) -> bool {
    top_left_r >= 0
        && top_left_c >= 0
        && top_left_r + m <= config.frame_height_padded as i32
        && top_left_c + m <= config.frame_width_padded as i32
}

/// 当前帧本块与上一帧目标块在 Y 平面上的绝对差之和
fn block_sad(
    config: &VideoConfig,
    planes: &PlaneStore,
    frame: usize,
    home_r: i32,
    home_c: i32,
    target_r: i32,
    target_c: i32,
) -> i32 {
    let m = config.macroblock_size;
    let mut err = 0i32;
    for i in 0..m {
        for j in 0..m {
            let a = i32::from(planes.get(
                frame,
                Channel::Gray,
                home_r as usize + i,
                home_c as usize + j,
            ));
            let b = i32::from(planes.get(
                frame - 1,
                Channel::Gray,
                target_r as usize + i,
                target_c as usize + j,
            ));
            err += (a - b).abs();
        }
    }
    err
}
