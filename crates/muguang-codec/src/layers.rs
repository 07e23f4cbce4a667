//! 前景/背景分层.
//!
//! 三个阶段, 顺序固定:
//! 1. 初始分配: SAD 落在阈值带内且运动向量偏离帧均值足够大的宏块标为前景,
//!    前景不足时放宽偏离阈值重试
//! 2. 邻域过滤: 行优先原地扫描, 按角/边/内部三类规则与 8 邻域背景数修订
//!    (原地更新是有意的, 后续宏块读取前面已修订的状态, 顺序不可改动)
//! 3. 膨胀: 双缓冲的 4 邻域膨胀, 把前景扩张到目标块数

use log::debug;

use crate::motion::MacroBlockGrid;

/// 初判前景的 SAD 下界 (不含)
const SAD_LOWER_THRESHOLD: i32 = 500;

/// 初判前景的 SAD 上界 (不含)
const SAD_UPPER_THRESHOLD: i32 = 8000;

/// 运动向量偏离阈值基准
const MV_DIFF_THRESHOLD: f32 = 2.2;

/// 每次重试放宽的偏离阈值量
const MV_DIFF_STEP: f32 = 0.33;

/// 初判后的最少前景块数 (尽力达成)
const MIN_FOREGROUND_BLOCKS: usize = 7;

/// 重试与膨胀的次数上限
const MAX_RUNS: usize = 5;

/// 角块: 背景邻居数达到该值则归入背景
const CORNER_BACKGROUND_THRESHOLD: usize = 2;

/// 边块: 背景邻居数达到该值则归入背景
const EDGE_BACKGROUND_THRESHOLD: usize = 3;

/// 边块: 背景邻居数不超过该值则归入前景
const EDGE_FOREGROUND_THRESHOLD: usize = 1;

/// 内部块: 背景邻居数达到该值则归入背景
const STD_BACKGROUND_THRESHOLD: usize = 6;

/// 内部块: 背景邻居数不超过该值则归入前景
const STD_FOREGROUND_THRESHOLD: usize = 4;

/// 膨胀阶段期望达到的前景块数
const EXPAND_TARGET: usize = MIN_FOREGROUND_BLOCKS * 3;

/// 对一帧的宏块网格执行完整分层
pub fn assign_layers(grid: &mut MacroBlockGrid) {
    let (avg_dx, avg_dy) = motion_average(grid);

    // ── 初始分配 (不足则放宽阈值重试) ──
    let mut relax = 0.0f32;
    let mut runs = 0;
    let mut foreground = 0;
    while foreground < MIN_FOREGROUND_BLOCKS && runs < MAX_RUNS {
        foreground = initial_assignment(grid, avg_dx, avg_dy, relax);
        relax += MV_DIFF_STEP;
        runs += 1;
    }

    // ── 邻域过滤 (行优先原地扫描) ──
    filter_by_neighbors(grid);

    // ── 膨胀 (最多 1 + MAX_RUNS 次) ──
    let mut foreground = grid.foreground_count();
    if foreground < grid.len() / 3 {
        foreground = dilate(grid);
    }
    let mut runs = 0;
    while foreground < EXPAND_TARGET && runs < MAX_RUNS {
        foreground = dilate(grid);
        runs += 1;
    }

    debug!("分层完成: 前景 {}/{} 块", foreground, grid.len());
}

/// 帧内全部宏块运动向量的算术平均
fn motion_average(grid: &MacroBlockGrid) -> (f32, f32) {
    let mut sum_dx = 0.0f32;
    let mut sum_dy = 0.0f32;
    for mb in grid.blocks() {
        sum_dx += f32::from(mb.dx);
        sum_dy += f32::from(mb.dy);
    }
    let n = grid.len() as f32;
    (sum_dx / n, sum_dy / n)
}

/// 初始分配一轮, 返回标为前景的块数
fn initial_assignment(grid: &mut MacroBlockGrid, avg_dx: f32, avg_dy: f32, relax: f32) -> usize {
    let mut count = 0;
    for mb in grid.blocks_mut() {
        let deviation = (avg_dx - f32::from(mb.dx)).abs() + (avg_dy - f32::from(mb.dy)).abs();
        let is_foreground = mb.sad > SAD_LOWER_THRESHOLD
            && mb.sad < SAD_UPPER_THRESHOLD
            && deviation > MV_DIFF_THRESHOLD - relax;
        mb.foreground = is_foreground;
        if is_foreground {
            count += 1;
        }
    }
    count
}

/// 邻域过滤: 行优先原地更新
fn filter_by_neighbors(grid: &mut MacroBlockGrid) {
    let cols = grid.cols();
    let rows = grid.rows();

    for y in 0..rows {
        for x in 0..cols {
            let background = background_neighbors(grid, x, y);
            if is_corner(x, y, cols, rows) {
                // 角块只有 3 个邻居
                grid.get_mut(x, y).foreground = background < CORNER_BACKGROUND_THRESHOLD;
            } else if is_edge(x, y, cols, rows) {
                // 边块有 5 个邻居
                if background >= EDGE_BACKGROUND_THRESHOLD {
                    grid.get_mut(x, y).foreground = false;
                } else if background <= EDGE_FOREGROUND_THRESHOLD {
                    grid.get_mut(x, y).foreground = true;
                }
            } else {
                // 内部块有 8 个邻居
                if background >= STD_BACKGROUND_THRESHOLD {
                    grid.get_mut(x, y).foreground = false;
                } else if background <= STD_FOREGROUND_THRESHOLD {
                    grid.get_mut(x, y).foreground = true;
                }
            }
        }
    }
}

/// 8 邻域中已标为背景的邻居数, 网格外不计
fn background_neighbors(grid: &MacroBlockGrid, x: usize, y: usize) -> usize {
    let mut count = 0;
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= grid.cols() as i32 || ny >= grid.rows() as i32 {
                continue;
            }
            if !grid.get(nx as usize, ny as usize).foreground {
                count += 1;
            }
        }
    }
    count
}

fn is_corner(x: usize, y: usize, cols: usize, rows: usize) -> bool {
    (x == 0 || x >= cols - 1) && (y == 0 || y >= rows - 1)
}

fn is_edge(x: usize, y: usize, cols: usize, rows: usize) -> bool {
    x == 0 || y == 0 || x >= cols - 1 || y >= rows - 1
}

/// 一次 4 邻域膨胀 (双缓冲), 返回膨胀后的前景块数
fn dilate(grid: &mut MacroBlockGrid) -> usize {
    let cols = grid.cols();
    let rows = grid.rows();
    let mut mask = vec![false; cols * rows];

    for y in 0..rows {
        for x in 0..cols {
            if grid.get(x, y).foreground {
                mask[y * cols + x] = true;
                if x > 0 {
                    mask[y * cols + x - 1] = true;
                }
                if x + 1 < cols {
                    mask[y * cols + x + 1] = true;
                }
                if y > 0 {
                    mask[(y - 1) * cols + x] = true;
                }
                if y + 1 < rows {
                    mask[(y + 1) * cols + x] = true;
                }
            }
        }
    }

    let mut count = 0;
    for (mb, &fg) in grid.blocks_mut().iter_mut().zip(mask.iter()) {
        mb.foreground = fg;
        if fg {
            count += 1;
        }
    }
    count
}
