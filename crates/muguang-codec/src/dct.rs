//! DCT 变换引擎.
//!
//! 以 `dct_block_size` 见方的 RGB 块为单位做二维 DCT. 前向系数在加载期
//! 对每帧每块一次性算好并缓存; 播放期只做量化 + 反变换.
//!
//! 数值约定 (决定输出逐位一致, 不可改动):
//! - 系数用 f32 累加
//! - alpha 因子 (u=0 或 v=0 时乘 1/sqrt(2)) 在前向变换中于内层求和后
//!   应用一次, 在反变换中逐项应用
//! - 量化 round(F/q)*q 用远离零的四舍五入
//! - 反变换像素先钳制到 [0, 255] 再截断为字节

use muguang_core::{Channel, PlaneStore, VideoConfig, NUM_CHANNELS_RGB};

/// u=0 / v=0 时的缩放因子 (1/sqrt(2))
const ZERO_INDEX_FACTOR: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// 余弦查找表: `get(u, x) = cos(((2x+1) * u * PI) / (2 * size))`
///
/// 每段视频只需要构造一次.
#[derive(Debug, Clone)]
pub struct CosTable {
    values: Vec<f32>,
    size: usize,
}

impl CosTable {
    pub fn new(size: usize) -> Self {
        let mut values = vec![0.0f32; size * size];
        for u in 0..size {
            for x in 0..size {
                values[u * size + x] = (((2 * x + 1) * u) as f64 * std::f64::consts::PI
                    / (2.0 * size as f64))
                    .cos() as f32;
            }
        }
        Self { values, size }
    }

    #[inline]
    pub fn get(&self, u: usize, x: usize) -> f32 {
        self.values[u * self.size + x]
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// 一帧的前向 DCT 系数缓存
///
/// 块按光栅顺序排列, 块内布局为 [通道][u][v] 的扁平存储.
#[derive(Debug, Clone)]
pub struct DctCache {
    coeffs: Vec<f32>,
    block_size: usize,
    num_blocks: usize,
}

impl DctCache {
    /// 块内浮点数个数 (3 个通道各 size*size)
    #[inline]
    fn block_len(&self) -> usize {
        NUM_CHANNELS_RGB * self.block_size * self.block_size
    }

    /// 一个块的系数视图 (长度 3 * size * size)
    #[inline]
    pub fn block(&self, index: usize) -> &[f32] {
        let len = self.block_len();
        &self.coeffs[index * len..(index + 1) * len]
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

/// 计算一帧全部块的前向 DCT 系数
pub fn forward_frame(
    config: &VideoConfig,
    planes: &PlaneStore,
    cos: &CosTable,
    frame: usize,
) -> DctCache {
    let s = config.dct_block_size;
    let num_blocks = config.num_dct_blocks();
    let blocks_per_row = config.dct_cols();
    let mut coeffs = vec![0.0f32; num_blocks * NUM_CHANNELS_RGB * s * s];

    for index in 0..num_blocks {
        let top = (index / blocks_per_row) * s;
        let left = (index % blocks_per_row) * s;
        let block = &mut coeffs
            [index * NUM_CHANNELS_RGB * s * s..(index + 1) * NUM_CHANNELS_RGB * s * s];
        forward_block(config, planes, cos, frame, top, left, block);
    }

    DctCache {
        coeffs,
        block_size: s,
        num_blocks,
    }
}

/// 单个块的前向变换: F(c,u,v) = (2/S) * a(u) * a(v) * 累加和
fn forward_block(
    config: &VideoConfig,
    planes: &PlaneStore,
    cos: &CosTable,
    frame: usize,
    top: usize,
    left: usize,
    out: &mut [f32],
) {
    let s = config.dct_block_size;
    let scale = 2.0 / s as f32;

    for (c, channel) in Channel::RGB.iter().enumerate() {
        for u in 0..s {
            for v in 0..s {
                let mut sum = 0.0f32;
                for x in 0..s {
                    for y in 0..s {
                        let p = f32::from(planes.get(frame, *channel, top + y, left + x));
                        sum += p * cos.get(u, x) * cos.get(v, y);
                    }
                }
                if u == 0 {
                    sum *= ZERO_INDEX_FACTOR;
                }
                if v == 0 {
                    sum *= ZERO_INDEX_FACTOR;
                }
                out[(c * s + u) * s + v] = sum * scale;
            }
        }
    }
}

/// 量化一个块: round(F/q) * q, 远离零取整
pub fn quantize_block(src: &[f32], quant: u32, dst: &mut [f32]) {
    let q = quant as f32;
    for (d, &f) in dst.iter_mut().zip(src.iter()) {
        *d = (f / q).round() * q;
    }
}

/// 反变换一个块: 输出 [通道][x][y] 布局的字节, 先钳制 [0,255] 再截断
pub fn inverse_block(cos: &CosTable, src: &[f32], out: &mut [u8]) {
    let s = cos.size();
    let scale = 2.0 / s as f32;

    for c in 0..NUM_CHANNELS_RGB {
        let coeffs = &src[c * s * s..(c + 1) * s * s];
        for x in 0..s {
            for y in 0..s {
                let mut sum = 0.0f32;
                for u in 0..s {
                    for v in 0..s {
                        let mut part = coeffs[u * s + v] * cos.get(u, x) * cos.get(v, y);
                        if u == 0 {
                            part *= ZERO_INDEX_FACTOR;
                        }
                        if v == 0 {
                            part *= ZERO_INDEX_FACTOR;
                        }
                        sum += part;
                    }
                }
                out[(c * s + x) * s + y] = (sum * scale).clamp(0.0, 255.0) as u8;
            }
        }
    }
}
