//! RGB 原始文件读取.
//!
//! 输入文件是帧的裸串联: 每帧依次为 R, G, B 三个
//! `frame_width * frame_height` 的行优先平面, 无文件头无对齐.
//!
//! 读取过程:
//! 1. 每行精确读入 `frame_width` 字节, 行尾的填充列复制最后一个真实像素
//! 2. 真实行读完后, 填充行整行复制最后一个真实行
//! 3. 一帧的 B 平面写完后, 在整个填充区上合成 Y 平面并做一次 3x3 加权模糊

use std::fs::File;
use std::io::{BufReader, Read};

use log::{debug, info};

use crate::channel::Channel;
use crate::config::VideoConfig;
use crate::error::{MuguangError, MuguangResult};
use crate::plane::PlaneStore;

/// 灰度权重 (ITU-R BT.601), 千分位定点, 三者之和恰为 1000
const R_TO_GRAY_WEIGHT: u32 = 299;
const G_TO_GRAY_WEIGHT: u32 = 587;
const B_TO_GRAY_WEIGHT: u32 = 114;

/// 3x3 模糊核 (行优先), 边沿像素只用界内邻居并按实际权重和归一化
const BLUR_KERNEL: [[u32; 3]; 3] = [[1, 2, 1], [2, 4, 2], [1, 2, 1]];

/// 从文件加载全部帧到平面存储
pub fn load_planes(config: &VideoConfig, path: &str) -> MuguangResult<PlaneStore> {
    info!("开始加载: {} ({} 帧)", path, config.num_frames);
    let file = File::open(path).map_err(|e| MuguangError::Open {
        path: path.to_string(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);
    let store = load_from_reader(config, &mut reader, path)?;
    info!("加载完成: {} 帧", config.num_frames);
    Ok(store)
}

/// 从任意字节源加载 (测试与文件读取共用)
pub fn load_from_reader<R: Read>(
    config: &VideoConfig,
    reader: &mut R,
    path: &str,
) -> MuguangResult<PlaneStore> {
    let mut store = PlaneStore::new(config);
    let mut offset: u64 = 0;

    for frame in 0..config.num_frames {
        for channel in Channel::RGB {
            read_one_plane(config, reader, &mut store, frame, channel, path, &mut offset)?;
        }
        synthesize_gray_frame(config, &mut store, frame);
        blur_gray_frame(config, &mut store, frame);
        debug!("已加载帧 {}/{}", frame + 1, config.num_frames);
    }

    Ok(store)
}

/// 读入一个输入平面并完成行列填充
fn read_one_plane<R: Read>(
    config: &VideoConfig,
    reader: &mut R,
    store: &mut PlaneStore,
    frame: usize,
    channel: Channel,
    path: &str,
    offset: &mut u64,
) -> MuguangResult<()> {
    let wp = config.frame_width_padded;
    let plane = store.plane_mut(frame, channel);

    for row in 0..config.frame_height {
        let start = row * wp;
        reader
            .read_exact(&mut plane[start..start + config.frame_width])
            .map_err(|e| MuguangError::Read {
                path: path.to_string(),
                offset: *offset,
                source: e,
            })?;
        *offset += config.frame_width as u64;

        // 列填充: 复制本行最后一个真实像素
        let last = plane[start + config.frame_width - 1];
        for col in config.frame_width..wp {
            plane[start + col] = last;
        }
    }

    // 行填充: 每个填充行复制最后一个真实行
    let last_row_start = (config.frame_height - 1) * wp;
    for row in config.frame_height..config.frame_height_padded {
        plane.copy_within(last_row_start..last_row_start + wp, row * wp);
    }

    Ok(())
}

/// 在整个填充区上合成 Y 平面: 0.299R + 0.587G + 0.114B 向下取整
///
/// 定点计算使取整结果对每个输入都是精确的 (权重之和为 1000,
/// 结果天然落在 [0, 255] 内).
fn synthesize_gray_frame(config: &VideoConfig, store: &mut PlaneStore, frame: usize) {
    let mut gray = vec![0u8; config.frame_size_padded];
    {
        let r = store.plane(frame, Channel::Red);
        let g = store.plane(frame, Channel::Green);
        let b = store.plane(frame, Channel::Blue);
        for i in 0..config.frame_size_padded {
            let y = (R_TO_GRAY_WEIGHT * u32::from(r[i])
                + G_TO_GRAY_WEIGHT * u32::from(g[i])
                + B_TO_GRAY_WEIGHT * u32::from(b[i]))
                / 1000;
            gray[i] = y.min(255) as u8;
        }
    }
    store.plane_mut(frame, Channel::Gray).copy_from_slice(&gray);
}

/// 对一帧的 Y 平面做一次 3x3 加权模糊
///
/// 从未模糊的快照读取, 写回存储, 避免模糊结果沿扫描方向串扰.
fn blur_gray_frame(config: &VideoConfig, store: &mut PlaneStore, frame: usize) {
    let snapshot = store.plane(frame, Channel::Gray).to_vec();
    let wp = config.frame_width_padded;
    let hp = config.frame_height_padded;
    let plane = store.plane_mut(frame, Channel::Gray);

    for row in 0..hp {
        for col in 0..wp {
            let mut sum = 0u32;
            let mut weight = 0u32;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let r = row as i32 + dy;
                    let c = col as i32 + dx;
                    if r < 0 || c < 0 || r >= hp as i32 || c >= wp as i32 {
                        continue;
                    }
                    let w = BLUR_KERNEL[(dy + 1) as usize][(dx + 1) as usize];
                    sum += w * u32::from(snapshot[r as usize * wp + c as usize]);
                    weight += w;
                }
            }
            plane[row * wp + col] = (sum / weight) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VideoParams;
    use std::io::Cursor;

    /// 3x2 帧, 宏块边长 2 -> 填充到 4x2
    fn tiny_config(num_frames: usize) -> VideoConfig {
        let params = VideoParams {
            frame_width: 3,
            frame_height: 2,
            macroblock_size: 2,
            dct_block_size: 2,
            search_param: 2,
            gaze_size: 2,
            ..VideoParams::default()
        };
        VideoConfig::derive(params, "内存", (3 * 2 * 3 * num_frames) as u64).unwrap()
    }

    /// 构造一帧输入: 三个平面依次填同一图样
    fn one_frame_bytes(pattern: &[u8; 6]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for _ in 0..3 {
            bytes.extend_from_slice(pattern);
        }
        bytes
    }

    #[test]
    fn test_column_padding_replicates_last_pixel() {
        let cfg = tiny_config(1);
        // 行 0: 1 2 3, 行 1: 4 5 6
        let bytes = one_frame_bytes(&[1, 2, 3, 4, 5, 6]);
        let store = load_from_reader(&cfg, &mut Cursor::new(bytes), "内存").unwrap();

        for channel in Channel::RGB {
            assert_eq!(store.get(0, channel, 0, 3), 3, "行 0 填充列应复制列 2");
            assert_eq!(store.get(0, channel, 1, 3), 6, "行 1 填充列应复制列 2");
        }
    }

    #[test]
    fn test_row_padding_replicates_last_row() {
        // 3x3 帧, 宏块 2 -> 填充到 4x4
        let params = VideoParams {
            frame_width: 3,
            frame_height: 3,
            macroblock_size: 2,
            dct_block_size: 2,
            search_param: 2,
            gaze_size: 2,
            ..VideoParams::default()
        };
        let cfg = VideoConfig::derive(params, "内存", (3 * 3 * 3) as u64).unwrap();

        let plane: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut bytes = Vec::new();
        for _ in 0..3 {
            bytes.extend_from_slice(&plane);
        }
        let store = load_from_reader(&cfg, &mut Cursor::new(bytes), "内存").unwrap();

        // 填充行 (行 3) 应复制真实最后一行 (7 8 9 9)
        for channel in Channel::RGB {
            assert_eq!(store.get(0, channel, 3, 0), 7);
            assert_eq!(store.get(0, channel, 3, 1), 8);
            assert_eq!(store.get(0, channel, 3, 2), 9);
            assert_eq!(store.get(0, channel, 3, 3), 9, "填充角应复制角像素");
        }
    }

    #[test]
    fn test_gray_weights_uniform_input() {
        let cfg = tiny_config(1);
        // R=G=B=100 -> Y=100, 常量平面模糊后不变
        let bytes = one_frame_bytes(&[100; 6]);
        let store = load_from_reader(&cfg, &mut Cursor::new(bytes), "内存").unwrap();

        for row in 0..cfg.frame_height_padded {
            for col in 0..cfg.frame_width_padded {
                assert_eq!(store.get(0, Channel::Gray, row, col), 100);
            }
        }
    }

    #[test]
    fn test_gray_weight_sum_clamped() {
        let cfg = tiny_config(1);
        let bytes = one_frame_bytes(&[255; 6]);
        let store = load_from_reader(&cfg, &mut Cursor::new(bytes), "内存").unwrap();
        // 0.299+0.587+0.114 = 1.0, 满白保持 255
        assert_eq!(store.get(0, Channel::Gray, 0, 0), 255);
    }

    #[test]
    fn test_blur_renormalizes_at_corner() {
        // 4x4 单帧, 左上角一个脉冲
        let params = VideoParams {
            frame_width: 4,
            frame_height: 4,
            macroblock_size: 2,
            dct_block_size: 2,
            search_param: 2,
            gaze_size: 2,
            ..VideoParams::default()
        };
        let cfg = VideoConfig::derive(params, "内存", (4 * 4 * 3) as u64).unwrap();

        let mut plane = [0u8; 16];
        plane[0] = 255;
        let mut bytes = Vec::new();
        for _ in 0..3 {
            bytes.extend_from_slice(&plane);
        }
        let store = load_from_reader(&cfg, &mut Cursor::new(bytes), "内存").unwrap();

        // 角: 界内权重 4+2+2+1=9, 脉冲贡献 4*255=1020 -> 113
        assert_eq!(store.get(0, Channel::Gray, 0, 0), 113);
        // 上边 (0,1): 界内权重 2+4+2+1+2+1=12, 脉冲贡献 2*255=510 -> 42
        assert_eq!(store.get(0, Channel::Gray, 0, 1), 42);
        // 内部 (1,1): 全部 9 个邻居在界内, 权重 16, 贡献 1*255 -> 15
        assert_eq!(store.get(0, Channel::Gray, 1, 1), 15);
    }

    #[test]
    fn test_short_read_reports_offset() {
        let cfg = tiny_config(1);
        // 只给 5 字节, 第二行 (偏移 3) 读取时中断
        let bytes = vec![0u8; 5];
        let err = load_from_reader(&cfg, &mut Cursor::new(bytes), "短.rgb").unwrap_err();
        match err {
            MuguangError::Read { path, offset, .. } => {
                assert_eq!(path, "短.rgb");
                assert_eq!(offset, 3, "错误应携带失败行的起始偏移");
            }
            other => panic!("期望 Read 错误, 得到 {other:?}"),
        }
    }

    #[test]
    fn test_two_frames_sequential_layout() {
        let cfg = tiny_config(2);
        let mut bytes = one_frame_bytes(&[10, 10, 10, 10, 10, 10]);
        bytes.extend(one_frame_bytes(&[20, 20, 20, 20, 20, 20]));
        let store = load_from_reader(&cfg, &mut Cursor::new(bytes), "内存").unwrap();

        assert_eq!(store.get(0, Channel::Red, 0, 0), 10);
        assert_eq!(store.get(1, Channel::Red, 0, 0), 20);
        assert_eq!(store.get(0, Channel::Gray, 1, 3), 10);
        assert_eq!(store.get(1, Channel::Gray, 1, 3), 20);
    }
}
