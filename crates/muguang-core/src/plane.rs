//! 平面存储.
//!
//! 全部帧的 RGBY 四个平面保存在一段连续字节缓冲里, 寻址方式:
//! `buf[((frame*4 + channel)*height_padded + row)*width_padded + col]`.
//!
//! 不变量: 超出真实帧宽/帧高的填充行列复制同轴上最后一个真实像素
//! (由加载器写入时保证). 越界坐标属于程序错误, 由调用方负责.

use crate::channel::{Channel, NUM_CHANNELS_RGBY};
use crate::config::VideoConfig;

/// 平面存储 (构造后由加载器填充, 之后只读)
#[derive(Debug)]
pub struct PlaneStore {
    data: Vec<u8>,
    width_padded: usize,
    height_padded: usize,
    frame_size_padded: usize,
}

impl PlaneStore {
    /// 按配置分配全零缓冲
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            data: vec![0u8; config.num_frames * NUM_CHANNELS_RGBY * config.frame_size_padded],
            width_padded: config.frame_width_padded,
            height_padded: config.frame_height_padded,
            frame_size_padded: config.frame_size_padded,
        }
    }

    /// 读取一个像素字节
    #[inline]
    pub fn get(&self, frame: usize, channel: Channel, row: usize, col: usize) -> u8 {
        debug_assert!(
            row < self.height_padded && col < self.width_padded,
            "平面坐标越界: row={row}, col={col}",
        );
        self.data[self.plane_offset(frame, channel) + row * self.width_padded + col]
    }

    /// 一个平面的只读视图 (长度 frame_size_padded, 行优先)
    pub fn plane(&self, frame: usize, channel: Channel) -> &[u8] {
        let start = self.plane_offset(frame, channel);
        &self.data[start..start + self.frame_size_padded]
    }

    /// 一个平面的可写视图 (加载期使用)
    pub fn plane_mut(&mut self, frame: usize, channel: Channel) -> &mut [u8] {
        let start = self.plane_offset(frame, channel);
        &mut self.data[start..start + self.frame_size_padded]
    }

    /// 填充后的行宽
    pub fn width_padded(&self) -> usize {
        self.width_padded
    }

    /// 填充后的行数
    pub fn height_padded(&self) -> usize {
        self.height_padded
    }

    #[inline]
    fn plane_offset(&self, frame: usize, channel: Channel) -> usize {
        (frame * NUM_CHANNELS_RGBY + channel.to_index()) * self.frame_size_padded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{VideoConfig, VideoParams};

    fn small_config() -> VideoConfig {
        let params = VideoParams {
            frame_width: 4,
            frame_height: 2,
            macroblock_size: 2,
            dct_block_size: 2,
            search_param: 2,
            gaze_size: 2,
            ..VideoParams::default()
        };
        VideoConfig::derive(params, "内存", (4 * 2 * 3 * 2) as u64).unwrap()
    }

    #[test]
    fn test_plane_layout_offsets() {
        let cfg = small_config();
        let mut store = PlaneStore::new(&cfg);

        // 帧 1 的蓝色平面写入可辨识图样
        {
            let plane = store.plane_mut(1, Channel::Blue);
            for (i, b) in plane.iter_mut().enumerate() {
                *b = i as u8;
            }
        }

        // get 按 ((f*4 + c)*h_pad + row)*w_pad + col 寻址
        assert_eq!(store.get(1, Channel::Blue, 0, 0), 0);
        assert_eq!(store.get(1, Channel::Blue, 0, 3), 3);
        assert_eq!(store.get(1, Channel::Blue, 1, 0), 4);
        // 其他平面不受影响
        assert_eq!(store.get(1, Channel::Green, 1, 3), 0);
        assert_eq!(store.get(0, Channel::Blue, 1, 3), 0);
    }

    #[test]
    fn test_plane_view_length() {
        let cfg = small_config();
        let store = PlaneStore::new(&cfg);
        assert_eq!(store.plane(0, Channel::Red).len(), cfg.frame_size_padded);
        assert_eq!(store.width_padded(), 4);
        assert_eq!(store.height_padded(), 2);
    }
}
