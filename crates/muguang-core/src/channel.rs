//! 颜色通道定义.
//!
//! 通道既是枚举值又是平面存储内的偏移序号, 映射固定:
//! R=0, G=1, B=2, Y=3. 顺序参与寻址计算, 不可改动.

use std::fmt;

/// RGB 输入通道数
pub const NUM_CHANNELS_RGB: usize = 3;

/// 含亮度平面在内的每帧平面总数
pub const NUM_CHANNELS_RGBY: usize = 4;

/// 颜色通道 (Gray 为派生的亮度平面)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// 红色平面
    Red,
    /// 绿色平面
    Green,
    /// 蓝色平面
    Blue,
    /// 亮度平面 (由 RGB 派生并模糊)
    Gray,
}

impl Channel {
    /// 三个输入通道, 按文件内的平面顺序排列
    pub const RGB: [Channel; NUM_CHANNELS_RGB] = [Channel::Red, Channel::Green, Channel::Blue];

    /// 转为平面存储序号
    pub const fn to_index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Gray => 3,
        }
    }

    /// 从存储序号还原通道
    pub const fn from_index(index: usize) -> Option<Channel> {
        match index {
            0 => Some(Channel::Red),
            1 => Some(Channel::Green),
            2 => Some(Channel::Blue),
            3 => Some(Channel::Gray),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Red => "红",
            Channel::Green => "绿",
            Channel::Blue => "蓝",
            Channel::Gray => "灰",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_index_mapping() {
        assert_eq!(Channel::Red.to_index(), 0);
        assert_eq!(Channel::Green.to_index(), 1);
        assert_eq!(Channel::Blue.to_index(), 2);
        assert_eq!(Channel::Gray.to_index(), 3);
    }

    #[test]
    fn test_channel_index_roundtrip() {
        for i in 0..NUM_CHANNELS_RGBY {
            let c = Channel::from_index(i).expect("序号应有对应通道");
            assert_eq!(c.to_index(), i);
        }
        assert!(Channel::from_index(4).is_none());
    }

    #[test]
    fn test_rgb_order_matches_file_layout() {
        // 文件内平面顺序为 R, G, B
        assert_eq!(Channel::RGB[0], Channel::Red);
        assert_eq!(Channel::RGB[1], Channel::Green);
        assert_eq!(Channel::RGB[2], Channel::Blue);
    }
}
