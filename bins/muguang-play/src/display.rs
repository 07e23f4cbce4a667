//! 显示窗口.
//!
//! 使用 minifb 进行窗口渲染. 显示层是薄表现层:
//! 接收重建图像与状态栏文本, 返回注视点, 空格键请求切换暂停.

use log::debug;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use muguang_codec::{GazePoint, RgbImage};

/// 显示表面接口
///
/// 播放驱动通过它提交图像并取回注视点与暂停请求;
/// 测试用脚本化实现替换窗口.
pub trait DisplaySurface {
    /// 提交一帧重建图像与状态栏文本
    fn present(&mut self, image: &RgbImage, header: &str);

    /// 当前注视点 (已映射到帧像素坐标)
    fn gaze_point(&mut self) -> GazePoint;

    /// 用户是否请求切换暂停 (边沿触发)
    fn pause_requested(&mut self) -> bool;

    /// 窗口是否仍然打开
    fn is_open(&self) -> bool;

    /// 泵送窗口事件 (暂停等无新帧期间调用)
    fn pump(&mut self);
}

/// minifb 视频窗口
pub struct VideoDisplay {
    window: Window,
    width: usize,
    height: usize,
    /// 像素缓冲区 (0RGB 格式)
    buffer: Vec<u32>,
    gaze_enabled: bool,
}

impl VideoDisplay {
    /// 创建视频显示窗口
    pub fn new(
        width: usize,
        height: usize,
        gaze_enabled: bool,
        title: &str,
    ) -> Result<Self, String> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| format!("创建窗口失败: {e}"))?;

        debug!("视频窗口已创建: {}x{}", width, height);

        Ok(Self {
            window,
            width,
            height,
            buffer: vec![0u32; width * height],
            gaze_enabled,
        })
    }
}

impl DisplaySurface for VideoDisplay {
    fn present(&mut self, image: &RgbImage, header: &str) {
        // 转换 RGB24 -> 0RGB
        for (dst, src) in self.buffer.iter_mut().zip(image.data.chunks_exact(3)) {
            let r = u32::from(src[0]);
            let g = u32::from(src[1]);
            let b = u32::from(src[2]);
            *dst = (r << 16) | (g << 8) | b;
        }
        self.window.set_title(header);
        let _ = self
            .window
            .update_with_buffer(&self.buffer, self.width, self.height);
    }

    fn gaze_point(&mut self) -> GazePoint {
        if !self.gaze_enabled {
            return GazePoint::default();
        }
        match self.window.get_mouse_pos(MouseMode::Clamp) {
            Some((x, y)) => GazePoint {
                x: x as i32,
                y: y as i32,
                enabled: true,
            },
            None => GazePoint::default(),
        }
    }

    fn pause_requested(&mut self) -> bool {
        self.window.is_key_pressed(Key::Space, KeyRepeat::No)
    }

    fn is_open(&self) -> bool {
        self.window.is_open()
    }

    fn pump(&mut self) {
        let _ = self
            .window
            .update_with_buffer(&self.buffer, self.width, self.height);
    }
}
