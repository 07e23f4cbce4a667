//! 播放驱动.
//!
//! 推进帧序号, 处理暂停与循环, 把渲染结果交给显示层.
//! `paused` 是显示层与驱动之间唯一共享的可变状态, 用原子布尔建模:
//! 写读双方独立, 最坏延迟一个轮询周期, 不需要锁.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::info;

use muguang_codec::{CompressedVideo, RgbImage};

use crate::display::DisplaySurface;

/// 暂停时的轮询间隔
const PAUSE_POLL: Duration = Duration::from_millis(50);

/// 帧间节拍 (约 30 帧/秒)
const FRAME_PACING: Duration = Duration::from_millis(33);

/// 播放驱动
pub struct Player {
    paused: AtomicBool,
}

impl Player {
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
        }
    }

    /// 切换暂停状态 (响应显示层的用户操作)
    pub fn toggle_pause(&self) {
        let was_paused = self.paused.load(Ordering::Relaxed);
        self.paused.store(!was_paused, Ordering::Relaxed);
    }

    /// 是否已暂停
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// 播放主循环: 循环播放直到窗口关闭
    pub fn run<D: DisplaySurface>(&self, video: &CompressedVideo, display: &mut D) {
        info!("开始播放...");
        let config = video.config();
        let mut image = RgbImage::new(config.frame_width, config.frame_height);
        let mut frame = 0usize;

        while display.is_open() {
            if display.pause_requested() {
                self.toggle_pause();
            }

            // 暂停: 每 50ms 轮询一次, 期间保持窗口事件循环
            while self.is_paused() {
                std::thread::sleep(PAUSE_POLL);
                display.pump();
                if display.pause_requested() {
                    self.toggle_pause();
                }
                if !display.is_open() {
                    info!("窗口关闭, 播放结束");
                    return;
                }
            }

            let gaze = display.gaze_point();
            video.render_frame(frame, gaze, &mut image);
            let header = format!(
                "FG Quant: {}  BG Quant: {}  Gaze On: {}  Frame: {}/{}",
                config.fg_quant,
                config.bg_quant,
                config.gaze_enabled,
                frame,
                config.num_frames,
            );
            display.present(&image, &header);

            frame = next_frame(frame, config.num_frames);
            std::thread::sleep(FRAME_PACING);
        }
        info!("窗口关闭, 播放结束");
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// 推进帧序号, 最后一帧后回绕到 0
fn next_frame(frame: usize, num_frames: usize) -> usize {
    if frame + 1 >= num_frames {
        0
    } else {
        frame + 1
    }
}
