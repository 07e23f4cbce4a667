//! # muguang-play
//!
//! 前景/背景感知的视频压缩模拟器.
//!
//! 读取裸 RGB 视频文件, 按运动分析把每帧分为前景与背景,
//! 分别用不同的量化强度走 DCT 压缩管线, 循环播放重建结果.
//! 开启注视窗口后, 鼠标指向的区域强制无损量化 (q=1).
//!
//! 控制: 空格暂停/继续, 关闭窗口退出.

mod display;
mod player;

use clap::Parser;
use log::info;

use muguang_codec::CompressedVideo;
use muguang_core::VideoParams;

/// 视频帧宽 (像素, 输入文件必须匹配)
const FRAME_WIDTH: usize = 960;

/// 视频帧高 (像素)
const FRAME_HEIGHT: usize = 540;

/// 前景/背景感知的视频压缩模拟器
#[derive(Parser)]
#[command(name = "muguang-play", about = "前景/背景感知的视频压缩模拟器")]
struct Args {
    /// 输入文件路径 (.rgb 裸平面格式, 960x540)
    input: String,

    /// 前景量化强度 (整数, >= 1)
    fg_quant: u32,

    /// 背景量化强度 (整数, >= 1)
    bg_quant: u32,

    /// 注视窗口开关 (1 开, 0 关)
    gaze: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let gaze_enabled = match args.gaze.as_str() {
        "1" => true,
        "0" => false,
        other => {
            eprintln!("无效的注视开关 (期望 1 或 0): {other}");
            std::process::exit(2);
        }
    };
    if args.fg_quant < 1 || args.bg_quant < 1 {
        eprintln!("量化强度必须 >= 1");
        std::process::exit(2);
    }

    let params = VideoParams {
        frame_width: FRAME_WIDTH,
        frame_height: FRAME_HEIGHT,
        fg_quant: args.fg_quant,
        bg_quant: args.bg_quant,
        gaze_enabled,
        ..VideoParams::default()
    };

    info!("muguang-play: 打开 {}", args.input);

    let video = match CompressedVideo::load(params, &args.input) {
        Ok(video) => video,
        Err(e) => {
            eprintln!("加载失败: {e}");
            std::process::exit(1);
        }
    };

    let config = video.config();
    let mut display = match display::VideoDisplay::new(
        config.frame_width,
        config.frame_height,
        config.gaze_enabled,
        "muguang-play",
    ) {
        Ok(display) => display,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let player = player::Player::new();
    player.run(&video, &mut display);
}
