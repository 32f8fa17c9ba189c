// 该文件是 YogaPose （瑜伽姿态） 项目的一部分。
// src/bin/detect_image.rs - 单张图像推理
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use anyhow::Result;
use clap::Parser;
use tracing::info;
use url::Url;

use yoga_pose::{FromUrl, input::ImageFileInput, model::MoveNetBuilder, task::OneShotTask};

/// 对单张图像运行姿态检测，输出与 HTTP 接口相同的 JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// MoveNet ONNX 模型路径
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入图像，例如 image:///tmp/pose.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入来源: {}", args.input);

  let input_image = ImageFileInput::from_url(&args.input)?;
  let model = MoveNetBuilder::from_url(&args.model)?.build()?;

  for data in input_image {
    let result = OneShotTask::new(data).run_task(&model)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
  }

  Ok(())
}
