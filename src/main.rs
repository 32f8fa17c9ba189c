// 该文件是 YogaPose （瑜伽姿态） 项目的一部分。
// src/main.rs - 姿态检测服务主程序
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

mod args;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use yoga_pose::{FromUrl, model::MoveNetBuilder, server};

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("监听地址: {}", args.listen_addr());

  info!("正在加载 MoveNet Thunder 模型...");
  let model = MoveNetBuilder::from_url(&args.model)?
    .intra_threads(args.threads)
    .build()?;

  server::serve(Arc::new(model), args.listen_addr()).await?;

  Ok(())
}
