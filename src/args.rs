// 该文件是 YogaPose （瑜伽姿态） 项目的一部分。
// src/args.rs - 服务参数配置
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

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use url::Url;

/// YogaPose 姿态检测服务参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// MoveNet ONNX 模型路径，例如 movenet:///models/movenet_thunder.onnx
  #[arg(long, value_name = "MODEL")]
  pub model: Url,

  /// 监听地址
  #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED), value_name = "ADDR")]
  pub host: IpAddr,

  /// 监听端口
  #[arg(long, default_value_t = 7860, value_name = "PORT")]
  pub port: u16,

  /// ONNX Runtime 推理线程数（不指定则由运行时决定）
  #[arg(long, value_name = "COUNT")]
  pub threads: Option<usize>,
}

impl Args {
  pub fn listen_addr(&self) -> SocketAddr {
    SocketAddr::new(self.host, self.port)
  }
}
