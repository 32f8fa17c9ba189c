// 该文件是 YogaPose （瑜伽姿态） 项目的一部分。
// src/task.rs - 单次检测任务
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

use thiserror::Error;
use tracing::{debug, info};

use crate::{
  input::{FromImage, InputError, decode_base64, decode_image},
  model::{Model, PoseResult},
};

/// 可以在 HTTP 服务中共享的姿态模型
pub trait PoseModel:
  Model<Output = PoseResult, Input: FromImage, Error: std::error::Error + Send + Sync + 'static>
  + Send
  + Sync
  + 'static
{
}

impl<T> PoseModel for T where
  T: Model<Output = PoseResult, Input: FromImage, Error: std::error::Error + Send + Sync + 'static>
    + Send
    + Sync
    + 'static
{
}

#[derive(Error, Debug)]
pub enum TaskError {
  #[error(transparent)]
  InputError(#[from] InputError),
  #[error(transparent)]
  ModelError(Box<dyn std::error::Error + Send + Sync>),
}

/// 解码、预处理、推理，一张图像走一遍
#[derive(Debug, Clone)]
pub struct OneShotTask {
  data: Vec<u8>,
}

impl OneShotTask {
  pub fn new(data: Vec<u8>) -> Self {
    OneShotTask { data }
  }

  pub fn from_base64(text: &str) -> Result<Self, TaskError> {
    Ok(OneShotTask::new(decode_base64(text)?))
  }

  pub fn run_task<M: PoseModel>(self, model: &M) -> Result<PoseResult, TaskError> {
    let image = decode_image(&self.data)?;
    let frame = <M::Input as FromImage>::from_image(&image)?;
    debug!("预处理完成，开始推理...");

    let now = std::time::Instant::now();
    let result = model
      .infer(&frame)
      .map_err(|e| TaskError::ModelError(Box::new(e)))?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());

    Ok(result)
  }
}
