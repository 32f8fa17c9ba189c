// 该文件是 YogaPose （瑜伽姿态） 项目的一部分。
// src/model/movenet.rs - MoveNet 姿态模型
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

use std::{fmt::Display, sync::Mutex};

use ort::{
  session::{Session, builder::GraphOptimizationLevel},
  tensor::TensorElementType,
  value::{Tensor, ValueType},
};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{FrameError, RgbNhwcFrame},
  model::{KEYPOINT_DIM, KEYPOINT_NUM, Model, PoseResult},
};

const MOVENET_NUM_INPUTS: usize = 1;
pub const MOVENET_INPUT_W: u32 = 256;
pub const MOVENET_INPUT_H: u32 = 256;

/// MoveNet Thunder 的输入帧
pub type MoveNetFrame = RgbNhwcFrame<MOVENET_INPUT_W, MOVENET_INPUT_H>;

#[derive(Error, Debug)]
pub enum MoveNetError {
  #[error("model load error: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("invalid model: {0}")]
  ModelInvalid(String),
  #[error("ONNX Runtime error: {0}")]
  OrtError(String),
  #[error("model path error: {0}")]
  ModelPathError(String),
  #[error("unexpected model output shape {0:?}, expected [1, 1, 17, 3]")]
  OutputShapeMismatch(Vec<usize>),
  #[error("{0}")]
  FrameError(#[from] FrameError),
  #[error("inference session poisoned by a previous panic")]
  SessionPoisoned,
}

fn ort_error<E: Display>(err: E) -> MoveNetError {
  MoveNetError::OrtError(err.to_string())
}

/// 模型期望的输入元素类型，像素值都保持 0 - 255 原值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
  Uint8,
  Int32,
  Float32,
}

impl InputKind {
  fn from_element_type(ty: TensorElementType) -> Option<Self> {
    match ty {
      TensorElementType::Uint8 => Some(InputKind::Uint8),
      TensorElementType::Int32 => Some(InputKind::Int32),
      TensorElementType::Float32 => Some(InputKind::Float32),
      _ => None,
    }
  }
}

pub struct MoveNet {
  session: Mutex<Session>,
  input_name: String,
  input_kind: InputKind,
  output_name: String,
}

pub struct MoveNetBuilder {
  model_path: String,
  intra_threads: Option<usize>,
}

impl FromUrlWithScheme for MoveNetBuilder {
  const SCHEME: &'static str = "movenet";
}

impl FromUrl for MoveNetBuilder {
  type Error = MoveNetError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(MoveNetError::ModelPathError(format!(
        "model URL must use the '{}' scheme, found '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    Ok(MoveNetBuilder {
      model_path: url.path().to_string(),
      intra_threads: None,
    })
  }
}

impl MoveNetBuilder {
  pub fn new(model_path: impl Into<String>) -> Self {
    MoveNetBuilder {
      model_path: model_path.into(),
      intra_threads: None,
    }
  }

  pub fn intra_threads(mut self, threads: Option<usize>) -> Self {
    self.intra_threads = threads;
    self
  }

  pub fn build(self) -> Result<MoveNet, MoveNetError> {
    info!("加载模型文件: {}", self.model_path);
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    info!("创建 ONNX Runtime 推理会话");
    let mut builder = Session::builder()
      .map_err(ort_error)?
      .with_optimization_level(GraphOptimizationLevel::Level3)
      .map_err(ort_error)?;
    if let Some(threads) = self.intra_threads {
      debug!("推理线程数: {}", threads);
      builder = builder.with_intra_threads(threads).map_err(ort_error)?;
    }
    let session = builder
      .commit_from_memory(&model_data)
      .map_err(ort_error)?;

    let num_inputs = session.inputs.len();
    let num_outputs = session.outputs.len();
    debug!("模型输入数量: {}", num_inputs);
    debug!("模型输出数量: {}", num_outputs);

    if num_inputs != MOVENET_NUM_INPUTS {
      error!(
        "预期模型输入数量为 {}, 实际为 {}",
        MOVENET_NUM_INPUTS, num_inputs
      );
      return Err(MoveNetError::ModelInvalid(format!(
        "expected {} input, found {}",
        MOVENET_NUM_INPUTS, num_inputs
      )));
    }

    let Some(output) = session.outputs.first() else {
      error!("模型没有输出");
      return Err(MoveNetError::ModelInvalid("model has no outputs".into()));
    };
    let output_name = output.name.clone();

    let input = &session.inputs[0];
    let input_name = input.name.clone();
    let input_kind = match &input.input_type {
      ValueType::Tensor { ty, .. } => InputKind::from_element_type(*ty),
      _ => None,
    }
    .ok_or_else(|| {
      error!("不支持的模型输入类型: {:?}", input.input_type);
      MoveNetError::ModelInvalid(format!(
        "unsupported input type {:?}, expected a uint8, int32 or float32 tensor",
        input.input_type
      ))
    })?;

    info!(
      "模型加载完成: 输入 '{}' ({:?}), 输出 '{}'",
      input_name, input_kind, output_name
    );

    Ok(MoveNet {
      session: Mutex::new(session),
      input_name,
      input_kind,
      output_name,
    })
  }
}

const MOVENET_OUTPUT_SHAPE: [usize; 4] = [1, 1, KEYPOINT_NUM, KEYPOINT_DIM];

/// 输出必须严格为 [1, 1, 17, 3]，其他形状不做修正
fn check_output_shape(shape: &[usize]) -> bool {
  shape == MOVENET_OUTPUT_SHAPE
}

impl Model for MoveNet {
  type Input = MoveNetFrame;
  type Output = PoseResult;
  type Error = MoveNetError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("设置模型输入");
    let batch = input.to_batch()?;
    let value = match self.input_kind {
      InputKind::Uint8 => Tensor::from_array(batch).map_err(ort_error)?.into_dyn(),
      InputKind::Int32 => Tensor::from_array(batch.mapv(i32::from))
        .map_err(ort_error)?
        .into_dyn(),
      InputKind::Float32 => Tensor::from_array(batch.mapv(f32::from))
        .map_err(ort_error)?
        .into_dyn(),
    };

    // 会话不保证可并发运行，同一时刻只允许一次推理
    let mut session = self
      .session
      .lock()
      .map_err(|_| MoveNetError::SessionPoisoned)?;

    debug!("执行模型推理");
    let outputs = session
      .run(ort::inputs![self.input_name.as_str() => value])
      .map_err(ort_error)?;

    debug!("获取模型输出");
    let output = outputs[self.output_name.as_str()]
      .try_extract_array::<f32>()
      .map_err(ort_error)?;

    let shape = output.shape().to_vec();
    debug!("模型输出形状: {:?}", shape);
    if !check_output_shape(&shape) {
      error!("模型输出形状不符: {:?}", shape);
      return Err(MoveNetError::OutputShapeMismatch(shape));
    }

    let values: Vec<f32> = output.iter().copied().collect();
    PoseResult::from_rows(&values).ok_or(MoveNetError::OutputShapeMismatch(shape))
  }
}
