// 该文件是 YogaPose （瑜伽姿态） 项目的一部分。
// src/frame.rs - NHWC 帧定义
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

use ndarray::{Array4, ShapeError};
use thiserror::Error;

use crate::input::AsNhwcFrame;

pub const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug)]
pub enum FrameError {
  #[error("frame length mismatch: expected {expected} bytes, got {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error("frame size mismatch: expected {expected:?}, got {actual:?}")]
  SizeMismatch {
    expected: (u32, u32),
    actual: (u32, u32),
  },
  #[error("tensor shape error: {0}")]
  Shape(#[from] ShapeError),
}

/// 单张 RGB 图像，按 NHWC (N = 1) 排列的 u8 数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbNhwcFrame<const W: u32, const H: u32> {
  data: Box<[u8]>,
}

impl<const W: u32, const H: u32> RgbNhwcFrame<W, H> {
  pub const LEN: usize = RGB_CHANNELS * W as usize * H as usize;

  /// 模型输入张量的形状 `[1, H, W, 3]`
  pub fn batch_shape(&self) -> [usize; 4] {
    [1, H as usize, W as usize, RGB_CHANNELS]
  }

  /// 复制数据并加上大小为 1 的批次维度
  pub fn to_batch(&self) -> Result<Array4<u8>, FrameError> {
    let shape = self.batch_shape();
    Ok(Array4::from_shape_vec(shape, self.data.to_vec())?)
  }
}

impl<const W: u32, const H: u32> TryFrom<Vec<u8>> for RgbNhwcFrame<W, H> {
  type Error = FrameError;

  fn try_from(data: Vec<u8>) -> Result<Self, Self::Error> {
    if data.len() != Self::LEN {
      return Err(FrameError::LengthMismatch {
        expected: Self::LEN,
        actual: data.len(),
      });
    }

    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }
}

impl<const W: u32, const H: u32> TryFrom<image::RgbImage> for RgbNhwcFrame<W, H> {
  type Error = FrameError;

  fn try_from(image: image::RgbImage) -> Result<Self, Self::Error> {
    let dimensions = image.dimensions();
    if dimensions != (W, H) {
      return Err(FrameError::SizeMismatch {
        expected: (W, H),
        actual: dimensions,
      });
    }

    // RgbImage 的原始缓冲区按行存储，每个像素连续三个通道，即 HWC
    Self::try_from(image.into_raw())
  }
}

impl<const W: u32, const H: u32> Default for RgbNhwcFrame<W, H> {
  fn default() -> Self {
    let data = vec![0u8; Self::LEN].into_boxed_slice();
    Self { data }
  }
}

impl<const W: u32, const H: u32> AsNhwcFrame<W, H> for RgbNhwcFrame<W, H> {
  fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}
