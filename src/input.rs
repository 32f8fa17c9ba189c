// 该文件是 YogaPose （瑜伽姿态） 项目的一部分。
// src/input.rs - 图像输入与预处理
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

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageReader, imageops::FilterType};
use thiserror::Error;
use tracing::debug;

use crate::frame::{FrameError, RgbNhwcFrame};

pub trait AsNhwcFrame<const W: u32, const H: u32> {
  fn as_nhwc(&self) -> &[u8];
}

/// 可由任意解码后的图像构造的模型输入
pub trait FromImage: Sized {
  fn from_image(image: &DynamicImage) -> Result<Self, InputError>;
}

mod read_image_file;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("cannot identify image: {0}")]
  ImageDecodeError(#[from] image::ImageError),
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("invalid base64 data: {0}")]
  Base64Error(#[from] base64::DecodeError),
  #[error("{0}")]
  FrameError(#[from] FrameError),
}

const DATA_URL_PREFIX: &str = "data:";
const DATA_URL_BASE64_SUFFIX: &str = ";base64";

/// 从内存中的字节解码图像，格式根据内容猜测
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, InputError> {
  let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
  debug!("图像格式: {:?}, 数据大小: {} 字节", reader.format(), data.len());
  let image = reader.decode()?;
  debug!(
    "解码图像: {}x{} {:?}",
    image.width(),
    image.height(),
    image.color()
  );
  Ok(image)
}

/// 解码 base64 文本，允许前后空白以及浏览器生成的 `data:<mime>;base64,` 前缀
pub fn decode_base64(text: &str) -> Result<Vec<u8>, InputError> {
  let text = text.trim();
  let payload = match text.split_once(',') {
    Some((head, body))
      if head.starts_with(DATA_URL_PREFIX) && head.ends_with(DATA_URL_BASE64_SUFFIX) =>
    {
      body
    }
    _ => text,
  };

  let payload: String = payload
    .chars()
    .filter(|c| !c.is_ascii_whitespace())
    .collect();
  Ok(STANDARD.decode(payload)?)
}

/// 缩放到 W x H（不保持宽高比），再转换为三通道 RGB
pub fn preprocess<const W: u32, const H: u32>(
  image: &DynamicImage,
) -> Result<RgbNhwcFrame<W, H>, InputError> {
  let resized = image.resize_exact(W, H, FilterType::CatmullRom);
  let rgb = match resized {
    DynamicImage::ImageRgb8(rgb) => rgb,
    other => other.to_rgb8(),
  };
  Ok(RgbNhwcFrame::try_from(rgb)?)
}

impl<const W: u32, const H: u32> FromImage for RgbNhwcFrame<W, H> {
  fn from_image(image: &DynamicImage) -> Result<Self, InputError> {
    preprocess::<W, H>(image)
  }
}
