#![allow(dead_code)]

use std::{convert::Infallible, io::Cursor};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use yoga_pose::{
  input::AsNhwcFrame,
  model::{KEYPOINT_DIM, KEYPOINT_NUM, Model, MoveNetFrame, PoseResult},
};

/// 确定性的替身模型，关键点取值直接读自帧数据，不同图像得到不同结果
pub struct PixelEchoModel;

impl Model for PixelEchoModel {
  type Input = MoveNetFrame;
  type Output = PoseResult;
  type Error = Infallible;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let data = input.as_nhwc();
    let stride = data.len() / (KEYPOINT_NUM * KEYPOINT_DIM);
    let values: Vec<f32> = (0..KEYPOINT_NUM * KEYPOINT_DIM)
      .map(|i| data[i * stride] as f32 / 255.0)
      .collect();
    Ok(PoseResult::from_rows(&values).expect("51 values"))
  }
}

#[derive(Debug, thiserror::Error)]
#[error("model exploded")]
pub struct ModelFailure;

pub struct FailingModel;

impl Model for FailingModel {
  type Input = MoveNetFrame;
  type Output = PoseResult;
  type Error = ModelFailure;

  fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    Err(ModelFailure)
  }
}

pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
  RgbImage::from_fn(width, height, |x, y| {
    Rgb([
      (x * 255 / width.max(1)) as u8,
      (y * 255 / height.max(1)) as u8,
      ((x + y) % 256) as u8,
    ])
  })
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
  let mut buffer = Vec::new();
  image
    .write_to(&mut Cursor::new(&mut buffer), format)
    .expect("encode test image");
  buffer
}

pub fn sample_png() -> Vec<u8> {
  encode(&DynamicImage::ImageRgb8(gradient_rgb(320, 240)), ImageFormat::Png)
}
