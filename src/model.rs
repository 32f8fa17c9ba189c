// 该文件是 YogaPose （瑜伽姿态） 项目的一部分。
// src/model.rs - 模型
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

use serde::{Deserialize, Serialize};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 每个姿态的关键点数量
pub const KEYPOINT_NUM: usize = 17;
/// 每个关键点的取值数量: [y, x, score]
pub const KEYPOINT_DIM: usize = 3;

/// 单个关键点，坐标与置信度都归一化到 0.0 - 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
  pub y: f32,
  pub x: f32,
  pub score: f32,
}

/// 一次检测的结果。
///
/// 关键点的顺序由加载的模型决定，这里只保证下标 0..16。
/// MoveNet 使用 COCO 顺序（鼻子、双眼、双耳、双肩、双肘、双腕、双髋、双膝、双踝）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseResult {
  pub keypoints: [Keypoint; KEYPOINT_NUM],
}

impl PoseResult {
  /// 按行拆解 17x3 的模型输出，长度不符时返回 None
  pub fn from_rows(values: &[f32]) -> Option<Self> {
    if values.len() != KEYPOINT_NUM * KEYPOINT_DIM {
      return None;
    }

    let keypoints = std::array::from_fn(|i| {
      let row = &values[i * KEYPOINT_DIM..(i + 1) * KEYPOINT_DIM];
      Keypoint {
        y: row[0],
        x: row[1],
        score: row[2],
      }
    });
    Some(PoseResult { keypoints })
  }
}

mod movenet;
pub use self::movenet::{
  MOVENET_INPUT_H, MOVENET_INPUT_W, MoveNet, MoveNetBuilder, MoveNetError, MoveNetFrame,
};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_rows_preserves_order() {
    let values: Vec<f32> = (0..KEYPOINT_NUM * KEYPOINT_DIM)
      .map(|v| v as f32 / 100.0)
      .collect();
    let result = PoseResult::from_rows(&values).unwrap();

    assert_eq!(result.keypoints.len(), KEYPOINT_NUM);
    assert_eq!(
      result.keypoints[0],
      Keypoint {
        y: 0.0,
        x: 0.01,
        score: 0.02
      }
    );
    assert_eq!(
      result.keypoints[16],
      Keypoint {
        y: 0.48,
        x: 0.49,
        score: 0.50
      }
    );
  }

  #[test]
  fn from_rows_rejects_wrong_length() {
    assert!(PoseResult::from_rows(&[0.0; 50]).is_none());
    assert!(PoseResult::from_rows(&[0.0; 52]).is_none());
  }

  #[test]
  fn keypoints_serialize_with_short_names() {
    let result = PoseResult::from_rows(&[0.5; 51]).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    let first = &json["keypoints"][0];
    assert_eq!(first["y"], 0.5);
    assert_eq!(first["x"], 0.5);
    assert_eq!(first["score"], 0.5);
    assert_eq!(json["keypoints"].as_array().unwrap().len(), 17);
  }
}
