mod common;

use std::path::Path;

use url::Url;
use yoga_pose::{
  FromUrl,
  model::{KEYPOINT_NUM, Model, MoveNetBuilder, MoveNetError, MoveNetFrame},
  task::OneShotTask,
};

use common::sample_png;

const MODEL_PATH: &str = "models/movenet_thunder.onnx";

fn model_path() -> Option<String> {
  let path = std::env::var("MOVENET_MODEL").unwrap_or_else(|_| MODEL_PATH.to_string());
  if Path::new(&path).exists() {
    Some(path)
  } else {
    eprintln!("Skipping real model test: {} not found", path);
    None
  }
}

#[test]
fn test_model_url_must_use_movenet_scheme() {
  let url = Url::parse("image:///tmp/pose.jpg").unwrap();
  assert!(matches!(
    MoveNetBuilder::from_url(&url),
    Err(MoveNetError::ModelPathError(_))
  ));
}

#[test]
fn test_missing_model_file_fails_to_load() {
  let url = Url::parse("movenet:///nonexistent/movenet_thunder.onnx").unwrap();
  let result = MoveNetBuilder::from_url(&url).unwrap().build();
  assert!(result.is_err());
}

#[test]
fn test_real_model_on_blank_frame() {
  let Some(path) = model_path() else {
    return;
  };
  let model = MoveNetBuilder::new(path).build().expect("Failed to load real model");

  let result = model.infer(&MoveNetFrame::default()).expect("Inference failed");
  assert_eq!(result.keypoints.len(), KEYPOINT_NUM);
  for keypoint in &result.keypoints {
    assert!((0.0..=1.0).contains(&keypoint.score));
  }
}

#[test]
fn test_real_model_is_deterministic() {
  let Some(path) = model_path() else {
    return;
  };
  let model = MoveNetBuilder::new(path).build().expect("Failed to load real model");

  let first = OneShotTask::new(sample_png()).run_task(&model).unwrap();
  let second = OneShotTask::new(sample_png()).run_task(&model).unwrap();
  assert_eq!(first, second);
}
