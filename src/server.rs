// 该文件是 YogaPose （瑜伽姿态） 项目的一部分。
// src/server.rs - HTTP 服务
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

use std::{net::SocketAddr, sync::Arc};

use axum::{
  Form, Json, Router,
  extract::{
    DefaultBodyLimit, FromRequest, Multipart, Request, State,
    multipart::{MultipartError, MultipartRejection},
    rejection::FormRejection,
  },
  http::{StatusCode, header::CONTENT_TYPE},
  response::{IntoResponse, Response},
  routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::{
  model::PoseResult,
  task::{OneShotTask, PoseModel, TaskError},
};

/// 上传的图像大小上限
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const FILE_FIELD: &str = "file";
const BASE64_FIELD: &str = "image_data";

#[derive(Error, Debug)]
pub enum ServerError {
  #[error("{0}")]
  MultipartRejection(#[from] MultipartRejection),
  #[error("{0}")]
  MultipartError(#[from] MultipartError),
  #[error("{0}")]
  FormRejection(#[from] FormRejection),
  #[error("missing form field '{0}'")]
  MissingField(&'static str),
  #[error("{0}")]
  TaskError(#[from] TaskError),
  #[error("inference worker failed: {0}")]
  JoinError(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
  fn into_response(self) -> Response {
    error!("处理图像失败: {}", self);
    let body = json!({ "detail": format!("Error processing image: {}", self) });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
  }
}

pub struct AppState<M> {
  model: Arc<M>,
}

impl<M> Clone for AppState<M> {
  fn clone(&self) -> Self {
    AppState {
      model: Arc::clone(&self.model),
    }
  }
}

#[derive(Debug, Serialize)]
struct HealthStatus {
  message: &'static str,
  status: &'static str,
}

#[derive(Debug, Deserialize)]
struct Base64Form {
  image_data: String,
}

pub fn router<M: PoseModel>(model: Arc<M>) -> Router {
  Router::new()
    .route("/", get(health_check))
    .route("/detect", post(detect_pose::<M>))
    .route("/detect_base64", post(detect_pose_base64::<M>))
    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    .layer(CorsLayer::very_permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(AppState { model })
}

pub async fn serve<M: PoseModel>(model: Arc<M>, addr: SocketAddr) -> std::io::Result<()> {
  let listener = TcpListener::bind(addr).await?;
  info!("姿态检测服务监听于: {}", listener.local_addr()?);

  axum::serve(listener, router(model))
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  info!("服务已停止");
  Ok(())
}

async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => info!("收到中断信号，准备退出..."),
    Err(e) => error!("监听中断信号失败: {}", e),
  }
}

async fn health_check() -> Json<HealthStatus> {
  Json(HealthStatus {
    message: "Yoga Pose Detection Server Running",
    status: "ok",
  })
}

async fn detect_pose<M: PoseModel>(
  State(state): State<AppState<M>>,
  request: Request,
) -> Result<Json<PoseResult>, ServerError> {
  let data = read_file_field(request).await?;
  let result = run_detection(state.model, OneShotTask::new(data)).await?;
  Ok(Json(result))
}

async fn detect_pose_base64<M: PoseModel>(
  State(state): State<AppState<M>>,
  request: Request,
) -> Result<Json<PoseResult>, ServerError> {
  let image_data = read_base64_field(request).await?;
  let task = OneShotTask::from_base64(&image_data)?;
  let result = run_detection(state.model, task).await?;
  Ok(Json(result))
}

/// 读取 `file` 字段，或第一个带文件名的字段
async fn read_file_field(request: Request) -> Result<Vec<u8>, ServerError> {
  let mut multipart = Multipart::from_request(request, &()).await?;
  while let Some(field) = multipart.next_field().await? {
    if field.name() == Some(FILE_FIELD) || field.file_name().is_some() {
      if field.name() != Some(FILE_FIELD) {
        warn!("未找到 '{}' 字段，使用文件字段 {:?}", FILE_FIELD, field.name());
      }
      return Ok(field.bytes().await?.to_vec());
    }
  }
  Err(ServerError::MissingField(FILE_FIELD))
}

/// `image_data` 既可以来自 multipart 表单，也可以来自 urlencoded 表单
async fn read_base64_field(request: Request) -> Result<String, ServerError> {
  let is_multipart = request
    .headers()
    .get(CONTENT_TYPE)
    .and_then(|value| value.to_str().ok())
    .is_some_and(|value| value.starts_with("multipart/form-data"));

  if !is_multipart {
    let Form(form) = Form::<Base64Form>::from_request(request, &()).await?;
    return Ok(form.image_data);
  }

  let mut multipart = Multipart::from_request(request, &()).await?;
  while let Some(field) = multipart.next_field().await? {
    if field.name() == Some(BASE64_FIELD) {
      return Ok(field.text().await?);
    }
  }
  Err(ServerError::MissingField(BASE64_FIELD))
}

/// 推理在阻塞线程池中执行，避免占用异步运行时
async fn run_detection<M: PoseModel>(
  model: Arc<M>,
  task: OneShotTask,
) -> Result<PoseResult, ServerError> {
  let result = tokio::task::spawn_blocking(move || task.run_task(model.as_ref())).await??;
  Ok(result)
}
