// 该文件是 Masisso （맛있소） 项目的一部分。
// src/interpreter/rknn.rs - 基于 RKNPU 的推理后端
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

use rknpu::{Context, InitFlags, TensorFormat, TensorType};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, interpreter::Interpreter};

const RKNN_NUM_INPUTS: u32 = 1;
const RKNN_NUM_OUTPUTS: u32 = 1;

#[derive(Error, Debug)]
pub enum RknnError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(std::io::Error),
  #[error("模型无效: {0}, 错误: {1}")]
  ModelInvalid(String, rknpu::Error),
  #[error("RKNN 错误: {0}")]
  RknnError(rknpu::Error),
  #[error("输出长度不匹配: 期望 {expected}, 实际 {actual}")]
  OutputLength { expected: usize, actual: usize },
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
}

impl From<std::io::Error> for RknnError {
  fn from(err: std::io::Error) -> Self {
    RknnError::ModelLoadError(err)
  }
}

impl From<rknpu::Error> for RknnError {
  fn from(err: rknpu::Error) -> Self {
    RknnError::RknnError(err)
  }
}

impl RknnError {
  pub fn invalid(msg: &str, e: rknpu::Error) -> Self {
    RknnError::ModelInvalid(msg.to_string(), e)
  }
}

/// 在 Rockchip NPU 上执行 RKNN 模型，输入为本机字节序的 f32 NCHW 张量
pub struct RknnInterpreter {
  context: Context,
}

impl FromUrlWithScheme for RknnInterpreter {
  const SCHEME: &'static str = "rknn";
}

impl FromUrl for RknnInterpreter {
  type Error = RknnError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(RknnError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    let path = urlencoding::decode(url.path())
      .map_err(|e| RknnError::ModelPathError(format!("{}: {}", url, e)))?;
    Self::load(path.as_ref(), InitFlags::default())
  }
}

impl RknnInterpreter {
  pub fn load(model_path: &str, flags: InitFlags) -> Result<Self, RknnError> {
    info!("加载模型文件: {}", model_path);
    let model_data = std::fs::read(model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    info!("创建 RKNN 推理上下文");
    let context = Context::new(&model_data, flags)?;

    let num_inputs = context
      .num_inputs()
      .map_err(|e| RknnError::invalid("无法获取输入数量", e))?;
    let num_outputs = context
      .num_outputs()
      .map_err(|e| RknnError::invalid("无法获取输出数量", e))?;

    if num_inputs != RKNN_NUM_INPUTS || num_outputs != RKNN_NUM_OUTPUTS {
      error!(
        "预期模型输入/输出数量为 {}/{}, 实际为 {}/{}",
        RKNN_NUM_INPUTS, RKNN_NUM_OUTPUTS, num_inputs, num_outputs
      );
      return Err(RknnError::invalid(
        &format!(
          "预期模型输入/输出数量为 {}/{}, 实际为 {}/{}",
          RKNN_NUM_INPUTS, RKNN_NUM_OUTPUTS, num_inputs, num_outputs
        ),
        rknpu::Error::InvalidModel,
      ));
    }

    info!("模型加载完成");
    Ok(Self { context })
  }
}

impl Interpreter for RknnInterpreter {
  type Error = RknnError;

  fn run(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), Self::Error> {
    let bytes: Vec<u8> = input.iter().flat_map(|v| v.to_ne_bytes()).collect();

    debug!("设置模型输入");
    self
      .context
      .set_input(0, &bytes, TensorFormat::NCHW, TensorType::Float32)?;

    debug!("执行模型推理");
    self.context.run()?;

    let outputs = self.context.get_outputs()?;
    let values = outputs.get_f32(0)?;
    if values.len() != output.len() {
      return Err(RknnError::OutputLength {
        expected: output.len(),
        actual: values.len(),
      });
    }
    output.copy_from_slice(values);
    Ok(())
  }
}
