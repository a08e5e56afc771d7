// 该文件是 Masisso （맛있소） 项目的一部分。
// src/interpreter/tract.rs - 基于 tract 的 ONNX CPU 推理后端
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
use tract_onnx::prelude::{
  DatumExt, Framework, Graph, InferenceModelExt, SimplePlan, Tensor, TypedFact, TypedOp, tvec,
};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  config::INPUT_SIZE,
  interpreter::Interpreter,
};

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

const TRACT_INPUT_SHAPE: [usize; 4] = [1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize];

#[derive(Error, Debug)]
pub enum TractError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(std::io::Error),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("推理执行失败: {0}")]
  RunError(String),
  #[error("模型没有输出")]
  NoOutput,
  #[error("输出长度不匹配: 期望 {expected}, 实际 {actual}")]
  OutputLength { expected: usize, actual: usize },
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
}

impl From<std::io::Error> for TractError {
  fn from(err: std::io::Error) -> Self {
    TractError::ModelLoadError(err)
  }
}

/// 以 ONNX 计算图为模型文件，在 CPU 上执行推理
pub struct TractInterpreter {
  runnable: RunnableModel,
}

impl FromUrlWithScheme for TractInterpreter {
  const SCHEME: &'static str = "tract";
}

impl FromUrl for TractInterpreter {
  type Error = TractError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(TractError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    let path = urlencoding::decode(url.path())
      .map_err(|e| TractError::ModelPathError(format!("{}: {}", url, e)))?;
    Self::load(path.as_ref())
  }
}

impl TractInterpreter {
  pub fn load(model_path: &str) -> Result<Self, TractError> {
    info!("加载模型文件: {}", model_path);
    let model_data = std::fs::read(model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    let runnable = tract_onnx::onnx()
      .model_for_read(&mut model_data.as_slice())
      .map_err(|e| TractError::ModelInvalid(format!("无法解析 ONNX 计算图: {e:#}")))?
      .with_input_fact(0, f32::fact(TRACT_INPUT_SHAPE).into())
      .map_err(|e| TractError::ModelInvalid(format!("无法设置输入形状: {e:#}")))?
      .into_optimized()
      .map_err(|e| TractError::ModelInvalid(format!("无法优化计算图: {e:#}")))?
      .into_runnable()
      .map_err(|e| TractError::ModelInvalid(format!("无法生成可执行计划: {e:#}")))?;

    info!("模型加载完成");
    Ok(Self { runnable })
  }
}

impl Interpreter for TractInterpreter {
  type Error = TractError;

  fn run(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), Self::Error> {
    let tensor = Tensor::from_shape(&TRACT_INPUT_SHAPE, input)
      .map_err(|e| TractError::RunError(format!("{e:#}")))?;

    debug!("执行模型推理");
    let outputs = self
      .runnable
      .run(tvec!(tensor.into()))
      .map_err(|e| TractError::RunError(format!("{e:#}")))?;

    let first = outputs.first().ok_or(TractError::NoOutput)?;
    let values = first
      .as_slice::<f32>()
      .map_err(|e| TractError::RunError(format!("{e:#}")))?;

    if values.len() != output.len() {
      return Err(TractError::OutputLength {
        expected: output.len(),
        actual: values.len(),
      });
    }
    output.copy_from_slice(values);
    Ok(())
  }
}
