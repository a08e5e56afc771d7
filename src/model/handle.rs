// 该文件是 Masisso （맛있소） 项目的一部分。
// src/model/handle.rs - 模型句柄
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

use std::sync::{Mutex, PoisonError};

use image::RgbImage;
use tracing::{debug, warn};

use crate::{
  config::{INPUT_SIZE, Normalization},
  frame::{NormalizedTensor, TensorLengthError},
  interpreter::Interpreter,
  model::InferenceError,
};

/// 持有一个解释器实例及其预处理参数。
///
/// 解释器放在互斥锁中，同一实例同一时刻只有一次推理在执行；
/// 不同的句柄之间互不影响。
pub struct ModelHandle<I> {
  name: &'static str,
  interpreter: Mutex<I>,
  normalization: Normalization,
  num_outputs: usize,
}

impl<I: Interpreter> ModelHandle<I> {
  pub fn new(
    name: &'static str,
    interpreter: I,
    normalization: Normalization,
    num_outputs: usize,
  ) -> Self {
    Self {
      name,
      interpreter: Mutex::new(interpreter),
      normalization,
      num_outputs,
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn normalization(&self) -> &Normalization {
    &self.normalization
  }

  pub fn num_outputs(&self) -> usize {
    self.num_outputs
  }

  /// 预处理图像并执行推理，返回原始输出向量
  pub fn run_image(&self, image: &RgbImage) -> Result<Vec<f32>, InferenceError> {
    let tensor: NormalizedTensor<INPUT_SIZE, INPUT_SIZE> =
      NormalizedTensor::from_image(image, &self.normalization);
    self.run_tensor(tensor.as_slice())
  }

  /// 对已经预处理好的张量执行推理
  pub fn run_tensor(&self, input: &[f32]) -> Result<Vec<f32>, InferenceError> {
    let expected = NormalizedTensor::<INPUT_SIZE, INPUT_SIZE>::LEN;
    if input.len() != expected {
      return Err(TensorLengthError {
        expected,
        actual: input.len(),
      }
      .into());
    }

    let mut output = vec![0f32; self.num_outputs];
    {
      // 解释器状态只在单次调用内有效，锁中毒后可以继续使用
      let mut interpreter = self
        .interpreter
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
      debug!("{}: 执行模型推理", self.name);
      interpreter
        .run(input, &mut output)
        .map_err(|e| InferenceError::Interpreter(Box::new(e)))?;
    }

    debug!("{}: 模型原始输出 {:?}", self.name, output);
    if let Some((index, &value)) = output.iter().enumerate().find(|(_, v)| !v.is_finite()) {
      warn!("{}: 模型输出包含非有限值", self.name);
      return Err(InferenceError::NonFiniteOutput { index, value });
    }
    Ok(output)
  }
}
