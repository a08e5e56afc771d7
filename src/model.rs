// 该文件是 Masisso （맛있소） 项目的一部分。
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

use thiserror::Error;

use crate::frame::TensorLengthError;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> String;
  fn to_label_id(&self) -> u32;
  fn from_label_id(id: u32) -> Option<Self>;
}

/// 单次推理调用的错误。出错后解释器仍可用于后续调用。
#[derive(Error, Debug)]
pub enum InferenceError {
  #[error("输入张量长度错误: {0}")]
  TensorLength(#[from] TensorLengthError),
  #[error("模型输出为空")]
  EmptyOutput,
  #[error("模型输出第 {index} 项不是有限值: {value}")]
  NonFiniteOutput { index: usize, value: f32 },
  #[error("解释器执行失败: {0}")]
  Interpreter(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// 数值稳定的 softmax：先减去最大值再取指数并归一化
pub fn softmax(logits: &[f32]) -> Vec<f32> {
  if logits.is_empty() {
    return Vec::new();
  }
  let max_logit = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
  let exps: Vec<f64> = logits
    .iter()
    .map(|v| ((v - max_logit) as f64).exp())
    .collect();
  let sum: f64 = exps.iter().sum();
  exps.iter().map(|e| (e / sum) as f32).collect()
}

/// 最大值下标，并列时取最靠前的一个。NaN 不参与比较，
/// 空向量或全为 NaN 时返回 `None`
pub fn argmax(values: &[f32]) -> Option<usize> {
  let mut best: Option<(usize, f32)> = None;
  for (i, &v) in values.iter().enumerate() {
    if v.is_nan() {
      continue;
    }
    match best {
      Some((_, b)) if v <= b => {}
      _ => best = Some((i, v)),
    }
  }
  best.map(|(i, _)| i)
}

mod handle;
mod grade_classifier;
mod part_detector;

pub use self::handle::ModelHandle;
pub use self::grade_classifier::{GRADE_LABELS, Grade, GradeClassifier, GradeResult, UNKNOWN_LABEL};
pub use self::part_detector::{PartDetector, PartIndex};
