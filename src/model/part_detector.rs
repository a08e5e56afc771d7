// 该文件是 Masisso （맛있소） 项目的一部分。
// src/model/part_detector.rs - 部位检测模型
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

use std::fmt;

use image::RgbImage;
use tracing::debug;

use crate::{
  config::{Normalization, PART_CLASS_NUM},
  interpreter::Interpreter,
  model::{InferenceError, Model, ModelHandle, argmax},
};

/// 部位检测模型输出的类别编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartIndex(pub usize);

impl PartIndex {
  pub fn index(&self) -> usize {
    self.0
  }
}

impl fmt::Display for PartIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// 区分目标肌肉与其他部位的三分类模型
pub struct PartDetector<I> {
  handle: ModelHandle<I>,
}

impl<I: Interpreter> PartDetector<I> {
  pub fn new(interpreter: I, normalization: Normalization) -> Self {
    Self {
      handle: ModelHandle::new("部位检测", interpreter, normalization, PART_CLASS_NUM),
    }
  }

  pub fn detect(&self, image: &RgbImage) -> Result<PartIndex, InferenceError> {
    let logits = self.handle.run_image(image)?;
    Self::postprocess(&logits)
  }
}

impl<I> PartDetector<I> {
  /// 直接对原始 logits 取最大值下标，不做概率归一化
  pub fn postprocess(logits: &[f32]) -> Result<PartIndex, InferenceError> {
    let index = argmax(logits).ok_or(InferenceError::EmptyOutput)?;
    debug!("部位检测结果: {} (logits: {:?})", index, logits);
    Ok(PartIndex(index))
  }
}

impl<I: Interpreter> Model for PartDetector<I> {
  type Input = RgbImage;
  type Output = PartIndex;
  type Error = InferenceError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self.detect(input)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  type Detector = PartDetector<()>;

  #[test]
  fn picks_largest_logit() {
    let part = Detector::postprocess(&[0.1, 0.2, 5.0]).unwrap();
    assert_eq!(part, PartIndex(2));
  }

  #[test]
  fn ties_go_to_first_class() {
    let part = Detector::postprocess(&[3.0, 3.0, -1.0]).unwrap();
    assert_eq!(part.index(), 0);
  }

  #[test]
  fn empty_output_is_an_error() {
    assert!(matches!(
      Detector::postprocess(&[]),
      Err(InferenceError::EmptyOutput)
    ));
  }
}
