// 该文件是 Masisso （맛있소） 项目的一部分。
// src/model/grade_classifier.rs - 等级分类模型
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

use image::RgbImage;
use tracing::debug;

use crate::{
  config::{GRADE_CLASS_NUM, Normalization},
  interpreter::Interpreter,
  model::{InferenceError, Model, ModelHandle, WithLabel, argmax, softmax},
};

/// 按模型输出顺序排列的等级标签，从高到低
pub const GRADE_LABELS: [&str; GRADE_CLASS_NUM] =
  ["1++ grade", "1+ grade", "1 grade", "2 grade", "3 grade"];

/// 输出为空时的占位标签
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
  OnePlusPlus,
  OnePlus,
  One,
  Two,
  Three,
}

impl Grade {
  pub const ALL: [Grade; GRADE_CLASS_NUM] = [
    Grade::OnePlusPlus,
    Grade::OnePlus,
    Grade::One,
    Grade::Two,
    Grade::Three,
  ];

  pub fn label(&self) -> &'static str {
    GRADE_LABELS[*self as usize]
  }

  /// 面向用户的简短评语
  pub fn remark(&self) -> &'static str {
    match self {
      Grade::OnePlusPlus => "Top-tier beef!",
      Grade::OnePlus => "Premium beef.",
      Grade::One => "Good quality beef.",
      Grade::Two => "Average grade beef.",
      Grade::Three => "This grade is on the low side.",
    }
  }
}

impl WithLabel for Grade {
  fn to_label_str(&self) -> String {
    self.label().to_string()
  }

  fn to_label_id(&self) -> u32 {
    *self as u32
  }

  fn from_label_id(id: u32) -> Option<Self> {
    Grade::ALL.get(id as usize).copied()
  }
}

/// 等级分类结果。`grade` 为 `None` 表示模型没有给出任何分数。
#[derive(Debug, Clone, PartialEq)]
pub struct GradeResult {
  pub grade: Option<Grade>,
  pub confidence: f32,
  pub probabilities: Box<[f32]>,
}

impl GradeResult {
  pub fn label(&self) -> &'static str {
    self.grade.map(|g| g.label()).unwrap_or(UNKNOWN_LABEL)
  }

  pub fn is_unknown(&self) -> bool {
    self.grade.is_none()
  }
}

/// 五个等级的分类模型
pub struct GradeClassifier<I> {
  handle: ModelHandle<I>,
}

impl<I: Interpreter> GradeClassifier<I> {
  pub fn new(interpreter: I, normalization: Normalization) -> Self {
    Self {
      handle: ModelHandle::new("等级分类", interpreter, normalization, GRADE_CLASS_NUM),
    }
  }

  pub fn classify(&self, image: &RgbImage) -> Result<GradeResult, InferenceError> {
    let logits = self.handle.run_image(image)?;
    Ok(Self::postprocess(&logits))
  }
}

impl<I> GradeClassifier<I> {
  /// softmax 后取概率最大的等级；输出为空或概率无法比较（NaN）时返回 `Unknown`，置信度为 0
  pub fn postprocess(logits: &[f32]) -> GradeResult {
    let probabilities = softmax(logits);
    let result = match argmax(&probabilities) {
      Some(index) => GradeResult {
        grade: Grade::from_label_id(index as u32),
        confidence: probabilities[index],
        probabilities: probabilities.into_boxed_slice(),
      },
      None => GradeResult {
        grade: None,
        confidence: 0.0,
        probabilities: Box::default(),
      },
    };

    debug!("等级预测概率: {:?}", result.probabilities);
    debug!(
      "概率最高的等级: {} ({:.4})",
      result.label(),
      result.confidence
    );
    result
  }
}

impl<I: Interpreter> Model for GradeClassifier<I> {
  type Input = RgbImage;
  type Output = GradeResult;
  type Error = InferenceError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self.classify(input)
  }
}
