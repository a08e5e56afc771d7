// 该文件是 Masisso （맛있소） 项目的一部分。
// src/pipeline.rs - 部位检测与等级分类流水线
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

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
  FromUrl,
  config::{GRADE_MODEL_ASSET, PART_MODEL_ASSET, PipelineConfig},
  interpreter::{Backend, Interpreter, InterpreterError, InterpreterWrapper},
  model::{GradeClassifier, GradeResult, InferenceError, Model, PartDetector, PartIndex},
};

/// 模型加载失败，流水线不可用
#[derive(Error, Debug)]
pub enum LoadError {
  #[error("部位检测模型加载失败 ({0}): {1}")]
  PartModel(Url, #[source] InterpreterError),
  #[error("等级模型加载失败 ({0}): {1}")]
  GradeModel(Url, #[source] InterpreterError),
  #[error("模型路径错误: {0}")]
  ModelPath(#[from] InterpreterError),
}

/// 一次完整分析的结论
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
  /// 不是目标肌肉，未调用等级模型
  NotTarget { part: PartIndex },
  /// 是目标肌肉，并给出了等级
  Graded { part: PartIndex, result: GradeResult },
}

impl Analysis {
  pub fn part(&self) -> PartIndex {
    match self {
      Analysis::NotTarget { part } | Analysis::Graded { part, .. } => *part,
    }
  }

  pub fn grade(&self) -> Option<&GradeResult> {
    match self {
      Analysis::NotTarget { .. } => None,
      Analysis::Graded { result, .. } => Some(result),
    }
  }

  pub fn is_target(&self) -> bool {
    matches!(self, Analysis::Graded { .. })
  }

  /// 面向用户的结论文本
  pub fn message(&self) -> String {
    match self {
      Analysis::NotTarget { .. } => [
        "This is not the longissimus dorsi.",
        "The grade of this cut cannot be assessed.",
        "Please upload a photo of the longissimus dorsi!",
      ]
      .join("\n"),
      Analysis::Graded { result, .. } => {
        let mut message = format!(
          "This is the longissimus dorsi!\nEstimated grade: {} ({:.2}% confidence)",
          result.label(),
          result.confidence * 100.0
        );
        if let Some(grade) = result.grade {
          message.push('\n');
          message.push_str(grade.remark());
        }
        message
      }
    }
  }
}

/// 两个模型的组合：先判断部位，只有目标肌肉才进一步判定等级
pub struct Pipeline<P, G> {
  part_detector: PartDetector<P>,
  grade_classifier: GradeClassifier<G>,
  target_part: PartIndex,
}

impl<P: Interpreter, G: Interpreter> Pipeline<P, G> {
  pub fn new(part_interpreter: P, grade_interpreter: G, config: &PipelineConfig) -> Self {
    Self {
      part_detector: PartDetector::new(part_interpreter, config.part_normalization),
      grade_classifier: GradeClassifier::new(grade_interpreter, config.grade_normalization),
      target_part: PartIndex(config.target_part),
    }
  }

  pub fn target_part(&self) -> PartIndex {
    self.target_part
  }

  pub fn detect_part(&self, image: &RgbImage) -> Result<PartIndex, InferenceError> {
    self.part_detector.detect(image)
  }

  pub fn grade(&self, image: &RgbImage) -> Result<GradeResult, InferenceError> {
    self.grade_classifier.classify(image)
  }

  pub fn analyze(&self, image: &RgbImage) -> Result<Analysis, InferenceError> {
    let part = self.detect_part(image)?;
    info!("部位检测结果: {}", part);

    if part != self.target_part {
      info!("不是目标部位，跳过等级判定");
      return Ok(Analysis::NotTarget { part });
    }

    let result = self.grade(image)?;
    if result.is_unknown() {
      warn!("等级模型没有给出有效结果");
    } else {
      info!(
        "预测等级: {} ({:.2}%)",
        result.label(),
        result.confidence * 100.0
      );
    }
    Ok(Analysis::Graded { part, result })
  }
}

impl<P: Interpreter, G: Interpreter> Model for Pipeline<P, G> {
  type Input = RgbImage;
  type Output = Analysis;
  type Error = InferenceError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self.analyze(input)
  }
}

/// 由 URL 指定的后端加载两个模型
pub type LoadedPipeline = Pipeline<InterpreterWrapper, InterpreterWrapper>;

/// 模型来源：资源目录下的固定文件名，或者显式给出的 URL
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
  assets: PathBuf,
  backend: Backend,
  part_model: Option<Url>,
  grade_model: Option<Url>,
  config: PipelineConfig,
}

impl PipelineBuilder {
  pub fn new(assets: impl AsRef<Path>, backend: Backend) -> Self {
    Self {
      assets: assets.as_ref().to_path_buf(),
      backend,
      part_model: None,
      grade_model: None,
      config: PipelineConfig::default(),
    }
  }

  pub fn part_model(mut self, url: Option<Url>) -> Self {
    self.part_model = url;
    self
  }

  pub fn grade_model(mut self, url: Option<Url>) -> Self {
    self.grade_model = url;
    self
  }

  pub fn config(mut self, config: PipelineConfig) -> Self {
    self.config = config;
    self
  }

  pub fn part_model_url(&self) -> Result<Url, InterpreterError> {
    match &self.part_model {
      Some(url) => Ok(url.clone()),
      None => self.backend.asset_url(&self.assets, PART_MODEL_ASSET),
    }
  }

  pub fn grade_model_url(&self) -> Result<Url, InterpreterError> {
    match &self.grade_model {
      Some(url) => Ok(url.clone()),
      None => self.backend.asset_url(&self.assets, GRADE_MODEL_ASSET),
    }
  }

  pub fn build(self) -> Result<LoadedPipeline, LoadError> {
    let part_url = self.part_model_url()?;
    let grade_url = self.grade_model_url()?;

    info!("加载部位检测模型: {}", part_url);
    let part = InterpreterWrapper::from_url(&part_url)
      .map_err(|e| LoadError::PartModel(part_url.clone(), e))?;

    info!("加载等级模型: {}", grade_url);
    let grade = InterpreterWrapper::from_url(&grade_url)
      .map_err(|e| LoadError::GradeModel(grade_url.clone(), e))?;

    Ok(Pipeline::new(part, grade, &self.config))
  }
}
