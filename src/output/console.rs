// 该文件是 Masisso （맛있소） 项目的一部分。
// src/output/console.rs - 控制台输出
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
use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::ImageFrame,
  output::Render,
  pipeline::Analysis,
};

#[derive(Error, Debug)]
pub enum ConsoleOutputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 把结论文本打印到标准输出：`console://`，加 `?probabilities` 同时打印各等级概率
#[derive(Debug, Default)]
pub struct ConsoleOutput {
  probabilities: bool,
}

impl FromUrlWithScheme for ConsoleOutput {
  const SCHEME: &'static str = "console";
}

impl FromUrl for ConsoleOutput {
  type Error = ConsoleOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(ConsoleOutputError::SchemeMismatch(format!(
        "期望输出方式 '{}', 实际输出方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let probabilities = uri.query_pairs().any(|(k, _)| k == "probabilities");
    Ok(ConsoleOutput { probabilities })
  }
}

impl ConsoleOutput {
  pub fn format(&self, frame: &ImageFrame, result: &Analysis) -> String {
    let mut text = format!("[{}]\n{}", frame.path.display(), result.message());
    if self.probabilities
      && let Some(grade) = result.grade()
    {
      for (label, p) in crate::model::GRADE_LABELS.iter().zip(grade.probabilities.iter()) {
        text.push_str(&format!("\n  {:<10} {:6.2}%", label, p * 100.0));
      }
    }
    text
  }
}

impl Render<ImageFrame, Analysis> for ConsoleOutput {
  type Error = ConsoleOutputError;

  fn render_result(&self, frame: &ImageFrame, result: &Analysis) -> Result<(), Self::Error> {
    debug!("输出结论: {}", frame.path.display());
    println!("{}", self.format(frame, result));
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{Grade, GradeResult, PartIndex};
  use image::RgbImage;

  fn frame() -> ImageFrame {
    ImageFrame {
      path: "gallery/cut.jpg".into(),
      image: RgbImage::new(1, 1),
    }
  }

  #[test]
  fn prints_probabilities_when_requested() {
    let output = ConsoleOutput::from_url(&Url::parse("console://?probabilities").unwrap()).unwrap();
    let analysis = Analysis::Graded {
      part: PartIndex(2),
      result: GradeResult {
        grade: Some(Grade::One),
        confidence: 0.6,
        probabilities: vec![0.1, 0.1, 0.6, 0.1, 0.1].into_boxed_slice(),
      },
    };
    let text = output.format(&frame(), &analysis);
    assert!(text.starts_with("[gallery/cut.jpg]"));
    assert!(text.contains("Estimated grade: 1 grade (60.00% confidence)"));
    assert!(text.contains("\n  1 grade     60.00%"));
    assert!(text.contains("\n  3 grade     10.00%"));
  }

  #[test]
  fn not_target_has_no_probabilities() {
    let output = ConsoleOutput {
      probabilities: true,
    };
    let text = output.format(&frame(), &Analysis::NotTarget { part: PartIndex(1) });
    assert!(!text.contains('%'));
  }
}
