// 该文件是 Masisso （맛있소） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use std::path::PathBuf;
use std::sync::atomic::{AtomicU16, Ordering};

use chrono::{DateTime, Datelike, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::ImageFrame,
  output::Render,
  pipeline::Analysis,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 把分析过的图像与结论记录到按日期分层的目录：
/// `folder:///records` -> `/records/2026/03/14/10-21-07-0001.{png,json}`。
///
/// 默认只记录判定了等级的图像，加 `?always` 则全部记录。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  frame_counter: AtomicU16,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let always = uri.query_pairs().any(|(k, _)| k == "always");
    let directory = urlencoding::decode(uri.path())
      .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(directory.as_ref()),
      frame_counter: AtomicU16::new(0),
      always,
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    self.frame_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
  }

  fn frame_path(&self, now: DateTime<Utc>) -> Result<PathBuf, DirectoryRecordOutputError> {
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }

  fn record(frame: &ImageFrame, result: &Analysis, now: DateTime<Utc>) -> serde_json::Value {
    let mut record = json!({
      "source": frame.path.display().to_string(),
      "timestamp": now.to_rfc3339(),
      "part": result.part().index(),
      "target": result.is_target(),
    });
    if let Some(grade) = result.grade() {
      record["grade"] = json!(grade.label());
      record["confidence"] = json!(grade.confidence);
      record["probabilities"] = json!(grade.probabilities.to_vec());
    }
    record
  }
}

impl Render<ImageFrame, Analysis> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &ImageFrame, result: &Analysis) -> Result<(), Self::Error> {
    if !self.always && !result.is_target() {
      return Ok(());
    }

    let now = Utc::now();
    let path = self.frame_path(now)?;
    frame.image.save(&path)?;
    let record = Self::record(frame, result, now);
    std::fs::write(
      path.with_extension("json"),
      serde_json::to_string_pretty(&record)?,
    )?;

    info!("记录结果到: {}", path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{Grade, GradeResult, PartIndex};
  use image::RgbImage;

  fn files_with_extension(root: &std::path::Path, ext: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
      for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
          stack.push(path);
        } else if path.extension().is_some_and(|e| e == ext) {
          found.push(path);
        }
      }
    }
    found
  }

  fn frame() -> ImageFrame {
    ImageFrame {
      path: "cut.jpg".into(),
      image: RgbImage::new(3, 2),
    }
  }

  #[test]
  fn records_graded_result_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let url = url::Url::parse(&format!("folder://{}", dir.path().display())).unwrap();
    let output = DirectoryRecordOutput::from_url(&url).unwrap();

    let analysis = Analysis::Graded {
      part: PartIndex(2),
      result: GradeResult {
        grade: Some(Grade::Two),
        confidence: 0.75,
        probabilities: vec![0.05, 0.05, 0.1, 0.75, 0.05].into_boxed_slice(),
      },
    };
    output.render_result(&frame(), &analysis).unwrap();

    let records = files_with_extension(dir.path(), "json");
    assert_eq!(records.len(), 1);
    assert_eq!(files_with_extension(dir.path(), "png").len(), 1);

    let value: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(&records[0]).unwrap()).unwrap();
    assert_eq!(value["grade"], "2 grade");
    assert_eq!(value["part"], 2);
    assert_eq!(value["target"], true);
    assert_eq!(value["source"], "cut.jpg");
  }

  #[test]
  fn skips_non_target_unless_always() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = Analysis::NotTarget { part: PartIndex(0) };

    let url = url::Url::parse(&format!("folder://{}", dir.path().display())).unwrap();
    DirectoryRecordOutput::from_url(&url)
      .unwrap()
      .render_result(&frame(), &analysis)
      .unwrap();
    assert!(files_with_extension(dir.path(), "json").is_empty());

    let url = url::Url::parse(&format!("folder://{}?always", dir.path().display())).unwrap();
    DirectoryRecordOutput::from_url(&url)
      .unwrap()
      .render_result(&frame(), &analysis)
      .unwrap();
    let records = files_with_extension(dir.path(), "json");
    assert_eq!(records.len(), 1);
    let value: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(&records[0]).unwrap()).unwrap();
    assert_eq!(value["target"], false);
    assert!(value.get("grade").is_none());
  }
}
