// 该文件是 Masisso （맛있소） 项目的一部分。
// src/interpreter.rs - 推理后端
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

use thiserror::Error;
use url::Url;

#[allow(unused_imports)]
use crate::{FromUrl, FromUrlWithScheme};

/// 推理后端：把固定形状的输入张量映射为固定长度的输出向量。
///
/// 调用方负责按模型约定分配好 `output`。同一实例同一时刻只允许一次推理。
pub trait Interpreter {
  type Error: std::error::Error + Send + Sync + 'static;

  fn run(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), Self::Error>;
}

impl<T: Interpreter + ?Sized> Interpreter for Box<T> {
  type Error = T::Error;

  fn run(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), Self::Error> {
    (**self).run(input, output)
  }
}

#[cfg(feature = "model_tract")]
mod tract;
#[cfg(feature = "model_tract")]
pub use self::tract::{TractError, TractInterpreter};

#[cfg(feature = "model_rknn")]
mod rknn;
#[cfg(feature = "model_rknn")]
pub use self::rknn::{RknnError, RknnInterpreter};

#[derive(Error, Debug)]
pub enum InterpreterError {
  #[cfg(feature = "model_tract")]
  #[error("tract 后端错误: {0}")]
  TractError(#[from] TractError),
  #[cfg(feature = "model_rknn")]
  #[error("RKNN 后端错误: {0}")]
  RknnError(#[from] RknnError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("无法解析模型路径: {0}")]
  InvalidPath(String),
}

/// 按 URL 方案选择的推理后端
pub enum InterpreterWrapper {
  #[cfg(feature = "model_tract")]
  Tract(TractInterpreter),
  #[cfg(feature = "model_rknn")]
  Rknn(RknnInterpreter),
}

impl FromUrl for InterpreterWrapper {
  type Error = InterpreterError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "model_tract")]
      TractInterpreter::SCHEME => {
        Ok(InterpreterWrapper::Tract(TractInterpreter::from_url(url)?))
      }
      #[cfg(feature = "model_rknn")]
      RknnInterpreter::SCHEME => {
        Ok(InterpreterWrapper::Rknn(RknnInterpreter::from_url(url)?))
      }
      other => Err(InterpreterError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Interpreter for InterpreterWrapper {
  type Error = InterpreterError;

  #[allow(unused_variables)]
  fn run(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), Self::Error> {
    // 未启用任何后端时枚举为空，按值匹配才能通过穷尽性检查
    match *self {
      #[cfg(feature = "model_tract")]
      InterpreterWrapper::Tract(ref mut inner) => {
        inner.run(input, output).map_err(InterpreterError::from)
      }
      #[cfg(feature = "model_rknn")]
      InterpreterWrapper::Rknn(ref mut inner) => {
        inner.run(input, output).map_err(InterpreterError::from)
      }
    }
  }
}

/// 推理后端种类，决定模型文件扩展名与 URL 方案
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
  Tract,
  Rknn,
}

impl Backend {
  pub fn scheme(&self) -> &'static str {
    match self {
      Backend::Tract => "tract",
      Backend::Rknn => "rknn",
    }
  }

  pub fn extension(&self) -> &'static str {
    match self {
      Backend::Tract => "onnx",
      Backend::Rknn => "rknn",
    }
  }

  /// 由资源目录与固定资源名拼出模型 URL，例如 `tract:///opt/assets/LD_model.onnx`
  pub fn asset_url(&self, assets: &Path, name: &str) -> Result<Url, InterpreterError> {
    let path: PathBuf = std::path::absolute(assets.join(name).with_extension(self.extension()))
      .map_err(|e| InterpreterError::InvalidPath(format!("{}: {}", assets.display(), e)))?;
    let mut url = Url::from_file_path(&path)
      .map_err(|_| InterpreterError::InvalidPath(path.display().to_string()))?
      .to_string();
    // file:///... -> <scheme>:///...
    url.replace_range(..4, self.scheme());
    Url::parse(&url).map_err(|e| InterpreterError::InvalidPath(format!("{}: {}", url, e)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn asset_url_uses_backend_scheme_and_extension() {
    let url = Backend::Rknn
      .asset_url(Path::new("/opt/assets"), "LD_model")
      .unwrap();
    assert_eq!(url.scheme(), "rknn");
    assert_eq!(url.path(), "/opt/assets/LD_model.rknn");

    let url = Backend::Tract.asset_url(Path::new("/opt/assets"), "model").unwrap();
    assert_eq!(url.as_str(), "tract:///opt/assets/model.onnx");
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = Url::parse("tflite:///opt/assets/model.tflite").unwrap();
    assert!(matches!(
      InterpreterWrapper::from_url(&url),
      Err(InterpreterError::SchemeMismatch(s)) if s == "tflite"
    ));
  }

  #[cfg(not(any(feature = "model_tract", feature = "model_rknn")))]
  #[test]
  fn no_backend_rejects_every_scheme() {
    let url = Url::parse("tract:///opt/assets/model.onnx").unwrap();
    assert!(matches!(
      InterpreterWrapper::from_url(&url),
      Err(InterpreterError::SchemeMismatch(s)) if s == "tract"
    ));
  }

  #[test]
  fn backend_parses_from_cli_value() {
    use clap::ValueEnum;
    assert_eq!(Backend::from_str("rknn", false).unwrap(), Backend::Rknn);
    assert!(Backend::from_str("tflite", false).is_err());
  }
}
