// 该文件是 Masisso （맛있소） 项目的一部分。
// src/config.rs - 预处理与流水线配置
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

/// 模型输入边长（正方形）
pub const INPUT_SIZE: u32 = 224;

/// 单张输入张量的元素个数：3 × 224 × 224
pub const INPUT_TENSOR_LEN: usize = 3 * (INPUT_SIZE as usize) * (INPUT_SIZE as usize);

/// 部位检测模型的类别数
pub const PART_CLASS_NUM: usize = 3;

/// 等级模型的类别数
pub const GRADE_CLASS_NUM: usize = 5;

/// 目标肌肉（背最长肌）在部位检测模型中的类别编号
pub const TARGET_PART_INDEX: usize = 2;

/// 部位检测模型的资源文件名（不含扩展名）
pub const PART_MODEL_ASSET: &str = "LD_model";

/// 等级模型的资源文件名（不含扩展名）
pub const GRADE_MODEL_ASSET: &str = "model";

/// 逐通道归一化参数：`(v / 255 - mean) / std`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
  pub mean: [f32; 3],
  pub std: [f32; 3],
}

impl Normalization {
  pub const fn new(mean: [f32; 3], std: [f32; 3]) -> Self {
    Self { mean, std }
  }

  /// 对单个 8 位通道值做缩放与归一化
  #[inline]
  pub fn apply(&self, channel: usize, value: u8) -> f32 {
    ((value as f32 / 255.0) - self.mean[channel]) / self.std[channel]
  }
}

/// 部位检测模型的归一化参数。
///
/// 目前与等级模型取值相同，但两者分别训练，保持为独立的配置项。
pub const PART_DETECTOR_NORMALIZATION: Normalization =
  Normalization::new([0.485, 0.456, 0.406], [0.229, 0.224, 0.225]);

/// 等级模型的归一化参数
pub const GRADE_MODEL_NORMALIZATION: Normalization =
  Normalization::new([0.485, 0.456, 0.406], [0.229, 0.224, 0.225]);

/// 流水线配置
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
  pub part_normalization: Normalization,
  pub grade_normalization: Normalization,
  pub target_part: usize,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      part_normalization: PART_DETECTOR_NORMALIZATION,
      grade_normalization: GRADE_MODEL_NORMALIZATION,
      target_part: TARGET_PART_INDEX,
    }
  }
}

impl PipelineConfig {
  pub fn part_normalization(mut self, normalization: Normalization) -> Self {
    self.part_normalization = normalization;
    self
  }

  pub fn grade_normalization(mut self, normalization: Normalization) -> Self {
    self.grade_normalization = normalization;
    self
  }

  pub fn target_part(mut self, target_part: usize) -> Self {
    self.target_part = target_part;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalization_maps_extremes() {
    let n = PART_DETECTOR_NORMALIZATION;
    assert!((n.apply(0, 0) - (-0.485 / 0.229)).abs() < 1e-6);
    assert!((n.apply(2, 255) - ((1.0 - 0.406) / 0.225)).abs() < 1e-6);
  }

  #[test]
  fn default_config_keeps_both_normalizations() {
    let config = PipelineConfig::default()
      .grade_normalization(Normalization::new([0.5; 3], [0.5; 3]));
    assert_eq!(config.part_normalization, PART_DETECTOR_NORMALIZATION);
    assert_ne!(config.grade_normalization, config.part_normalization);
    assert_eq!(config.target_part, TARGET_PART_INDEX);
  }
}
