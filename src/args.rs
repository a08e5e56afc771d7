// 该文件是 Masisso （맛있소） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;
use url::Url;

use masisso::interpreter::Backend;

/// Masisso 牛肉部位检测与等级判定
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源
  /// 支持格式:
  /// - 单张图片: image:///path/to/photo.jpg
  /// - 图片目录: folder:///path/to/gallery
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出方式，可重复指定
  /// 支持格式:
  /// - 控制台: console://（加 ?probabilities 打印各等级概率）
  /// - 目录记录: folder:///path/to/records（加 ?always 记录全部结果）
  #[arg(long, value_name = "OUTPUT", default_value = "console://")]
  pub output: Vec<Url>,

  /// 模型资源目录，按固定文件名查找 LD_model 与 model
  #[arg(long, value_name = "DIR", default_value = "assets")]
  pub assets: PathBuf,

  /// 推理后端 (tract | rknn)
  #[arg(long, value_name = "BACKEND", default_value = "tract")]
  pub backend: Backend,

  /// 部位检测模型 URL，例如 tract:///opt/assets/LD_model.onnx
  #[arg(long, value_name = "MODEL")]
  pub part_model: Option<Url>,

  /// 等级模型 URL，例如 rknn:///opt/assets/model.rknn
  #[arg(long, value_name = "MODEL")]
  pub grade_model: Option<Url>,

  /// 最多处理的图像数（仅对目录输入有效，0 表示无限制）
  #[arg(long, default_value = "0", value_name = "COUNT")]
  pub max_images: usize,
}
