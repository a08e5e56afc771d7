// 该文件是 Masisso （맛있소） 项目的一部分。
// src/preprocess.rs - 图像预处理
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

use image::{RgbImage, imageops::FilterType};
use tracing::debug;

use crate::{config::Normalization, frame::NormalizedTensor};

/// 缩放使用的插值滤波器（双线性，不使用最近邻）
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// 将任意尺寸的 RGB 图像转换为模型输入张量。
///
/// 1. 忽略宽高比，平滑缩放到 `W x H`；
/// 2. 按行优先扫描（y 在外层，x 在内层），每个通道先除以 255 再按 `normalization` 归一化；
/// 3. 以通道平面布局写入：R 在 `y * W + x`，G 再偏移一个平面，B 偏移两个平面。
pub fn preprocess<const W: u32, const H: u32>(
  image: &RgbImage,
  normalization: &Normalization,
) -> NormalizedTensor<W, H> {
  let (src_w, src_h) = image.dimensions();
  debug!("预处理图像: {}x{} -> {}x{}", src_w, src_h, W, H);

  let resized = if (src_w, src_h) == (W, H) {
    None
  } else {
    Some(image::imageops::resize(image, W, H, RESIZE_FILTER))
  };
  let resized = resized.as_ref().unwrap_or(image);

  let mut tensor = NormalizedTensor::<W, H>::default();
  let plane = (W as usize) * (H as usize);
  let slice = tensor.as_mut();

  for y in 0..H {
    for x in 0..W {
      let pixel = resized.get_pixel(x, y);
      let index = (y as usize) * (W as usize) + (x as usize);
      for c in 0..3 {
        slice[c * plane + index] = normalization.apply(c, pixel[c]);
      }
    }
  }

  tensor
}

impl<const W: u32, const H: u32> NormalizedTensor<W, H> {
  pub fn from_image(image: &RgbImage, normalization: &Normalization) -> Self {
    preprocess(image, normalization)
  }
}
