// 该文件是 Masisso （맛있소） 项目的一部分。
// src/frame.rs - 归一化 NCHW 张量定义
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

const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
pub struct TensorLengthError {
  pub expected: usize,
  pub actual: usize,
}

/// 按通道平面排列（先全部 R，再全部 G，最后全部 B）的归一化浮点张量。
///
/// 长度恒为 `3 * W * H`。
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor<const W: u32, const H: u32> {
  data: Box<[f32]>,
}

impl<const W: u32, const H: u32> NormalizedTensor<W, H> {
  pub const LEN: usize = RGB_CHANNELS * (W as usize) * (H as usize);

  pub fn height(&self) -> usize {
    H as usize
  }

  pub fn width(&self) -> usize {
    W as usize
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }

  /// 某个通道的平面，通道越界时返回 `None`
  pub fn plane(&self, channel: usize) -> Option<&[f32]> {
    let size = self.width() * self.height();
    let start = channel.checked_mul(size)?;
    self.data.get(start..start.checked_add(size)?)
  }

  /// 按本机字节序展开为 4 字节浮点序列
  pub fn to_ne_bytes(&self) -> Vec<u8> {
    self.data.iter().flat_map(|v| v.to_ne_bytes()).collect()
  }
}

impl<const W: u32, const H: u32> Default for NormalizedTensor<W, H> {
  fn default() -> Self {
    let data = vec![0f32; Self::LEN].into_boxed_slice();
    Self { data }
  }
}

impl<const W: u32, const H: u32> TryFrom<Vec<f32>> for NormalizedTensor<W, H> {
  type Error = TensorLengthError;

  fn try_from(data: Vec<f32>) -> Result<Self, Self::Error> {
    if data.len() != Self::LEN {
      return Err(TensorLengthError {
        expected: Self::LEN,
        actual: data.len(),
      });
    }

    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }
}

impl<const W: u32, const H: u32> AsRef<[f32]> for NormalizedTensor<W, H> {
  fn as_ref(&self) -> &[f32] {
    &self.data
  }
}

impl<const W: u32, const H: u32> AsMut<[f32]> for NormalizedTensor<W, H> {
  fn as_mut(&mut self) -> &mut [f32] {
    &mut self.data
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_wrong_length() {
    let err = NormalizedTensor::<4, 4>::try_from(vec![0.0; 47]).unwrap_err();
    assert_eq!(
      err,
      TensorLengthError {
        expected: 48,
        actual: 47
      }
    );
  }

  #[test]
  fn planes_are_contiguous() {
    let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let tensor = NormalizedTensor::<2, 2>::try_from(data).unwrap();
    assert_eq!(tensor.plane(0), Some(&[0.0, 1.0, 2.0, 3.0][..]));
    assert_eq!(tensor.plane(2), Some(&[8.0, 9.0, 10.0, 11.0][..]));
    assert_eq!(tensor.to_ne_bytes().len(), 48);
  }

  #[test]
  fn plane_out_of_range_is_none() {
    let tensor = NormalizedTensor::<2, 2>::default();
    assert_eq!(tensor.plane(3), None);
    assert_eq!(tensor.plane(usize::MAX), None);
  }
}
