// 该文件是 Masisso （맛있소） 项目的一部分。
// tests/common/mod.rs - 测试用的模拟解释器
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

#![allow(dead_code)]

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use image::{Rgb, RgbImage};
use masisso::interpreter::Interpreter;

#[derive(thiserror::Error, Debug)]
#[error("模拟解释器故障")]
pub struct MockFailure;

/// 返回固定 logits 并记录调用情况的解释器
#[derive(Clone)]
pub struct MockInterpreter {
  logits: Vec<f32>,
  calls: Arc<AtomicUsize>,
  fail_next: Arc<AtomicBool>,
  last_input: Arc<Mutex<Vec<f32>>>,
}

impl MockInterpreter {
  pub fn new(logits: &[f32]) -> Self {
    Self {
      logits: logits.to_vec(),
      calls: Arc::new(AtomicUsize::new(0)),
      fail_next: Arc::new(AtomicBool::new(false)),
      last_input: Arc::new(Mutex::new(Vec::new())),
    }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn fail_next(&self) {
    self.fail_next.store(true, Ordering::SeqCst);
  }

  pub fn last_input(&self) -> Vec<f32> {
    self.last_input.lock().unwrap().clone()
  }
}

impl Interpreter for MockInterpreter {
  type Error = MockFailure;

  fn run(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), Self::Error> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    *self.last_input.lock().unwrap() = input.to_vec();
    if self.fail_next.swap(false, Ordering::SeqCst) {
      return Err(MockFailure);
    }
    output.copy_from_slice(&self.logits);
    Ok(())
  }
}

pub fn sample_image() -> RgbImage {
  RgbImage::from_fn(320, 240, |x, y| {
    Rgb([(150 + x % 100) as u8, (20 + y % 60) as u8, 40])
  })
}
