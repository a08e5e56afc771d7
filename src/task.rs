// 该文件是 Masisso （맛있소） 项目的一部分。
// src/task.rs - 推理任务
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

use std::{
  borrow::Borrow,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use tracing::{error, info, warn};

use crate::{model::Model, output::Render};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error>;
}

/// 任务统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
  pub processed: usize,
  pub failed: usize,
}

pub struct OneShotTask;

impl<
  F: Borrow<M::Input>,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入图像"))?;
    info!("输入图像获取成功，开始推理...");
    let now = std::time::Instant::now();
    let result = model.infer(frame.borrow())?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());
    output.render_result(&frame, &result)?;

    Ok(())
  }
}

/// 逐张处理所有输入，单张失败只记录错误，Ctrl-C 后在两张图像之间退出
#[derive(Default, Debug)]
pub struct ContinuousTask {
  max_images: Option<usize>,
  stop: Option<Arc<AtomicBool>>,
}

impl ContinuousTask {
  pub fn with_max_images(mut self, max_images: Option<usize>) -> Self {
    self.max_images = max_images;
    self
  }

  /// 使用外部给定的停止标志，而不是注册 Ctrl-C 处理函数
  pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
    self.stop = Some(stop);
    self
  }

  pub fn run<F, I, M, O>(self, input: I, model: &M, output: &O) -> anyhow::Result<TaskSummary>
  where
    F: Borrow<M::Input>,
    I: Iterator<Item = F>,
    M: Model,
    M::Error: std::error::Error + Sync + Send + 'static,
    O: Render<F, M::Output>,
    O::Error: std::error::Error + Sync + Send + 'static,
  {
    info!("开始任务...");
    let stop = match self.stop {
      Some(stop) => stop,
      None => {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        ctrlc::set_handler(move || {
          info!("收到中断信号，准备退出...");
          flag.store(true, Ordering::SeqCst);
        })?;
        stop
      }
    };

    let mut summary = TaskSummary::default();
    for (index, frame) in input.enumerate() {
      if self.max_images.is_some_and(|n| index >= n) {
        info!("达到指定图像数 {}, 退出任务循环", index);
        break;
      }
      if stop.load(Ordering::SeqCst) {
        warn!("中断信号接收，退出任务循环");
        break;
      }

      info!("处理第 {} 张图像", index + 1);
      let now = std::time::Instant::now();
      match model.infer(frame.borrow()) {
        Ok(result) => {
          info!("推理完成，耗时: {:.2?}", now.elapsed());
          output.render_result(&frame, &result)?;
          summary.processed += 1;
        }
        Err(e) => {
          error!("第 {} 张图像分析失败: {}", index + 1, e);
          summary.failed += 1;
        }
      }
    }

    info!(
      "任务完成，成功 {} 张，失败 {} 张",
      summary.processed, summary.failed
    );
    Ok(summary)
  }
}

impl<
  F: Borrow<M::Input>,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for ContinuousTask
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error> {
    self.run(input, &model, &output).map(|_| ())
  }
}
