// 该文件是 Masisso （맛있소） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use masisso::{
  FromUrl,
  input::InputWrapper,
  output::OutputWrapper,
  pipeline::PipelineBuilder,
  task::{ContinuousTask, OneShotTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("输入来源: {}", args.input);
  info!("模型资源目录: {}", args.assets.display());
  info!("推理后端: {:?}", args.backend);

  // 模型加载失败时直接退出，不进入分析流程
  let pipeline = PipelineBuilder::new(&args.assets, args.backend)
    .part_model(args.part_model)
    .grade_model(args.grade_model)
    .build()?;

  let outputs = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;
  let input = InputWrapper::from_url(&args.input)?;

  #[cfg(feature = "read_image_file")]
  let one_shot = matches!(input, InputWrapper::ReadImageFile(_));
  #[cfg(not(feature = "read_image_file"))]
  let one_shot = false;

  if one_shot {
    OneShotTask.run_task(input, pipeline, outputs)?;
  } else {
    let max_images = (args.max_images > 0).then_some(args.max_images);
    ContinuousTask::default()
      .with_max_images(max_images)
      .run_task(input, pipeline, outputs)?;
  }

  Ok(())
}
