// 该文件是 Masisso （맛있소） 项目的一部分。
// tests/task.rs - 任务编排测试
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

#![cfg(feature = "read_image_file")]

mod common;

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, Ordering},
};

use common::{MockInterpreter, sample_image};
use masisso::{
  config::PipelineConfig,
  input::{DirectoryInput, ImageFrame, ImageFileInput},
  output::Render,
  pipeline::{Analysis, Pipeline},
  task::{ContinuousTask, OneShotTask, Task, TaskSummary},
};

#[derive(thiserror::Error, Debug)]
#[error("never")]
struct Never;

/// 记录收到的每个结论
#[derive(Default, Clone)]
struct Collect {
  seen: Arc<Mutex<Vec<(String, bool)>>>,
}

impl Render<ImageFrame, Analysis> for Collect {
  type Error = Never;

  fn render_result(&self, frame: &ImageFrame, result: &Analysis) -> Result<(), Self::Error> {
    let name = frame
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    self.seen.lock().unwrap().push((name, result.is_target()));
    Ok(())
  }
}

fn gallery(count: usize) -> tempfile::TempDir {
  let dir = tempfile::tempdir().unwrap();
  for i in 0..count {
    sample_image()
      .save(dir.path().join(format!("cut-{}.png", i)))
      .unwrap();
  }
  dir
}

fn mock_pipeline(
  part_logits: &[f32],
) -> (
  Pipeline<MockInterpreter, MockInterpreter>,
  MockInterpreter,
  MockInterpreter,
) {
  let part = MockInterpreter::new(part_logits);
  let grade = MockInterpreter::new(&[0.0, 2.0, 0.0, 0.0, 0.0]);
  let pipeline = Pipeline::new(part.clone(), grade.clone(), &PipelineConfig::default());
  (pipeline, part, grade)
}

#[test]
fn one_shot_renders_single_image() {
  let dir = gallery(1);
  let input = ImageFileInput::open(dir.path().join("cut-0.png")).unwrap();
  let (pipeline, _, grade) = mock_pipeline(&[0.0, 0.0, 1.0]);
  let collect = Collect::default();

  OneShotTask
    .run_task(input, pipeline, collect.clone())
    .unwrap();

  assert_eq!(
    *collect.seen.lock().unwrap(),
    vec![("cut-0.png".to_string(), true)]
  );
  assert_eq!(grade.calls(), 1);
}

#[test]
fn continuous_task_processes_gallery_and_counts_failures() {
  let dir = gallery(3);
  let input = DirectoryInput::open(dir.path()).unwrap();
  let (pipeline, part, _) = mock_pipeline(&[0.0, 3.0, 1.0]);
  part.fail_next();
  let collect = Collect::default();

  let summary = ContinuousTask::default()
    .with_stop_flag(Arc::new(AtomicBool::new(false)))
    .run(input, &pipeline, &collect)
    .unwrap();

  assert_eq!(
    summary,
    TaskSummary {
      processed: 2,
      failed: 1
    }
  );
  let seen = collect.seen.lock().unwrap();
  assert_eq!(
    *seen,
    vec![
      ("cut-1.png".to_string(), false),
      ("cut-2.png".to_string(), false)
    ]
  );
}

#[test]
fn continuous_task_honours_limit_and_stop_flag() {
  let dir = gallery(4);
  let (pipeline, part, _) = mock_pipeline(&[0.0, 0.0, 1.0]);
  let collect = Collect::default();

  let summary = ContinuousTask::default()
    .with_max_images(Some(2))
    .with_stop_flag(Arc::new(AtomicBool::new(false)))
    .run(DirectoryInput::open(dir.path()).unwrap(), &pipeline, &collect)
    .unwrap();
  assert_eq!(summary.processed, 2);

  let stop = Arc::new(AtomicBool::new(false));
  stop.store(true, Ordering::SeqCst);
  let summary = ContinuousTask::default()
    .with_stop_flag(stop)
    .run(DirectoryInput::open(dir.path()).unwrap(), &pipeline, &collect)
    .unwrap();
  assert_eq!(summary, TaskSummary::default());
  assert_eq!(part.calls(), 2);
}
