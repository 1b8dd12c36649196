// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod config;
pub use config::{Cli, DemoConfig, TaskKind};

pub mod tasks;
pub use tasks::{ConstTask, FailingTask, SleepTask, SumRunesTask, SumTask};

pub mod runner;
pub use runner::{run, RunSummary};
