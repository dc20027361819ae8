// SPDX-License-Identifier: BSD-3-Clause
use std::path::PathBuf;

/// Datalog-style dataflow analysis for IR programs
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Fail if any alarm is derived
    #[arg(long)]
    pub deny: bool,

    /// Collect and report relation size metrics
    #[arg(long)]
    pub metrics: bool,

    /// IR program (JSON)
    #[arg()]
    pub program: PathBuf,

    /// Taint source/sanitizer policy (JSON)
    #[arg(short, long)]
    pub policy: Option<PathBuf>,

    /// Quiet
    #[arg(long)]
    pub quiet: bool,

    /// Tracing
    #[arg(long)]
    pub tracing: bool,
}
