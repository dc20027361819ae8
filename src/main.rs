// SPDX-License-Identifier: BSD-3-Clause
use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use tracing_flame::FlameLayer;
use tracing_subscriber::{fmt, prelude::*};

use yadda::{analysis, Policy, Program};

mod cli;

fn setup_global_subscriber() -> impl Drop {
    let filter_layer = tracing::level_filters::LevelFilter::TRACE;
    let fmt_layer = fmt::Layer::default();
    let (flame_layer, _guard) = FlameLayer::with_file("./tracing.folded").unwrap();
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(flame_layer)
        .init();
    _guard
}

fn main() -> Result<()> {
    let args = cli::Args::parse();

    if args.tracing {
        setup_global_subscriber();
    }

    let policy = if let Some(policy_path) = args.policy {
        let policy_string =
            std::fs::read_to_string(policy_path).context("Couldn't read taint policy")?;
        Policy::new(
            &serde_json::from_str(&policy_string).context("Couldn't deserialize taint policy")?,
        )
        .context("Couldn't construct taint policy")?
    } else {
        Policy::default()
    };

    let program_string = std::fs::read_to_string(&args.program).with_context(|| {
        format!(
            "Couldn't read IR program at {}",
            args.program.display()
        )
    })?;
    let program: Program =
        serde_json::from_str(&program_string).context("Couldn't deserialize IR program")?;
    program.validate()?;

    let opts = analysis::Options {
        metrics: args.metrics,
    };
    let outs = analysis::analysis(&program, &policy, &opts)?;

    if !args.quiet {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "alarms")?;
        writeln!(stdout, "------")?;
        for alarm in &outs.alarms {
            match program.instructions.get(*alarm as usize) {
                Some(instruction) => writeln!(stdout, "{}: {}", alarm, instruction.opcode)?,
                None => writeln!(stdout, "{}", alarm)?,
            }
        }
        writeln!(stdout)?;
        writeln!(stdout, "tainted paths")?;
        writeln!(stdout, "-------------")?;
        for (src, dst) in &outs.paths {
            writeln!(stdout, "{} --> {}", src, dst)?;
        }
        writeln!(stdout)?;
        writeln!(stdout, "reaching (in)")?;
        writeln!(stdout, "-------------")?;
        for (subject, instruction) in &outs.reaching_in {
            writeln!(stdout, "{} --> {}", subject, instruction)?;
        }
        writeln!(stdout)?;
        writeln!(stdout, "reaching (out)")?;
        writeln!(stdout, "--------------")?;
        for (subject, instruction) in &outs.reaching_out {
            writeln!(stdout, "{} --> {}", subject, instruction)?;
        }
    }

    if args.metrics {
        let mut stdout = io::stdout().lock();
        if let Some(m) = outs.metrics {
            writeln!(stdout)?;
            writeln!(stdout, "metrics")?;
            writeln!(stdout, "-------")?;
            writeln!(stdout, "kills: {}", m.kills)?;
            writeln!(stdout, "reaching (in): {}", m.reaching_in)?;
            writeln!(stdout, "reaching (out): {}", m.reaching_out)?;
            writeln!(stdout, "edges: {}", m.edges)?;
            writeln!(stdout, "paths: {}", m.paths)?;
            writeln!(stdout, "alarms: {}", m.alarms)?;
        }
    }

    if args.deny && !outs.alarms.is_empty() {
        return Err(anyhow!("Found potential divide-by-zero alarms!"));
    }

    Ok(())
}
