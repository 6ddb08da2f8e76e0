// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Workbench
//!
//! The workbench is used for looking at the cascade from the outside: how many channels a
//! configuration yields, where they sit, what each one hears of a tone, and how a cochleogram
//! fills while a chirp sweeps past.
//!
//! ## Usage
//!
//! Set `RUST_LOG=debug` to watch the model being built.
//!
//! (Try --help)

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cochlea_lib::{
    dsp::{self, SineSweeper},
    prelude::*,
};

#[derive(Parser, Debug)]
#[command(name = "workbench")]
#[command(about = "Inspect Lyon's cochlear cascade and its cochleograms.", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, thiserror::Error)]
enum WorkbenchError {
    #[error("{0}")]
    Cochlea(#[from] CochleaError),
    #[error("Cannot print configuration: {0}")]
    Toml(#[from] toml::ser::Error),
}

fn main() -> Result<(), WorkbenchError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        None => unreachable!(),
        Some(Command::Config(a)) => cmd_config(a),
        Some(Command::Plan(a)) => cmd_plan(a),
        Some(Command::Response(a)) => cmd_response(a),
        Some(Command::Tone(a)) => cmd_tone(a),
        Some(Command::Cochleogram(a)) => cmd_cochleogram(a),
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the model configuration, from a file or the defaults
    Config(ModelArgs),
    /// List every channel with its centre frequency, bandwidth and pole quality
    Plan(ModelArgs),
    /// Cascade gain of every channel at one frequency
    Response(ResponseArgs),
    /// Channel energies for one interval of a pure tone
    Tone(ToneArgs),
    /// Sweep a chirp through the cochleogram and follow the loudest channel
    Cochleogram(CochleogramArgs),
}

#[derive(clap::Args, Debug)]
struct ModelArgs {
    /// TOML model configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 16_000)]
    sample_rate: u32,
}

impl ModelArgs {
    fn load(&self) -> Result<ModelConfig, CochleaError> {
        match &self.config {
            Some(path) => ModelConfig::load(path),
            None => Ok(ModelConfig::default()),
        }
    }
}

#[derive(clap::Args, Debug)]
struct ResponseArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Frequency in Hz
    #[arg(index = 1, required = true)]
    frequency: f64,
}

#[derive(clap::Args, Debug)]
struct ToneArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Tone frequency in Hz
    #[arg(index = 1, required = true)]
    frequency: f64,

    /// Interval length in milliseconds
    #[arg(long, default_value_t = 100.0)]
    interval_ms: f64,
}

#[derive(clap::Args, Debug)]
struct CochleogramArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Chirp start in Hz
    #[arg(long, default_value_t = 200.0)]
    from: f64,

    /// Chirp end in Hz
    #[arg(long, default_value_t = 6000.0)]
    to: f64,

    /// Number of steps
    #[arg(long, default_value_t = 24)]
    steps: usize,

    /// History length of the cochleogram
    #[arg(long, default_value_t = 8)]
    history: usize,

    /// Interval length in milliseconds
    #[arg(long, default_value_t = 100.0)]
    interval_ms: f64,
}

const INDENT: usize = 2;
const LABEL_W: usize = 32; // includes colon
const VALUE_W: usize = 22;

macro_rules! header {
    ($($arg:tt)*) => {{
        const WIDTH: usize = INDENT + LABEL_W + 1 + VALUE_W;
        let title = format!($($arg)*);
        println!("\n{title}");
        println!("{}", "=".repeat(WIDTH));
    }};
}

macro_rules! row {
    ($label:expr, $fmt:expr, $value:expr) => {{
        let value = format!($fmt, $value);
        println!(
            "{:indent$}{label:<label_w$} {:>value_w$}",
            "",
            value,
            indent = INDENT,
            label = format!("{}:", $label),
            label_w = LABEL_W,
            value_w = VALUE_W,
        );
    }};
}

/// Steps a tone from one frequency to another, one interval per step.
struct Chirp {
    sweeper: SineSweeper,
    sample_rate: u32,
    interval: usize,
    step_hz: f64,
}

impl AudioSource for Chirp {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn samples_per_interval(&self) -> usize {
        self.interval
    }

    fn next_interval(&mut self) -> Result<Vec<f32>, CochleaError> {
        let samples = self.sweeper.samples(self.interval);
        let next = self.sweeper.center() + self.step_hz;
        self.sweeper.set_frequency(next);
        Ok(samples)
    }
}

fn interval_samples(sample_rate: u32, interval_ms: f64) -> Result<usize, CochleaError> {
    let n = (sample_rate as f64 * interval_ms / 1000.0).round() as usize;
    if n == 0 {
        return Err(CochleaError::InvalidParameter(format!(
            "an interval of {interval_ms} ms holds no samples"
        )));
    }
    Ok(n)
}

fn loudest(column: &[f64]) -> usize {
    column
        .iter()
        .enumerate()
        .fold(0, |best, (k, e)| if *e > column[best] { k } else { best })
}

fn cmd_config(args: ModelArgs) -> Result<(), WorkbenchError> {
    let config = args.load()?;
    let plan = dsp::plan::ChannelPlan::new(config.ear_args(args.sample_rate))?;
    let ear = plan.args();

    header!("Cochlea Workbench Configuration");
    row!("Sample rate", "{} Hz", ear.sample_rate);
    row!("Quality factor", "{:3.2}", config.quality_factor);
    row!("Stage overlap factor", "{:3.2}", config.stage_overlap_factor);
    row!("Window", "{}", config.window.map_or("none", |w| w.name()));
    row!("Decibels", "{}", config.decibels);
    row!("Channels", "{}", plan.len());
    row!("Max frequency", "{:.2} Hz", ear.max_frequency());
    row!("Min frequency", "{:.2} Hz", ear.min_frequency());

    header!("TOML");
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_plan(args: ModelArgs) -> Result<(), WorkbenchError> {
    let config = args.load()?;
    let plan = dsp::plan::ChannelPlan::new(config.ear_args(args.sample_rate))?;

    header!("{} channels at {} Hz", plan.len(), args.sample_rate);
    for (k, c) in plan.channels().iter().enumerate() {
        row!(
            format!("{k:3} {:9.2} Hz", c.centre),
            "{}",
            format!("bw {:7.2} q {:5.2}", c.bandwidth, c.pole_q())
        );
    }
    Ok(())
}

fn cmd_response(args: ResponseArgs) -> Result<(), WorkbenchError> {
    let config = args.model.load()?;
    let plan = dsp::plan::ChannelPlan::new(config.ear_args(args.model.sample_rate))?;
    let cascade = dsp::cascade::CochlearCascade::build(&plan)?;

    header!("Cascade gain at {:.1} Hz", args.frequency);
    for (k, c) in plan.channels().iter().enumerate() {
        let gain = cascade
            .response_at(k, args.frequency)
            .map_or(0.0, |h| h.norm());
        let db = dsp::spectrogram::to_decibels(&[gain])[0];
        row!(format!("{k:3} {:9.2} Hz", c.centre), "{:8.2} dB", db);
    }
    Ok(())
}

fn cmd_tone(args: ToneArgs) -> Result<(), WorkbenchError> {
    let config = args.model.load()?;
    let sample_rate = args.model.sample_rate;
    let interval = interval_samples(sample_rate, args.interval_ms)?;
    let samples = dsp::sine_gen(args.frequency, sample_rate as f64)
        .take(interval)
        .collect();
    let mut source = TimeSeries::new(Clip::new(sample_rate, samples), interval)?;
    let mut model = LyonsModel::for_source(config, &source)?;

    let column = model.column(&mut source)?;
    let k = loudest(&column);
    header!("Energies for {:.1} Hz", args.frequency);
    for (c, e) in model.centre_frequencies().iter().zip(&column) {
        row!(format!("{c:9.2} Hz"), "{:12.6}", e);
    }
    row!(
        "Loudest channel",
        "{}",
        format!("{k} at {:.2} Hz", model.centre_frequencies()[k])
    );
    Ok(())
}

fn cmd_cochleogram(args: CochleogramArgs) -> Result<(), WorkbenchError> {
    let config = args.model.load()?;
    let sample_rate = args.model.sample_rate;
    let interval = interval_samples(sample_rate, args.interval_ms)?;
    let step_hz = if args.steps > 1 {
        (args.to - args.from) / (args.steps - 1) as f64
    } else {
        0.0
    };
    let mut source = Chirp {
        sweeper: SineSweeper::new(args.from, sample_rate as f64),
        sample_rate,
        interval,
        step_hz,
    };
    let mut model = LyonsModel::for_source(config, &source)?;
    let grid = Grid::new(model.num_channels(), args.history);

    header!("Chirp {:.0} Hz to {:.0} Hz", args.from, args.to);
    let mut state = CochleogramState::default();
    for step in 0..args.steps {
        let tone = source.sweeper.center();
        model.cochleogram_step(&mut state, grid, &mut source)?;
        let newest: Vec<f64> = (0..grid.rows)
            .map(|k| state.get(k, 0).unwrap_or(0.0))
            .collect();
        let k = loudest(&newest);
        row!(
            format!("{step:3} {tone:9.2} Hz"),
            "{}",
            format!("{:.2} Hz", model.centre_frequencies()[k])
        );
    }

    let sheet = state.to_sheet();
    header!("Cochleogram {} x {}", sheet.rows(), sheet.cols());
    for age in 0..sheet.cols() {
        let total: f64 = sheet.column(age).unwrap_or_default().iter().sum();
        row!(format!("age {age}"), "{:12.6}", total);
    }
    Ok(())
}
