use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use tools::config::{MotionInputs, ReportOutputs};
use tools::motion::{build_report, MotionData};
use tools::report::finish;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Create the motion QC figure from eddy outputs and append the subject's motion metrics to the group table"
)]
struct Cli {
    /// Movement over time (slice-to-volume), one row per slice group
    s2v: PathBuf,
    /// Volume-to-volume RMS displacement (absolute, relative)
    rms: PathBuf,
    /// Restricted RMS displacement (absolute, relative)
    res_rms: PathBuf,
    /// Eddy motion and eddy-current parameters
    params: PathBuf,
    /// Number of slices (or multiband groups) per volume
    nslices: usize,
    /// b-value file
    bval: PathBuf,
    /// Subject ID
    subj: String,
    /// Figure output; always written as an A4 SVG page (not PDF), whatever the extension
    figure_output: PathBuf,
    /// Group QC table
    table_output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let inputs = MotionInputs {
        s2v: cli.s2v,
        rms: cli.rms,
        restricted_rms: cli.res_rms,
        params: cli.params,
        nslices: cli.nslices,
        bvals: cli.bval,
    };
    let outputs = ReportOutputs { subject: cli.subj, figure: cli.figure_output, table: cli.table_output };

    let data = MotionData::load(&inputs)?;
    let report = build_report(&data, inputs.nslices, &outputs.subject)?;
    finish(&report, &outputs)?;
    Ok(())
}
