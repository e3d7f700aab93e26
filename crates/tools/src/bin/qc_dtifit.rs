use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use tools::config::{DtifitInputs, ReportOutputs};
use tools::dtifit::{build_report, DtifitData};
use tools::report::finish;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Create the tensor-fit QC figure and append the subject's SNR, FA and MD metrics to the group table"
)]
struct Cli {
    /// QC directory (dtifit/, tsnr_orig.txt, cnrwm.txt)
    qcdir: PathBuf,
    /// Subject ID
    subj: String,
    /// Figure output; always written as an A4 SVG page (not PDF), whatever the extension
    figure_output: PathBuf,
    /// Group QC table
    table_output: PathBuf,
    /// White matter binary mask
    wm_mask: PathBuf,
    /// b-value file
    bvals: PathBuf,
    /// Diffusion-weighted data (4-D)
    data: PathBuf,

    /// Grey matter binary mask; adds Mean_FA_GM and Mean_MD_GM
    #[arg(long)]
    gm_mask: Option<PathBuf>,

    /// CSF binary mask; adds Mean_FA_CSF and Mean_MD_CSF
    #[arg(long)]
    csf_mask: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let inputs = DtifitInputs {
        qc_dir: cli.qcdir,
        wm_mask: cli.wm_mask,
        bvals: cli.bvals,
        data: cli.data,
        gm_mask: cli.gm_mask,
        csf_mask: cli.csf_mask,
    };
    let outputs = ReportOutputs { subject: cli.subj, figure: cli.figure_output, table: cli.table_output };

    log::info!("Plotting DTIFIT results for {}", outputs.subject);
    let data = DtifitData::load(&inputs)?;
    let report = build_report(&data, &outputs.subject)?;
    finish(&report, &outputs)?;
    Ok(())
}
