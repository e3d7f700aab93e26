use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use tools::config::{OutlierInputs, ReportOutputs};
use tools::outliers::{build_report, OutlierData};
use tools::report::finish;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Create the outlier QC figure from eddy outputs and append the subject's outlier metrics to the group table"
)]
struct Cli {
    /// Outlier map (one header line, volumes x slices)
    ol: PathBuf,
    /// Outlier n-stdev map (one header line, volumes x slices)
    ol_std: PathBuf,
    /// Eddy motion and eddy-current parameters
    params: PathBuf,
    /// b-value file
    bval: PathBuf,
    /// Binary brain mask
    mask: PathBuf,
    /// Subject ID
    subj: String,
    /// Figure output; always written as an A4 SVG page (not PDF), whatever the extension
    figure_output: PathBuf,
    /// Group QC table
    table_output: PathBuf,

    /// SNR/CNR summary after eddy; adds Average_SNR(b<100)
    #[arg(long)]
    cnr_eddy: Option<PathBuf>,

    /// Eddy residuals (4-D); adds Mean_Eddy_Residuals
    #[arg(long)]
    eddy_res: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let inputs = OutlierInputs {
        outlier_map: cli.ol,
        outlier_stdev_map: cli.ol_std,
        params: cli.params,
        bvals: cli.bval,
        mask: cli.mask,
        cnr_eddy: cli.cnr_eddy,
        eddy_residuals: cli.eddy_res,
    };
    let outputs = ReportOutputs { subject: cli.subj, figure: cli.figure_output, table: cli.table_output };

    let data = OutlierData::load(&inputs)?;
    let report = build_report(&data, &outputs.subject)?;
    finish(&report, &outputs)?;
    Ok(())
}
