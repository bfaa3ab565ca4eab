use std::{
    fs::File,
    io::{stdout, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum, ValueHint};
use strum::Display;

#[derive(Args, Debug, Clone)]
#[command(next_help_heading = "Output Options")]
pub struct OutputArgs {
    /// Write output to the specified path instead of stdout
    #[arg(long, short, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value_t = ReportOutputFormat::Pretty)]
    pub format: ReportOutputFormat,
}

impl OutputArgs {
    /// Buffered writer for `--output`, or stdout when unset.
    pub fn get_writer(&self) -> Result<Box<dyn Write>> {
        match &self.output {
            None => Ok(Box::new(BufWriter::new(stdout()))),
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, ValueEnum, Default)]
#[strum(serialize_all = "kebab-case")]
pub enum ReportOutputFormat {
    /// Human-readable text
    #[default]
    Pretty,

    /// Pretty-printed JSON
    Json,
}
