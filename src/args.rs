use clap::Parser;
use std::path::PathBuf;

use crate::types::Backend;

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Model file to evaluate (default converted_model.tflite)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Inference backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Half-width of the generated block in pixels (default 2)
    #[arg(long)]
    pub radius: Option<i32>,

    /// JSON config file (eval_config.json is picked up if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print mean/max distance after the result lines
    #[arg(long, default_value_t = false)]
    pub summary: bool,

    /// Debug logging on stderr
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
