use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory holding the backend weight files.
    #[arg(short, long)]
    pub model_dir: PathBuf,

    /// Photo to segment (single-shot mode).
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Backend display name or zero-based index; defaults to the first
    /// usable backend.
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Where mask.png and blended.png are written.
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Benchmark every backend over a gallery instead of segmenting one
    /// photo.
    #[arg(long, default_value_t = false)]
    pub benchmark: bool,

    /// Directory of sample images used as the benchmark gallery.
    #[arg(short, long)]
    pub gallery_dir: Option<PathBuf>,

    /// CUDA device for the GPU backend.
    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,
}
