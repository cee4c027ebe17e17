pub mod backend;
pub mod backends;
pub mod benchmark;
pub mod blend;
pub mod config;
pub mod errors;
pub mod labels;
pub mod postprocess;
pub mod preprocess;

pub mod mocks;

pub use backend::{
    available_backends, initialize_backends, select_backend, SegmentationBackend,
    SegmentationResult,
};
pub use backends::{DeepLabV3Cpu, DeepLabV3Gpu, UNetCpu};
pub use benchmark::{run_benchmark, BenchmarkEntry, BenchmarkReport};
pub use blend::{blend_images, mix_channels};
pub use config::Config;
pub use errors::{Result, VocSegError};
pub use labels::{LABEL_COLORS, NUM_CLASSES};
pub use preprocess::Normalization;
