use std::fs;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use image::ImageFormat;
use walkdir::WalkDir;

use voc_seg_rs::{
    available_backends, blend_images, initialize_backends, run_benchmark, select_backend, Config,
};

fn main() -> Result<()> {
    let config = Config::parse();

    ensure!(config.model_dir.exists(), "Model directory does not exist");

    let mut backends =
        initialize_backends(available_backends(&config.model_dir, config.device_id));
    ensure!(!backends.is_empty(), "No backend initialized successfully");

    if config.benchmark {
        let gallery_dir = config
            .gallery_dir
            .as_ref()
            .context("--gallery-dir is required with --benchmark")?;
        ensure!(gallery_dir.exists(), "Gallery directory does not exist");

        let image_paths = WalkDir::new(gallery_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| ImageFormat::from_path(e.path()).is_ok())
            .map(|e| e.into_path())
            .collect::<Vec<_>>();
        ensure!(!image_paths.is_empty(), "Gallery directory contains no images");

        let mut gallery = Vec::with_capacity(image_paths.len());
        for path in &image_paths {
            gallery.push(
                image::open(path)
                    .with_context(|| format!("Failed to open image: {}", path.display()))?,
            );
        }

        let report = run_benchmark(&mut backends, &gallery)?;
        println!("{}", report.render());
        return Ok(());
    }

    let image_path = config
        .image
        .as_ref()
        .context("--image is required unless --benchmark is set")?;
    let image = image::open(image_path)
        .with_context(|| format!("Failed to open image: {}", image_path.display()))?;

    let backend = match &config.backend {
        Some(selector) => select_backend(&mut backends, selector)?,
        None => &mut backends[0],
    };

    let result = backend.process(&image)?;
    let blended = blend_images(&image.to_rgb8(), &result.mask)?;

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;
    let mask_path = config.output_dir.join("mask.png");
    result
        .mask
        .save(&mask_path)
        .with_context(|| format!("Failed to save image: {}", mask_path.display()))?;
    let blended_path = config.output_dir.join("blended.png");
    blended
        .save(&blended_path)
        .with_context(|| format!("Failed to save image: {}", blended_path.display()))?;

    println!("{}: inference took {} ms", backend.name(), result.latency_ms);
    println!("Saved {} and {}", mask_path.display(), blended_path.display());
    Ok(())
}
