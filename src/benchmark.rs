use std::fmt::Write;

use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};

use crate::backend::SegmentationBackend;
use crate::errors::{Result, VocSegError};

/// Aggregated latency for one backend over the benchmark gallery.
#[derive(Debug, Clone)]
pub struct BenchmarkEntry {
    pub backend: String,
    /// Sum of timed latencies divided by the number of timed images; the
    /// warm-up pass never contributes. Zero when every sample was skipped.
    pub average_latency_ms: f64,
    pub images_timed: usize,
    pub images_skipped: usize,
}

#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub entries: Vec<BenchmarkEntry>,
}

impl BenchmarkReport {
    /// Human-readable table for the CLI.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<24} {:>12} {:>8} {:>8}",
            "backend", "avg ms", "timed", "skipped"
        );
        for entry in &self.entries {
            if entry.images_timed == 0 {
                let _ = writeln!(
                    out,
                    "{:<24} {:>12} {:>8} {:>8}",
                    entry.backend, "-", entry.images_timed, entry.images_skipped
                );
            } else {
                let _ = writeln!(
                    out,
                    "{:<24} {:>12.1} {:>8} {:>8}",
                    entry.backend,
                    entry.average_latency_ms,
                    entry.images_timed,
                    entry.images_skipped
                );
            }
        }
        out
    }
}

/// Drive every backend over the gallery and report average compute latency.
///
/// Per backend, sequentially: one discarded warm-up `process` on the first
/// sample primes caches and runtime state, then every sample is processed in
/// order. A failing sample is logged and skipped rather than aborting the
/// whole pass, so a partial report stays usable. One backend's timings never
/// include another's warm-up or compute.
pub fn run_benchmark(
    backends: &mut [Box<dyn SegmentationBackend>],
    gallery: &[DynamicImage],
) -> Result<BenchmarkReport> {
    if gallery.is_empty() {
        return Err(VocSegError::Validation {
            field: "benchmark gallery".to_string(),
            reason: "contains no images".to_string(),
        });
    }

    let mut entries = Vec::with_capacity(backends.len());
    for backend in backends.iter_mut() {
        let pb = ProgressBar::new(gallery.len() as u64 + 1);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} {msg} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap()
            .progress_chars("#>-"),
        );
        pb.set_message(backend.name().to_string());

        if let Err(e) = backend.process(&gallery[0]) {
            eprintln!("{}: warm-up failed: {}", backend.name(), e);
        }
        pb.inc(1);

        let mut total_latency_ms = 0u64;
        let mut images_timed = 0usize;
        let mut images_skipped = 0usize;
        for image in gallery {
            match backend.process(image) {
                Ok(result) => {
                    total_latency_ms += result.latency_ms;
                    images_timed += 1;
                }
                Err(e) => {
                    images_skipped += 1;
                    eprintln!("{}: skipping sample after failure: {}", backend.name(), e);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let average_latency_ms = if images_timed == 0 {
            0.0
        } else {
            total_latency_ms as f64 / images_timed as f64
        };
        entries.push(BenchmarkEntry {
            backend: backend.name().to_string(),
            average_latency_ms,
            images_timed,
            images_skipped,
        });
    }

    Ok(BenchmarkReport { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockBackend;
    use image::{DynamicImage, Rgb, RgbImage};

    fn gallery(count: usize) -> Vec<DynamicImage> {
        (0..count)
            .map(|i| {
                DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 12, Rgb([i as u8, 0, 0])))
            })
            .collect()
    }

    fn initialized_mock(latencies: Vec<u64>) -> Box<dyn SegmentationBackend> {
        let mut mock = MockBackend::new("mock", 1, latencies);
        mock.initialize().unwrap();
        Box::new(mock)
    }

    #[test]
    fn test_average_excludes_warm_up() {
        // Call 0 is the warm-up; only 10, 20, 30 are timed.
        let mut backends = vec![initialized_mock(vec![999, 10, 20, 30])];
        let report = run_benchmark(&mut backends, &gallery(3)).unwrap();
        let entry = &report.entries[0];
        assert_eq!(entry.images_timed, 3);
        assert_eq!(entry.images_skipped, 0);
        assert_eq!(entry.average_latency_ms, 20.0);
    }

    #[test]
    fn test_failed_sample_is_skipped_not_fatal() {
        let mut mock = MockBackend::new("mock", 1, vec![1, 2, 3, 4]).failing_on(vec![2]);
        mock.initialize().unwrap();
        let mut backends: Vec<Box<dyn SegmentationBackend>> = vec![Box::new(mock)];
        let report = run_benchmark(&mut backends, &gallery(3)).unwrap();
        let entry = &report.entries[0];
        assert_eq!(entry.images_timed, 2);
        assert_eq!(entry.images_skipped, 1);
        // Timed calls 1 and 3 carried latencies 2 and 4.
        assert_eq!(entry.average_latency_ms, 3.0);
    }

    #[test]
    fn test_empty_gallery_rejected() {
        let mut backends = vec![initialized_mock(vec![1])];
        assert!(run_benchmark(&mut backends, &[]).is_err());
    }

    #[test]
    fn test_backends_reported_in_order() {
        let mut backends = vec![initialized_mock(vec![1]), initialized_mock(vec![2])];
        let report = run_benchmark(&mut backends, &gallery(2)).unwrap();
        assert_eq!(report.entries.len(), 2);
        let rendered = report.render();
        assert!(rendered.contains("mock"));
        assert!(rendered.contains("avg ms"));
    }
}
