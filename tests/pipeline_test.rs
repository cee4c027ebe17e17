use std::fs;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use tempfile::TempDir;

use voc_seg_rs::mocks::{FailingBackend, MockBackend};
use voc_seg_rs::{
    available_backends, blend_images, initialize_backends, run_benchmark, select_backend,
    DeepLabV3Cpu, SegmentationBackend, LABEL_COLORS,
};

fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

#[test]
fn test_mask_dimensions_match_input() {
    let mut mock = MockBackend::new("mock", 7, vec![5]);
    mock.initialize().unwrap();

    for (w, h) in [(1, 1), (64, 48), (640, 480), (123, 457)] {
        let result = mock.process(&test_image(w, h)).unwrap();
        assert_eq!(result.mask.dimensions(), (w, h));
    }
}

#[test]
fn test_repeated_processing_is_deterministic() {
    let mut mock = MockBackend::new("mock", 12, vec![1]);
    mock.initialize().unwrap();
    let image = test_image(50, 40);

    let first = mock.process(&image).unwrap();
    let second = mock.process(&image).unwrap();
    assert_eq!(first.mask.as_raw(), second.mask.as_raw());
}

#[test]
fn test_degenerate_image_rejected_without_partial_mask() {
    let mut mock = MockBackend::new("mock", 0, vec![1]);
    mock.initialize().unwrap();
    assert!(mock.process(&DynamicImage::new_rgb8(0, 100)).is_err());
    assert!(mock.process(&DynamicImage::new_rgb8(100, 0)).is_err());
}

#[test]
fn test_process_requires_initialize_on_real_backend() {
    let mut backend = DeepLabV3Cpu::new("does-not-exist.onnx".into());
    let err = backend.process(&test_image(10, 10)).unwrap_err();
    assert!(err.to_string().contains("before initialize"));
}

#[test]
fn test_registry_lists_all_variants_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let backends = available_backends(temp_dir.path(), 0);
    let names: Vec<_> = backends.iter().map(|b| b.name().to_string()).collect();
    assert_eq!(
        names,
        ["DeepLab v3 257 GPU", "DeepLab v3 513 CPU", "UNet 256 CPU"]
    );
    assert_eq!(backends[0].input_shape(), [1, 257, 257, 3]);
    assert_eq!(backends[0].output_shape(), [1, 257, 257, 21]);
    assert_eq!(backends[1].input_shape(), [1, 513, 513, 3]);
    assert_eq!(backends[1].output_shape(), [1, 513, 513]);
    assert_eq!(backends[2].input_shape(), [256, 256, 3]);
    assert_eq!(backends[2].output_shape(), [256, 256, 21]);
}

#[test]
fn test_initialization_failure_disables_only_that_backend() {
    // backend-b fails to load; a and c must keep producing correct results.
    let backends: Vec<Box<dyn SegmentationBackend>> = vec![
        Box::new(MockBackend::new("backend-a", 1, vec![2])),
        Box::new(FailingBackend::new("backend-b")),
        Box::new(MockBackend::new("backend-c", 2, vec![4])),
    ];
    let mut usable = initialize_backends(backends);
    assert_eq!(usable.len(), 2);
    assert!(usable.iter().all(|b| b.name() != "backend-b"));

    let image = test_image(20, 20);
    for backend in &mut usable {
        let result = backend.process(&image).unwrap();
        assert_eq!(result.mask.dimensions(), (20, 20));
    }
}

#[test]
fn test_corrupt_weights_fail_initialization_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    let weights = temp_dir.path().join("deeplabv3_513_cpu.onnx");
    fs::write(&weights, b"not an onnx model").unwrap();

    let mut backend = DeepLabV3Cpu::new(weights);
    assert!(backend.initialize().is_err());

    // The registry path drops every variant when no valid weights exist.
    let usable = initialize_backends(available_backends(temp_dir.path(), 0));
    assert!(usable.is_empty());
}

#[test]
fn test_backend_selection_by_name_and_index() {
    let mut backends: Vec<Box<dyn SegmentationBackend>> = vec![
        Box::new(MockBackend::new("first", 1, vec![1])),
        Box::new(MockBackend::new("second", 2, vec![1])),
    ];

    assert_eq!(select_backend(&mut backends, "second").unwrap().name(), "second");
    assert_eq!(select_backend(&mut backends, "1").unwrap().name(), "second");
    assert_eq!(select_backend(&mut backends, "0").unwrap().name(), "first");
    assert!(select_backend(&mut backends, "third").is_err());
    assert!(select_backend(&mut backends, "2").is_err());
}

#[test]
fn test_mask_blends_over_original() {
    let mut mock = MockBackend::new("mock", 1, vec![0]);
    mock.initialize().unwrap();
    let image = test_image(30, 30);
    let result = mock.process(&image).unwrap();

    let blended = blend_images(&image.to_rgb8(), &result.mask).unwrap();
    assert_eq!(blended.dimensions(), image.dimensions());
    // Class 1 is aeroplane (128, 0, 0): pixel (0, 0) of the photo is (0, 0, 128).
    assert_eq!(*blended.get_pixel(0, 0), Rgb([64, 0, 64]));
    assert_eq!(LABEL_COLORS[1].1, Rgb([128, 0, 0]));
}

#[test]
fn test_benchmark_over_mixed_backends() {
    let mut fast = MockBackend::new("fast", 1, vec![2]);
    fast.initialize().unwrap();
    let mut slow = MockBackend::new("slow", 2, vec![8]);
    slow.initialize().unwrap();
    let mut backends: Vec<Box<dyn SegmentationBackend>> = vec![Box::new(fast), Box::new(slow)];

    let gallery: Vec<_> = (0..4).map(|_| test_image(16, 16)).collect();
    let report = run_benchmark(&mut backends, &gallery).unwrap();

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].backend, "fast");
    assert_eq!(report.entries[0].average_latency_ms, 2.0);
    assert_eq!(report.entries[0].images_timed, 4);
    assert_eq!(report.entries[1].average_latency_ms, 8.0);
}
