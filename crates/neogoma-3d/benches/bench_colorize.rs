use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use neogoma_3d::{
    camera::{CameraIntrinsic, CameraPose},
    colorize::{nearest_camera, PointColorizer},
    reconstruct::Reconstruction,
};

const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

// cameras along the x axis looking down +z
fn camera_line(num_cameras: usize) -> Vec<CameraPose> {
    (0..num_cameras)
        .map(|i| CameraPose::new(IDENTITY, [-(i as f64) * 0.1, 0.0, 0.0], i))
        .collect()
}

fn random_points(num_points: usize) -> Vec<[f32; 3]> {
    // deterministic spread in front of the cameras
    (0..num_points)
        .map(|i| {
            let t = i as f32;
            [(t * 0.37).sin() * 2.0, (t * 0.11).cos(), 4.0 + (t * 0.05).sin()]
        })
        .collect()
}

fn bench_nearest_camera(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_camera");

    for num_cameras in [10, 100, 1000].iter() {
        let centers = camera_line(*num_cameras)
            .iter()
            .map(|pose| pose.center())
            .collect::<Vec<_>>();
        let point = [1.23, 0.5, 4.0];

        group.bench_with_input(
            BenchmarkId::new("nearest_camera", num_cameras),
            &centers,
            |b, centers| {
                b.iter(|| black_box(nearest_camera(black_box(&point), centers)));
            },
        );
    }
}

fn bench_colorize_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("colorize_points");

    let tmp_dir = tempfile::tempdir().unwrap();
    let num_cameras = 8;
    let image_paths = (0..num_cameras)
        .map(|i| {
            let path = tmp_dir.path().join(format!("{:04}.png", i + 1));
            image::RgbImage::from_fn(640, 480, |x, y| {
                image::Rgb([(x % 256) as u8, (y % 256) as u8, (i * 30) as u8])
            })
            .save(&path)
            .unwrap();
            path
        })
        .collect::<Vec<_>>();

    let intrinsic = CameraIntrinsic::new(500.0, 320.0, 240.0);

    for num_points in [1000, 10000, 100000].iter() {
        group.throughput(criterion::Throughput::Elements(*num_points as u64));

        let points = random_points(*num_points);
        let reconstruction = Reconstruction::new(
            camera_line(num_cameras),
            points.clone(),
            intrinsic,
            num_cameras,
        )
        .unwrap();
        let colorizer = PointColorizer::new(&reconstruction, &image_paths).unwrap();

        group.bench_with_input(
            BenchmarkId::new("colorize_points", num_points),
            &points,
            |b, points| {
                b.iter(|| black_box(colorizer.colorize_points(points).unwrap()));
            },
        );
    }
}

criterion_group!(benches, bench_nearest_camera, bench_colorize_points);
criterion_main!(benches);
