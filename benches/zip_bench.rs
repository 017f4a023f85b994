//! Packing and unpacking benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::Write;
use tempfile::TempDir;
use ziplet_core::archive::Compression;
use ziplet_core::{unzip_file, zip_files, Archiver, ZipOptions};

/// Generate test data with specified characteristics
fn generate_test_data(dir: &TempDir, file_count: usize, file_size: usize, compressible: bool) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let root = dir.path().join("input");
    fs::create_dir_all(&root).unwrap();

    for i in 0..file_count {
        let mut file = File::create(root.join(format!("file_{}.dat", i))).unwrap();

        if compressible {
            let pattern = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";
            for _ in 0..file_size / pattern.len() {
                file.write_all(pattern).unwrap();
            }
        } else {
            let mut data = vec![0u8; file_size];
            rng.fill(&mut data[..]);
            file.write_all(&data).unwrap();
        }
    }
}

/// Benchmark packing many small files
fn bench_small_files(c: &mut Criterion) {
    let mut group = c.benchmark_group("small_files");
    group.sample_size(10);

    for (name, compression) in [
        ("deflated", Compression::Deflated),
        ("stored", Compression::Stored),
    ] {
        group.bench_with_input(
            BenchmarkId::new("zip_500_small_files", name),
            &compression,
            |b, &compression| {
                let input_dir = TempDir::new().unwrap();
                generate_test_data(&input_dir, 500, 1024, true);
                let options = ZipOptions {
                    compression,
                    ..ZipOptions::default()
                };

                b.iter_with_setup(
                    || TempDir::new().unwrap(),
                    |output_dir| {
                        Archiver::default()
                            .zip_files_with_options(
                                &[input_dir.path().join("input")],
                                black_box(&output_dir.path().join("archive.zip")),
                                None,
                                None,
                                &options,
                            )
                            .unwrap();
                    },
                );
            },
        );
    }

    group.finish();
}

/// Benchmark the cost of AES encryption on larger payloads
fn bench_encryption(c: &mut Criterion) {
    let mut group = c.benchmark_group("encryption");
    group.sample_size(10);

    let input_dir = TempDir::new().unwrap();
    generate_test_data(&input_dir, 8, 1024 * 1024, false);
    let input = input_dir.path().join("input");

    for (name, password) in [("plain", None), ("aes256", Some("benchmark"))] {
        group.bench_function(BenchmarkId::new("zip_8mb_random", name), |b| {
            b.iter_with_setup(
                || TempDir::new().unwrap(),
                |output_dir| {
                    zip_files(
                        &[&input],
                        black_box(output_dir.path().join("archive.zip")),
                        password,
                        None,
                    )
                    .unwrap();
                },
            );
        });
    }

    group.finish();
}

/// Benchmark unpacking
fn bench_unzip(c: &mut Criterion) {
    let mut group = c.benchmark_group("unzip");
    group.sample_size(10);

    let input_dir = TempDir::new().unwrap();
    generate_test_data(&input_dir, 200, 16 * 1024, true);
    let archive = input_dir.path().join("archive.zip");
    zip_files(&[input_dir.path().join("input")], &archive, None, None).unwrap();

    group.bench_function("unzip_200_files", |b| {
        b.iter_with_setup(
            || TempDir::new().unwrap(),
            |output_dir| {
                unzip_file(black_box(&archive), output_dir.path(), true, None, None).unwrap();
            },
        );
    });

    group.finish();
}

criterion_group!(benches, bench_small_files, bench_encryption, bench_unzip);
criterion_main!(benches);
