//! Benchmarks for join argument construction
//!
//! Measures building and rendering the ffmpeg join command line.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use usmkit_av::runner::split_args;
use usmkit_av::{JoinArguments, JoinConfig, MediaContainer};
use std::path::Path;

/// Minimal fragments
const CONFIG_SIMPLE: (&str, &str) = ("-c:v copy", "-c:a copy");

/// Typical re-encode
const CONFIG_MEDIUM: (&str, &str) = ("-c:v libx264 -preset slow -crf 18", "-c:a aac -b:a 192k");

/// Quoted filter chains
const CONFIG_COMPLEX: (&str, &str) = (
    "-c:v libx265 -preset medium -crf 20 -vf \"scale=1920:-2, fps=30\" \
     -x265-params 'aq-mode=3:psy-rd=2.0' -pix_fmt yuv420p10le",
    "-c:a libopus -b:a 160k -af \"loudnorm=I=-16:TP=-1.5\"",
);

fn container() -> MediaContainer {
    MediaContainer::new(Path::new("/games/movies/Opening Movie 01.usm"), "m2v").with_audio("hca")
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("join_build");
    let container = container();
    let out_dir = Path::new("/games/converted");

    for (name, (video, audio)) in [
        ("simple", CONFIG_SIMPLE),
        ("medium", CONFIG_MEDIUM),
        ("complex", CONFIG_COMPLEX),
    ] {
        let config = JoinConfig::new(video, audio, "mp4");
        group.bench_with_input(BenchmarkId::new("argv", name), &config, |b, config| {
            b.iter(|| {
                JoinArguments::build(
                    black_box(&container),
                    "Opening Movie 01",
                    Some(out_dir),
                    config,
                )
                .to_args()
            });
        });
        group.bench_with_input(BenchmarkId::new("display", name), &config, |b, config| {
            b.iter(|| {
                JoinArguments::build(
                    black_box(&container),
                    "Opening Movie 01",
                    Some(out_dir),
                    config,
                )
                .to_string()
            });
        });
    }

    group.finish();
}

fn bench_split_args(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_args");

    for (name, fragment) in [
        ("simple", CONFIG_SIMPLE.0),
        ("medium", CONFIG_MEDIUM.0),
        ("complex", CONFIG_COMPLEX.0),
    ] {
        group.bench_with_input(BenchmarkId::new("fragment", name), &fragment, |b, fragment| {
            b.iter(|| split_args(black_box(fragment)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_split_args);
criterion_main!(benches);
