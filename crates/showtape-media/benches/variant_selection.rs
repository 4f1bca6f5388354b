use criterion::{black_box, criterion_group, criterion_main, Criterion};
use showtape_common::VideoFormat;
use showtape_media::{parse_master, select_variant};

fn master_playlist(variants: usize) -> String {
    let mut text = String::from("#EXTM3U\n#EXT-X-VERSION:3\n");
    let heights = [480u32, 720, 1080, 1440, 2160];
    for i in 0..variants {
        let height = heights[i % heights.len()];
        let width = height * 16 / 9;
        text.push_str(&format!(
            "#EXT-X-STREAM-INF:BANDWIDTH={},RESOLUTION={}x{},FRAME-RATE=29.970\n{}p_{}/index.m3u8\n",
            (i as u64 + 1) * 750_000,
            width,
            height,
            height,
            i
        ));
    }
    text
}

fn bench_parse_master(c: &mut Criterion) {
    let small = master_playlist(5);
    let large = master_playlist(60);

    c.bench_function("parse_master_5", |b| {
        b.iter(|| parse_master(black_box(&small)))
    });
    c.bench_function("parse_master_60", |b| {
        b.iter(|| parse_master(black_box(&large)))
    });
}

fn bench_select_variant(c: &mut Criterion) {
    let variants = parse_master(&master_playlist(60)).unwrap();

    c.bench_function("select_variant_best", |b| {
        b.iter(|| select_variant(black_box(variants.clone()), VideoFormat::Best))
    });
    c.bench_function("select_variant_fallback", |b| {
        let without_1440: Vec<_> = variants
            .iter()
            .filter(|v| !v.resolution.ends_with("x1440"))
            .cloned()
            .collect();
        b.iter(|| select_variant(black_box(without_1440.clone()), VideoFormat::P1440))
    });
}

criterion_group!(benches, bench_parse_master, bench_select_variant);
criterion_main!(benches);
