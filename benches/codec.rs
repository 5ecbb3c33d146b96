use board::{decode, encode, encode_with, Board, Glyphs, START_SNAPSHOT};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn codec_benchmark(c: &mut Criterion) {
    c.bench_function("decode start snapshot", |b| {
        b.iter(|| decode(black_box(START_SNAPSHOT)));
    });

    let unicode = encode_with(&Board::start_pos(), Glyphs::Unicode);
    c.bench_function("decode unicode snapshot", |b| {
        b.iter(|| decode(black_box(&unicode)));
    });

    let board = Board::start_pos();
    c.bench_function("encode start position", |b| {
        b.iter(|| encode(black_box(&board)));
    });
}

criterion_group!(benches, codec_benchmark);
criterion_main!(benches);
