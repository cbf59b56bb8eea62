use criterion::{criterion_group, criterion_main, Criterion};
use pgn_tree::{parse_pgn, WriteOptions};
use std::hint::black_box;

const ANNOTATED_GAME: &str = "1. e4 { [%eval 0.2] } 1... e5 (1... c5 2. Nf3 d6 (2... Nc6 3. d4 cxd4 4. Nxd4) 3. d4) \
2. Nf3 Nc6 3. Bb5 a6 (3... Nf6 4. O-O Nxe4 5. d4) 4. Ba4 Nf6 5. O-O Be7 \
6. Re1 b5 7. Bb3 d6 8. c3 O-O 9. h3 Nb8 { the Breyer } 10. d4 Nbd7 1/2-1/2";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_annotated_game", |b| {
        b.iter(|| parse_pgn(black_box(ANNOTATED_GAME)).unwrap())
    });
}

fn bench_serialize(c: &mut Criterion) {
    let tree = parse_pgn(ANNOTATED_GAME).unwrap();
    let opts = WriteOptions::default();
    c.bench_function("serialize_annotated_game", |b| {
        b.iter(|| black_box(&tree).pgn(&opts))
    });
}

criterion_group!(benches, bench_parse, bench_serialize);
criterion_main!(benches);
