use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pagewatch_core::flags::PageFlags;
use pagewatch_core::{idlemap, kpageflags};

/// Flag words per synthetic scan. The per-word work dominates a real
/// kpageflags pass, so a fixed in-memory slice benches the classification
/// without needing root or /proc.
const WORDS: usize = 1 << 20;

fn synthetic_flags(rng: &mut StdRng) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(WORDS * 8);
    for _ in 0..WORDS {
        // Roughly the mix a busy host shows: holes, active, idle, noise.
        let word: u64 = match rng.gen_range(0..4) {
            0 => 0,
            1 => PageFlags::RESIDENT_ACTIVE_MASK,
            2 => PageFlags::RESIDENT_ACTIVE_MASK | PageFlags::IDLE_MASK,
            _ => rng.gen::<u64>() & 0xffff_ffff,
        };
        bytes.extend_from_slice(&word.to_ne_bytes());
    }
    bytes
}

fn bench_classify(c: &mut Criterion) {
    let mut rng = StdRng::from_seed([0x42; 32]);
    let flags = synthetic_flags(&mut rng);

    c.bench_function("kpageflags/count_active/1Mi", |b| {
        b.iter(|| {
            kpageflags::count_active(Cursor::new(black_box(&flags)), kpageflags::CHUNK_WORDS)
                .unwrap()
        })
    });

    c.bench_function("kpageflags/count_pages/1Mi", |b| {
        b.iter(|| {
            kpageflags::count_pages(Cursor::new(black_box(&flags)), kpageflags::CHUNK_WORDS)
                .unwrap()
        })
    });
}

fn bench_idle_drain(c: &mut Criterion) {
    let mut rng = StdRng::from_seed([0x42; 32]);
    // 128 Ki words covers 32 GiB of 4 KiB pages.
    let mut bitmap = vec![0u8; (1 << 17) * 8];
    rng.fill(bitmap.as_mut_slice());

    c.bench_function("idlemap/drain_counts/128Ki", |b| {
        b.iter(|| idlemap::drain_counts(Cursor::new(black_box(&bitmap))).unwrap())
    });
}

criterion_group!(classify, bench_classify, bench_idle_drain);
criterion_main!(classify);
