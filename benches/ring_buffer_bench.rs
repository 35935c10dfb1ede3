//! Criterion benchmark untuk byte ring
//!
//! Run dengan: cargo bench

use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use stario::RingBuffer;

fn bench_byte_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");
    group.throughput(Throughput::Elements(1));

    // Benchmark write+read satu byte
    group.bench_function("write_read_byte", |b| {
        let rb = RingBuffer::new(65536).unwrap();
        let mut i = 0u8;
        b.iter(|| {
            rb.write_byte(black_box(i)).unwrap();
            black_box(rb.read_byte().unwrap());
            i = i.wrapping_add(1);
        });
    });

    // Benchmark read pada buffer kosong (WouldBlock path)
    group.bench_function("read_empty", |b| {
        let rb = RingBuffer::new(64).unwrap();
        let mut buf = [0u8; 16];
        b.iter(|| black_box(rb.read_block(&mut buf)));
    });

    group.finish();
}

fn bench_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocks");

    for block_size in [16usize, 256, 4096].iter() {
        group.throughput(Throughput::Bytes(*block_size as u64));
        group.bench_function(format!("block_{}", block_size), |b| {
            let rb = RingBuffer::new(8192).unwrap();
            let data = vec![0xA5u8; *block_size];
            let mut out = vec![0u8; *block_size];
            b.iter(|| {
                rb.write_block(black_box(&data));
                black_box(rb.read_block(&mut out));
            });
        });
    }

    group.finish();
}

fn bench_spsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    const TOTAL: usize = 1 << 20;
    group.throughput(Throughput::Bytes(TOTAL as u64));
    group.sample_size(10);

    // Producer thread vs consumer dengan ring kecil: mengukur biaya backpressure
    for capacity in [64usize, 4096].iter() {
        group.bench_function(format!("stream_cap_{}", capacity), |b| {
            b.iter(|| {
                let rb = Arc::new(RingBuffer::new(*capacity).unwrap());
                let producer = {
                    let rb = Arc::clone(&rb);
                    thread::spawn(move || {
                        let chunk = [1u8; 512];
                        for _ in 0..TOTAL / chunk.len() {
                            rb.write_block(&chunk);
                        }
                        rb.finish();
                    })
                };

                let mut buf = [0u8; 512];
                let mut total = 0usize;
                loop {
                    let t = rb.read_block(&mut buf);
                    total += t.count;
                    if t.is_end_of_stream() {
                        break;
                    }
                    if t.count == 0 {
                        thread::yield_now();
                    }
                }
                producer.join().unwrap();
                black_box(total)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_byte_ops, bench_blocks, bench_spsc);
criterion_main!(benches);
