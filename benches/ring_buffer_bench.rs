//! Criterion benchmark untuk RingBuff
//!
//! Run dengan: cargo bench

use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use containerio::RingBuff;

fn bench_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");
    group.throughput(Throughput::Elements(1));

    // Push ke buffer penuh: selalu overwrite
    group.bench_function("push_overwrite", |b| {
        let rb = RingBuff::new(1024).unwrap();
        for i in 0..1024u64 {
            rb.push(i);
        }
        let mut i = 0u64;
        b.iter(|| {
            black_box(rb.push(black_box(i)));
            i = i.wrapping_add(1);
        });
    });

    // Pop dari buffer yang selalu berisi
    group.bench_function("pop", |b| {
        let rb = RingBuff::new(1024).unwrap();
        for i in 0..512u64 {
            rb.push(i);
        }
        b.iter(|| {
            if let (Some(v), _) = rb.pop() {
                rb.push(black_box(v));
            }
        });
    });

    group.bench_function("push_pop_cycle", |b| {
        let rb = RingBuff::new(1024).unwrap();
        let mut i = 0u64;
        b.iter(|| {
            rb.push(black_box(i));
            black_box(rb.try_pop());
            i = i.wrapping_add(1);
        });
    });

    group.finish();
}

fn bench_threaded(c: &mut Criterion) {
    let mut group = c.benchmark_group("threaded");

    // Satu producer, satu consumer, termasuk close + drain
    for batch_size in [1_000u64, 10_000].iter() {
        group.throughput(Throughput::Elements(*batch_size));
        group.bench_function(format!("spsc_batch_{}", batch_size), |b| {
            b.iter(|| {
                let rb = Arc::new(RingBuff::new(4096).unwrap());
                let consumer = {
                    let rb = Arc::clone(&rb);
                    thread::spawn(move || {
                        let mut count = 0u64;
                        while let (Some(v), _) = rb.pop() {
                            black_box(v);
                            count += 1;
                        }
                        count
                    })
                };
                for i in 0..*batch_size {
                    rb.push(black_box(i));
                }
                rb.close().unwrap();
                black_box(consumer.join().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_push_pop, bench_threaded);
criterion_main!(benches);
