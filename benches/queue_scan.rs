use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use l3_book::book::Queue;
use std::collections::VecDeque;

const N: usize = 200_000;

fn build_queue(n: usize) -> Queue<u64, u64> {
    let mut queue = Queue::new();
    for i in 0..n as u64 {
        queue.push_back(i, i);
    }
    queue
}

fn build_vecdeque(n: usize) -> VecDeque<(u64, u64)> {
    (0..n as u64).map(|i| (i, i)).collect()
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_all");
    group.throughput(Throughput::Elements(N as u64));

    group.bench_function("queue_iter", |b| {
        b.iter_batched(
            || build_queue(N),
            |queue| {
                let sum: u64 = queue.iter().map(|(_, v)| *v).sum();
                black_box(sum)
            },
            BatchSize::LargeInput,
        )
    });

    group.bench_function("vecdeque_iter", |b| {
        b.iter_batched(
            || build_vecdeque(N),
            |dq| {
                let sum: u64 = dq.iter().map(|(_, v)| *v).sum();
                black_box(sum)
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

/// Cancelling from the middle of a level: keyed unlink vs linear scan.
fn bench_remove_middle(c: &mut Criterion) {
    const LEVEL: usize = 10_000;

    let mut group = c.benchmark_group("remove_middle");

    group.bench_function("queue_remove_key", |b| {
        b.iter_batched(
            || build_queue(LEVEL),
            |mut queue| {
                for k in (0..LEVEL as u64).step_by(7) {
                    queue.remove_key(&k);
                }
                black_box(queue.len())
            },
            BatchSize::LargeInput,
        )
    });

    group.bench_function("vecdeque_position_remove", |b| {
        b.iter_batched(
            || build_vecdeque(LEVEL),
            |mut dq| {
                for k in (0..LEVEL as u64).step_by(7) {
                    if let Some(pos) = dq.iter().position(|(key, _)| *key == k) {
                        dq.remove(pos);
                    }
                }
                black_box(dq.len())
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_scan, bench_remove_middle);
criterion_main!(benches);
