use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use waitq_lib::queue::BlockingQueue;

fn handoff_blocking_queue(n: u64) {
    let queue = Arc::new(BlockingQueue::<u64>::new());
    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for i in 0..n {
                queue.push(i);
            }
        })
    };
    let mut sum = 0;
    for _ in 0..n {
        sum += queue.wait().item().unwrap();
    }
    producer.join().unwrap();
    assert_eq!(sum, n * (n - 1) / 2);
}

fn handoff_mpsc(n: u64) {
    let (sender, receiver) = mpsc::channel();
    let producer = thread::spawn(move || {
        for i in 0..n {
            sender.send(i).unwrap();
        }
    });
    let mut sum = 0;
    for _ in 0..n {
        sum += receiver.recv().unwrap();
    }
    producer.join().unwrap();
    assert_eq!(sum, n * (n - 1) / 2);
}

fn uncontended_blocking_queue(n: u64) {
    let queue = BlockingQueue::<u64>::new();
    for i in 0..n {
        queue.push(i);
    }
    let mut sum = 0;
    for _ in 0..n {
        sum += queue.try_pop().item().unwrap();
    }
    assert_eq!(sum, n * (n - 1) / 2);
}

fn uncontended_mpsc(n: u64) {
    let (sender, receiver) = mpsc::channel();
    for i in 0..n {
        sender.send(i).unwrap();
    }
    let mut sum = 0;
    for _ in 0..n {
        sum += receiver.try_recv().unwrap();
    }
    assert_eq!(sum, n * (n - 1) / 2);
}

fn bench_handoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("Handoff");
    let range = [1000, 5000, 10000];
    for i in range.iter() {
        group.bench_with_input(BenchmarkId::new("StdMpsc", i), i, |b, i| {
            b.iter(|| handoff_mpsc(black_box(*i)))
        });
    }
    for i in range.iter() {
        group.bench_with_input(BenchmarkId::new("BlockingQueue", i), i, |b, i| {
            b.iter(|| handoff_blocking_queue(black_box(*i)))
        });
    }

    group.finish();
}

fn bench_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("Uncontended");
    let range = [1000, 5000, 10000];
    for i in range.iter() {
        group.bench_with_input(BenchmarkId::new("StdMpsc", i), i, |b, i| {
            b.iter(|| uncontended_mpsc(black_box(*i)))
        });
    }
    for i in range.iter() {
        group.bench_with_input(BenchmarkId::new("BlockingQueue", i), i, |b, i| {
            b.iter(|| uncontended_blocking_queue(black_box(*i)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_handoff, bench_uncontended);
criterion_main!(benches);
