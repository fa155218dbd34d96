//! Throughput Benchmark for capdispatch
//!
//! This benchmark measures dispatch cost per handler, the unmatched
//! fallback, reload, and dispatch under concurrent reloads.

use capdispatch::dispatch::Dispatcher;
use capdispatch::protocol::{ArgMap, Value};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;

fn make_args(value: Value) -> ArgMap {
    let mut args = ArgMap::new();
    args.insert("arg".to_string(), value);
    args
}

/// Benchmark each handler through the entry point
fn bench_handlers(c: &mut Criterion) {
    let dispatcher = Dispatcher::new();

    let mut group = c.benchmark_group("handlers");
    group.throughput(Throughput::Elements(1));

    group.bench_function("factorial_20", |b| {
        let args = make_args(Value::integer(20));
        b.iter(|| black_box(dispatcher.main("ns.factorial", &args).unwrap()));
    });

    group.bench_function("hello", |b| {
        let args = make_args(Value::string("World"));
        b.iter(|| black_box(dispatcher.main("ns.hello", &args).unwrap()));
    });

    group.bench_function("unknown", |b| {
        let args = make_args(Value::Null);
        b.iter(|| black_box(dispatcher.main("ns.unknown_thing", &args).unwrap()));
    });

    group.finish();
}

/// Benchmark big_response at several sizes
fn bench_big_response(c: &mut Criterion) {
    let dispatcher = Dispatcher::new();

    let mut group = c.benchmark_group("big_response");

    for size in [1024i64, 64 * 1024, 1024 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("{}_bytes", size), |b| {
            let args = make_args(Value::integer(size));
            b.iter(|| black_box(dispatcher.main("ns.big_response", &args).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark reload
fn bench_reload(c: &mut Criterion) {
    let dispatcher = Dispatcher::new();

    let mut group = c.benchmark_group("reload");
    group.throughput(Throughput::Elements(1));

    group.bench_function("reload", |b| {
        b.iter(|| black_box(dispatcher.reload()));
    });

    group.finish();
}

/// Benchmark dispatch while another thread reloads
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_with_reload", |b| {
        b.iter(|| {
            let dispatcher = Arc::new(Dispatcher::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let dispatcher = Arc::clone(&dispatcher);
                    thread::spawn(move || {
                        let args = make_args(Value::integer(12));
                        for i in 0..10_000 {
                            if t == 0 && i % 1000 == 0 {
                                dispatcher.reload();
                            }
                            black_box(dispatcher.main("ns.factorial", &args).unwrap());
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(dispatcher.generation());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_handlers,
    bench_big_response,
    bench_reload,
    bench_concurrent
);
criterion_main!(benches);
