use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbeam_utils::thread::scope;

use rkvs::{Dispatcher, DispatcherConfig, MemStore};

const POOL_SIZES: [usize; 5] = [1, 2, 4, 8, 16];
const CALLERS: usize = 4;
const KEYS_PER_CALLER: usize = 25;

fn dispatcher(pool_size: usize) -> Dispatcher<MemStore> {
    let config = DispatcherConfig::default()
        .pool_size(pool_size)
        .queue_capacity(CALLERS * KEYS_PER_CALLER);
    Dispatcher::new(MemStore::new(), &config).unwrap()
}

fn key(caller: usize, idx: usize) -> String {
    format!("key_{}_{}", caller, idx)
}

fn run_callers(d: &Dispatcher<MemStore>, command: &str, with_value: bool) {
    scope(|s| {
        for caller in 0..CALLERS {
            s.spawn(move |_| {
                for idx in 0..KEYS_PER_CALLER {
                    let mut args = vec![key(caller, idx)];
                    if with_value {
                        args.push(format!("value_00000000000{}", idx));
                    }
                    d.submit(command, args).unwrap().wait().unwrap();
                }
            });
        }
    })
    .unwrap();
}

fn put_pool_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch put");
    group.sample_size(50);
    for pool_size in POOL_SIZES.iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(pool_size),
            pool_size,
            |b, &pool_size| {
                let d = dispatcher(pool_size);
                b.iter(|| run_callers(&d, "PUT", true));
            },
        );
    }
    group.finish();
}

fn get_pool_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch get");
    group.sample_size(50);
    for pool_size in POOL_SIZES.iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(pool_size),
            pool_size,
            |b, &pool_size| {
                let d = dispatcher(pool_size);
                run_callers(&d, "PUT", true);
                b.iter(|| run_callers(&d, "GET", false));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, put_pool_size, get_pool_size);
criterion_main!(benches);
