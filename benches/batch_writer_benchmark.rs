use std::sync::Arc;

use bulkload::batch::BatchWriter;
use bulkload::loader::{LoadCoordinator, LoadPlan};
use bulkload::record::Record;
use bulkload::store::{MemoryTable, TableProvisioner};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::Serialize;
use tokio::runtime::Runtime;

#[derive(Serialize)]
struct Item {
    id: usize,
    payload: String,
}

impl Record for Item {
    const ENTITY: &'static str = "item";

    fn record_key(&self) -> String {
        self.id.to_string()
    }
}

fn create_items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|id| Item {
            id,
            payload: format!("payload-{}", id),
        })
        .collect()
}

fn benchmark_batch_writer(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let table = MemoryTable::new("bench");
    rt.block_on(table.ensure_ready()).unwrap();
    let items = create_items(1_000);

    let mut group = c.benchmark_group("batch_writer_1000");
    for concurrency in [1usize, 8, 64] {
        let writer = BatchWriter::<Item>::new(Arc::new(table.clone()))
            .with_concurrency_limit(concurrency);

        group.bench_with_input(
            BenchmarkId::from_parameter(concurrency),
            &concurrency,
            |b, _| b.iter(|| black_box(rt.block_on(writer.run(&items)).unwrap())),
        );
    }
    group.finish();
}

fn benchmark_load_coordinator(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("load_three_collections", |b| {
        b.iter(|| {
            rt.block_on(async {
                let table = Arc::new(MemoryTable::new("bench"));
                let plan = LoadPlan::new()
                    .add(create_items(100), table.clone(), 3)
                    .add(create_items(20), table.clone(), 3)
                    .add(create_items(200), table.clone(), 3);

                black_box(LoadCoordinator::new(table).load(plan).await.unwrap())
            })
        })
    });
}

criterion_group!(benches, benchmark_batch_writer, benchmark_load_coordinator);

criterion_main!(benches);
