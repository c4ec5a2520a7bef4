use cloudwatch_handler_metrics::{Action, Builder, EmfClient};
use criterion::{criterion_group, criterion_main, Criterion};
use std::time::SystemTime;

fn criterion_benchmark(c: &mut Criterion) {
    let metrics = Builder::new()
        .resource_type("Aws::S3::Bucket")
        .client(EmfClient::new(std::io::sink()))
        .build()
        .unwrap();

    c.bench_function("publish_invocation_metric", |b| {
        b.iter(|| metrics.publish_invocation_metric(SystemTime::now(), Action::Create))
    });

    c.bench_function("publish_exception_metric", |b| {
        b.iter(|| metrics.publish_exception_metric(SystemTime::now(), Action::Update, &std::fmt::Error))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
