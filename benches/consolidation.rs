//! Benchmarks for route consolidation, page parsing and rendering.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::net::Ipv4Addr;

use routerus::aggregator::consolidate;
use routerus::catalog::DomainCatalog;
use routerus::formats::RouteFormat;
use routerus::resolution::CategoryIps;
use routerus::scrape::parse_records;

/// Spread addresses over dense and sparse prefixes, one domain per 16 addresses
fn generate_category(count: usize) -> CategoryIps {
    let mut category = CategoryIps::new();
    for i in 0..count {
        let a = (i % 7) as u8 + 1;
        let b = ((i / 7) % 256) as u8;
        let c = ((i / 1792) % 256) as u8;
        let d = ((i * 31) % 256) as u8;
        category.insert(&format!("d{}.ru", i / 16), [Ipv4Addr::new(a, b, c, d)]);
    }
    category
}

fn bench_consolidate(c: &mut Criterion) {
    let mut group = c.benchmark_group("consolidate");

    for size in [100, 1000, 10000, 50000] {
        let category = generate_category(size);
        group.bench_with_input(BenchmarkId::new("mixed", size), &category, |b, category| {
            b.iter(|| black_box(consolidate("Bench", category)));
        });
    }

    group.finish();
}

fn bench_parse_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_records");

    for rows in [10, 100, 1000] {
        let body: String = (0..rows)
            .map(|i| {
                format!(
                    "<tr><th>{}</th><td>h{}.example.ru</td><td>x</td><td>{}</td><td>10.0.{}.{}</td></tr>\n",
                    i,
                    i,
                    if i % 3 == 0 { "CNAME" } else { "A" },
                    (i / 256) % 256,
                    i % 256
                )
            })
            .collect();
        let html = format!(
            "<html><table class=\"table table-striped\"><thead></thead><tbody>{}</tbody></table></html>",
            body
        );
        group.bench_with_input(BenchmarkId::new("rows", rows), &html, |b, html| {
            b.iter(|| black_box(parse_records(html)));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let routes = consolidate("Bench", &generate_category(10000));

    for format in [RouteFormat::Mikrotik, RouteFormat::Keenetic, RouteFormat::Wireguard] {
        group.bench_with_input(BenchmarkId::new(format.id(), routes.len()), &routes, |b, routes| {
            b.iter(|| black_box(format.render(routes, Some("Bench"))));
        });
    }

    group.finish();
}

fn bench_parse_catalog(c: &mut Criterion) {
    let text: String = (0..50)
        .map(|cat| {
            let domains: String = (0..200)
                .map(|i| format!("https://www.site{}-{}.ru/path - note\n", cat, i))
                .collect();
            format!("Category{}\n{}\n", cat, domains)
        })
        .collect();

    c.bench_function("parse_catalog_10000", |b| {
        b.iter(|| black_box(DomainCatalog::parse(&text)));
    });
}

criterion_group!(
    benches,
    bench_consolidate,
    bench_parse_records,
    bench_render,
    bench_parse_catalog
);
criterion_main!(benches);
