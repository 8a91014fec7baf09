//! Criterion benchmark for filtering a large catalog (made by FontLab https://www.fontlab.com/)

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fontgrid_core::catalog::Catalog;
use fontgrid_core::entry::{AxisData, FontEntry};
use fontgrid_core::filter::{self, FilterState, TypeFilter};

fn large_catalog() -> Catalog {
    (0..5_000)
        .map(|i| {
            if i % 3 == 0 {
                FontEntry::folder(
                    &format!("Folder Sans {i}"),
                    format!("/fonts/folder-{i}.ttf"),
                    AxisData::default(),
                )
            } else {
                FontEntry::system(format!("System Serif {i}"), AxisData::default())
            }
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let catalog = large_catalog();
    let query = FilterState::new().with_query("sans 12");
    let folders = FilterState::new()
        .with_type(TypeFilter::FolderOnly)
        .with_query("ttf");

    c.bench_function("filter query over 5k entries", |b| {
        b.iter(|| filter::apply(black_box(&catalog), black_box(&query), Some(42)))
    });

    c.bench_function("filter folder type over 5k entries", |b| {
        b.iter(|| filter::apply(black_box(&catalog), black_box(&folders), None))
    });
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
