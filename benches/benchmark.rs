use std::hint::black_box;

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use mementoweb::datetime::TemporalValue;
use mementoweb::link::parse_link_header;
use mementoweb::relation::Memento;
use mementoweb::timeline::MementoTimeline;

// a link-format TimeMap with one memento every 13 hours from 2001 on
fn time_map(count: usize) -> String {
    let start = Utc.with_ymd_and_hms(2001, 7, 24, 15, 45, 4).unwrap();
    let mut entries = vec![
        "<http://www.cnn.com/>;rel=\"original\"".to_string(),
        "<http://web.archive.org/web/timemap/link/http://www.cnn.com/>;rel=\"self\";type=\"application/link-format\"".to_string(),
    ];
    for i in 0..count {
        let instant = start + Duration::hours(13 * i as i64);
        let rel = match i {
            0 => "first memento",
            i if i + 1 == count => "last memento",
            _ => "memento",
        };
        entries.push(format!(
            "<http://web.archive.org/web/{}/http://www.cnn.com/>;rel=\"{}\";datetime=\"{}\"",
            instant.format("%Y%m%d%H%M%S"),
            rel,
            instant.format("%a, %d %b %Y %H:%M:%S GMT"),
        ));
    }
    entries.join(",\n")
}

fn timeline_of(document: &str) -> MementoTimeline {
    parse_link_header(document)
        .iter()
        .filter_map(Memento::from_link)
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let small = time_map(100);
    let large = time_map(10_000);
    c.bench_function("parse timemap 100", |b| b.iter(|| parse_link_header(black_box(&small))));
    c.bench_function("parse timemap 10k", |b| b.iter(|| parse_link_header(black_box(&large))));

    let mut timeline = timeline_of(&large);
    timeline.sort();
    println!("{} mementos", timeline.len());
    let target = TemporalValue::parse_rfc1123("Sun, 01 Jun 2003 12:00:00 GMT").unwrap();
    c.bench_function("closest 10k", |b| b.iter(|| timeline.closest(black_box(&target)).is_some()));
    c.bench_function("year counts 10k", |b| b.iter(|| timeline.year_counts()));
    c.bench_function("month counts 10k", |b| b.iter(|| timeline.month_counts(black_box(2003)).len()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
