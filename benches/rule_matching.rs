//! Benchmarks for provider classification
//!
//! Tests performance of classifying links against the ordered rule list.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use playgate_rules::{Matcher, ProviderClassifier, ProviderRule, Transform};

const LINKS: &[(&str, &str)] = &[
    ("mega", "https://mega.nz/file/ABC123#KEY"),
    ("gofile", "https://gofile.io/d/abc"),
    ("kraken", "https://krakenfiles.com/view/xyz789/movie.html"),
    ("restrictive", "https://odvidhide.example/embed/abc"),
    ("default", "https://random-host.example/stream.m3u8"),
    ("unparseable", "definitely not a url"),
];

fn bench_builtin_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("builtin_classification");
    let classifier = ProviderClassifier::builtin();

    for (name, url) in LINKS {
        group.bench_with_input(BenchmarkId::new("classify", name), url, |b, url| {
            b.iter(|| classifier.classify(black_box(url), black_box("")));
        });
    }

    group.finish();
}

fn bench_direct_media_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_media_relay");
    let url = "https://cdn.example/episodes/ep01.mp4?token=abc";

    for enabled in [false, true] {
        let classifier = ProviderClassifier::builtin().with_direct_media_relay(enabled);
        group.bench_with_input(BenchmarkId::new("enabled", enabled), &url, |b, url| {
            b.iter(|| classifier.classify(black_box(url), black_box("")));
        });
    }

    group.finish();
}

fn bench_long_rule_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("long_rule_list");

    // Many host rules ahead of the built-ins; the link falls through to default.
    for count in [10usize, 50] {
        let markers: Vec<String> = (0..count).map(|i| format!("host{i}")).collect();
        let mut rules: Vec<ProviderRule> = markers
            .iter()
            .map(|m| {
                ProviderRule::new(
                    "generated",
                    Matcher::host_label(&[m.as_str()]),
                    Transform::Passthrough,
                )
            })
            .collect();
        rules.extend(ProviderClassifier::builtin().rules().iter().cloned());
        let classifier = ProviderClassifier::new(rules);

        group.bench_with_input(
            BenchmarkId::new("fallthrough", count),
            &"https://random-host.example/stream.m3u8",
            |b, url| {
                b.iter(|| classifier.classify(black_box(url), black_box("")));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_builtin_classification,
    bench_direct_media_toggle,
    bench_long_rule_list
);
criterion_main!(benches);
