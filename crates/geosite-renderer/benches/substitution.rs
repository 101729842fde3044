//! Benchmarks for the substitution engine.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use geosite_renderer::{SeedCache, SubstitutionContext, SubstitutionEngine};

/// Generate a landing page with the given number of sections.
fn generate_template(sections: usize) -> String {
    let mut html = String::with_capacity(sections * 300 + 200);
    html.push_str("<html><head><title>[Service] in [City-State]</title>");
    html.push_str("<style>.hero { color: #333 }</style></head><body>");

    for i in 0..sections {
        html.push_str(&format!(
            "<h2>{{Trusted|Local|Reliable}} [Service] #{i}</h2>\
             <p>{{Call|Contact|Reach}} [Company Name] at [Phone] for [city] \
             service across [Zip Codes].</p>"
        ));
    }

    html.push_str(
        "<script type=\"application/ld+json\">{\"areaServed\": \"[City], [State Full]\"}</script>",
    );
    html.push_str("<script>window.track('{a|b}');</script></body></html>");
    html
}

fn context() -> SubstitutionContext {
    let mut ctx = SubstitutionContext::new("Roof Repair", "Springfield", "IL");
    ctx.state_full_name = Some("Illinois".to_owned());
    ctx.zip_codes = vec!["62701".to_owned(), "62702".to_owned(), "62703".to_owned()];
    ctx.primary_zip = Some("62701".to_owned());
    ctx
}

fn bench_render_cached_seed(c: &mut Criterion) {
    let engine = SubstitutionEngine::new(Arc::new(SeedCache::new()));
    let template = generate_template(10);
    let ctx = context();

    c.bench_function("render_10_sections", |b| {
        b.iter(|| engine.render(&template, &ctx));
    });
}

fn bench_render_varying_sizes(c: &mut Criterion) {
    let engine = SubstitutionEngine::new(Arc::new(SeedCache::new()));
    let ctx = context();
    let mut group = c.benchmark_group("render_by_sections");

    for sections in [1, 10, 100, 1000] {
        let template = generate_template(sections);
        group.throughput(Throughput::Bytes(template.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(sections),
            &template,
            |b, template| {
                b.iter(|| engine.render(template, &ctx));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_render_cached_seed, bench_render_varying_sizes);
criterion_main!(benches);
