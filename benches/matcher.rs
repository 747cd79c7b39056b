use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use urlgate::{parse_literal, parse_template, Matcher};

fn matcher_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("matcher-match");

    group.bench_function("static-path", |b| {
        let mut matcher: Matcher<usize> = Matcher::new();
        matcher.add(parse_template("/webhdfs/v1/tmp/file").unwrap(), 1);
        let input = parse_literal("/webhdfs/v1/tmp/file").unwrap();
        b.iter_with_large_drop(|| matcher.match_template(&input))
    });

    group.bench_function("glob-path", |b| {
        let mut matcher: Matcher<usize> = Matcher::new();
        matcher.add(parse_template("/webhdfs/v1/{path=**}").unwrap(), 1);
        let input = parse_literal("/webhdfs/v1/a/b/c/d/e").unwrap();
        b.iter_with_large_drop(|| matcher.match_template(&input))
    });

    group.bench_function("query-alternatives", |b| {
        let mut matcher: Matcher<usize> = Matcher::new();
        matcher.add(parse_template("/op?op=OPEN&user={u}").unwrap(), 1);
        matcher.add(parse_template("/op?op=CREATE&user={u}").unwrap(), 2);
        matcher.add(parse_template("/op?op={op}").unwrap(), 3);
        let input = parse_literal("/op?op=CREATE&user=hdfs").unwrap();
        b.iter_with_large_drop(|| matcher.match_template(&input))
    });
}

fn matcher_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("matcher-build");

    group.bench_function("single-template", |b| {
        b.iter_batched_ref(
            Matcher::new,
            |matcher: &mut Matcher<usize>| {
                matcher.add(parse_template("/webhdfs/v1/{path=**}").unwrap(), 1);
            },
            BatchSize::SmallInput,
        )
    });
}

fn template_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("template-parse");

    group.bench_function("full-url", |b| {
        b.iter_with_large_drop(|| {
            parse_template("{scheme}://{host}:{port}/gateway/{path=**}?op={op}#{frag}")
        })
    });
}

criterion_group!(benches, matcher_match, matcher_build, template_parse);
criterion_main!(benches);
