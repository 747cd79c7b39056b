use urlgate::{parse_template, rewrite, Direction, Params, Rewriter, Template};

fn template(text: &str) -> Template {
    parse_template(text).unwrap()
}

#[test]
fn path_parameter_carries_over() {
    let out = rewrite(
        &template("/from/{p}"),
        &template("/to/{p}"),
        "/from/x",
        &Params::new(),
    )
    .unwrap();
    assert_eq!(out, "/to/x");
}

#[test]
fn glob_in_the_middle_carries_over() {
    let out = rewrite(
        &template("/{prefix}/{path=**}/{suffix}"),
        &template("/new/{path=**}"),
        "/pre/a/b/suf",
        &Params::new(),
    )
    .unwrap();
    assert_eq!(out, "/new/a/b");
}

#[test]
fn catch_all_query_round_trips() {
    let out = rewrite(
        &template("/s?{**}"),
        &template("/t?{**}"),
        "/s?a=1&b=2",
        &Params::new(),
    )
    .unwrap();
    assert_eq!(out, "/t?a=1&b=2");
}

#[test]
fn caller_resolver_fills_the_gaps() {
    let mut env = Params::new();
    env.add_value("scheme", "https");
    env.add_value("host", "backend.local");
    env.add_value("port", "8443");
    let out = rewrite(
        &template("/gateway/{path=**}"),
        &template("{scheme}://{host}:{port}/{path=**}"),
        "/gateway/api/users",
        &env,
    )
    .unwrap();
    assert_eq!(out, "https://backend.local:8443/api/users");
}

#[test]
fn extracted_bindings_shadow_the_resolver() {
    let mut env = Params::new();
    env.add_value("p", "from-env");
    let out = rewrite(
        &template("/s/{p}"),
        &template("/t/{p}"),
        "/s/from-uri",
        &env,
    )
    .unwrap();
    assert_eq!(out, "/t/from-uri");
}

#[test]
fn registry_picks_the_best_rule_per_direction() {
    let mut rewriter = Rewriter::new();
    rewriter.add(
        Direction::In,
        template("/webhdfs/v1/{path=**}"),
        template("/internal/hdfs/{path=**}"),
    );
    rewriter.add(
        Direction::In,
        template("/webhdfs/v1/tmp/{file}"),
        template("/internal/tmp/{file}"),
    );
    rewriter.add(
        Direction::Out,
        template("/internal/hdfs/{path=**}"),
        template("/webhdfs/v1/{path=**}"),
    );

    let p = Params::new();
    assert_eq!(
        rewriter
            .rewrite(Direction::In, "/webhdfs/v1/data/part-0", &p)
            .unwrap(),
        Some("/internal/hdfs/data/part-0".to_owned())
    );
    assert_eq!(
        rewriter
            .rewrite(Direction::In, "/webhdfs/v1/tmp/scratch", &p)
            .unwrap(),
        Some("/internal/tmp/scratch".to_owned())
    );
    assert_eq!(
        rewriter
            .rewrite(Direction::Out, "/internal/hdfs/data/part-0", &p)
            .unwrap(),
        Some("/webhdfs/v1/data/part-0".to_owned())
    );
}

#[test]
fn a_miss_keeps_the_original() {
    let mut rewriter = Rewriter::new();
    rewriter.add(Direction::In, template("/known/{p}"), template("/t/{p}"));
    let out = rewriter
        .rewrite(Direction::In, "/unknown/path", &Params::new())
        .unwrap();
    assert_eq!(out, None);
}
