use urlgate::{expand_to_string, parse_template, Error, Params, Template};

fn template(text: &str) -> Template {
    parse_template(text).unwrap()
}

fn params(pairs: &[(&str, &[&str])]) -> Params {
    let mut params = Params::new();
    for &(name, values) in pairs {
        for &value in values {
            params.add_value(name, value);
        }
    }
    params
}

#[test]
fn static_text_passes_through() {
    let p = Params::new();
    assert_eq!(
        expand_to_string(&template("/path/file"), &p).unwrap(),
        "/path/file"
    );
    assert_eq!(expand_to_string(&template("path/"), &p).unwrap(), "path/");
    assert_eq!(expand_to_string(&template("/"), &p).unwrap(), "/");
    assert_eq!(expand_to_string(&template(""), &p).unwrap(), "");
}

#[test]
fn named_segments_resolve() {
    let p = params(&[("file", &["readme.txt"])]);
    assert_eq!(
        expand_to_string(&template("/path/{file}"), &p).unwrap(),
        "/path/readme.txt"
    );
}

#[test]
fn glob_joins_all_values() {
    let p = params(&[("path", &["tmp", "dir", "file"])]);
    assert_eq!(
        expand_to_string(&template("/root/{path=**}"), &p).unwrap(),
        "/root/tmp/dir/file"
    );
}

#[test]
fn exhausted_glob_emits_nothing() {
    let p = Params::new();
    assert_eq!(expand_to_string(&template("/{path=**}"), &p).unwrap(), "/");
}

#[test]
fn mandatory_segment_without_values_is_an_error() {
    let p = Params::new();
    match expand_to_string(&template("/{file}"), &p) {
        Err(Error::Unresolved { name }) => assert_eq!(name, "file"),
        other => panic!("expected unresolved error, got {:?}", other.map_err(|e| e.to_string())),
    }
}

#[test]
fn authority_round_trip() {
    let p = Params::new();
    for text in &["//host", "//:8080", "//user@", "//user:pass@host:8080"] {
        assert_eq!(&expand_to_string(&template(text), &p).unwrap(), text);
    }
}

#[test]
fn authority_parameters_resolve() {
    let p = params(&[("host", &["example.com"]), ("port", &["8443"])]);
    assert_eq!(
        expand_to_string(&template("//{host}:{port}"), &p).unwrap(),
        "//example.com:8443"
    );
}

#[test]
fn scheme_and_fragment_resolve() {
    let p = params(&[("s", &["https"]), ("f", &["top"])]);
    assert_eq!(
        expand_to_string(&template("{s}://host/a#{f}"), &p).unwrap(),
        "https://host/a#top"
    );
}

#[test]
fn query_pairs_in_declaration_order() {
    let p = params(&[("x", &["1"]), ("y", &["2"])]);
    assert_eq!(
        expand_to_string(&template("/p?a={x}&b={y}&lit=3"), &p).unwrap(),
        "/p?a=1&b=2&lit=3"
    );
}

#[test]
fn unresolved_query_parameter_degrades_to_bare_key() {
    let p = Params::new();
    assert_eq!(
        expand_to_string(&template("/p?a={x}"), &p).unwrap(),
        "/p?a"
    );
}

#[test]
fn glob_query_repeats_pairs() {
    let p = params(&[("v", &["1", "2"])]);
    assert_eq!(
        expand_to_string(&template("?k={v=**}"), &p).unwrap(),
        "?k=1&k=2"
    );
}

#[test]
fn bare_query_marker_round_trips() {
    let p = Params::new();
    assert_eq!(expand_to_string(&template("?"), &p).unwrap(), "?");
    assert_eq!(expand_to_string(&template("/p?"), &p).unwrap(), "/p?");
}

#[test]
fn extra_query_emits_leftover_names() {
    let p = params(&[("a", &["1"]), ("b", &["2", "3"])]);
    assert_eq!(
        expand_to_string(&template("/p?{**}"), &p).unwrap(),
        "/p?a=1&b=2&b=3"
    );
}

#[test]
fn consumed_names_stay_out_of_the_catch_all() {
    let p = params(&[("file", &["f"]), ("frag", &["top"]), ("other", &["x"])]);
    assert_eq!(
        expand_to_string(&template("/{file}?{**}#{frag}"), &p).unwrap(),
        "/f?other=x#top"
    );
}

#[test]
fn invalid_expanded_text_is_rejected() {
    let bad = params(&[("x", &["has space"])]);
    assert!(matches!(
        expand_to_string(&template("/{x}"), &bad),
        Err(Error::Syntax { .. })
    ));
}
