//! Parameter recovery: pattern plus concrete URI to bindings.

use crate::error::Error;
use crate::params::Params;
use crate::parser::parse_literal;
use crate::segment::Segment;
use crate::template::{Part, Template};

/// Extracts parameter bindings by aligning `pattern` with a concrete
/// URI. Names declared by the pattern but not covered by the URI are
/// registered unbound.
pub fn extract(pattern: &Template, uri: &str) -> Result<Params, Error> {
    Ok(extract_template(pattern, &parse_literal(uri)?))
}

/// [`extract`] over an already parsed concrete template.
pub fn extract_template(pattern: &Template, concrete: &Template) -> Params {
    let mut params = Params::new();
    bind_part(pattern.scheme(), concrete.scheme(), &mut params);
    bind_part(pattern.username(), concrete.username(), &mut params);
    bind_part(pattern.password(), concrete.password(), &mut params);
    bind_part(pattern.host(), concrete.host(), &mut params);
    bind_part(pattern.port(), concrete.port(), &mut params);
    bind_path(pattern.path(), concrete.path(), &mut params);
    bind_part(pattern.fragment(), concrete.fragment(), &mut params);
    bind_query(pattern, concrete, &mut params);
    params
}

fn bind_part(pattern: &Part, concrete: &Part, params: &mut Params) {
    let pattern = match pattern.segment() {
        Some(segment) if !segment.is_anonymous() => segment,
        _ => return,
    };
    match concrete.segment() {
        Some(value) if pattern.matches(value) => {
            params.add_value(pattern.param_name(), value.text());
        }
        _ => params.add_name(pattern.param_name()),
    }
}

fn bind_path(pattern: &[Segment], concrete: &[Segment], params: &mut Params) {
    let mut j = 0;
    for (i, segment) in pattern.iter().enumerate() {
        if j >= concrete.len() {
            if !segment.is_anonymous() {
                params.add_name(segment.param_name());
            }
            continue;
        }
        if segment.is_glob() {
            // A glob absorbs everything the trailing pattern segments
            // do not need.
            let reserved = pattern.len() - i - 1;
            let end = concrete.len().saturating_sub(reserved).max(j);
            if !segment.is_anonymous() {
                for value in &concrete[j..end] {
                    params.add_value(segment.param_name(), value.text());
                }
            }
            j = end;
        } else {
            let value = &concrete[j];
            if !segment.is_anonymous() && segment.matches(value) {
                params.add_value(segment.param_name(), value.text());
            }
            j += 1;
        }
    }
}

fn bind_query(pattern: &Template, concrete: &Template, params: &mut Params) {
    for tq in pattern.queries() {
        if tq.param_name().is_empty() {
            continue;
        }
        // a key the URI does not carry is skipped, never dereferenced
        if let Some(iq) = concrete.query(tq.query_name()) {
            let mut bound = false;
            for value in iq.values() {
                if value.has_explicit_pattern() {
                    params.add_value(tq.param_name(), value.text());
                    bound = true;
                }
            }
            if !bound {
                params.add_name(tq.param_name());
            }
        }
    }
    // the catch-all binds unclaimed concrete keys under their own names
    if pattern.extra().is_some() {
        for iq in concrete.queries() {
            if pattern.query(iq.query_name()).is_some() {
                continue;
            }
            for value in iq.values() {
                if value.has_explicit_pattern() {
                    params.add_value(iq.query_name(), value.text());
                }
            }
        }
    }
}
