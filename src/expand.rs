//! Template to URI rendering.

use crate::error::Error;
use crate::params::Resolver;
use crate::parser::parse_literal;
use crate::segment::{Segment, SegmentKind};
use crate::template::{Part, Template};

/// Renders `template` as URI text, pulling parameter values from
/// `resolver`. A mandatory named segment with no resolved values is an
/// error; an exhausted optional one renders as nothing.
pub fn expand_to_string(template: &Template, resolver: &dyn Resolver) -> Result<String, Error> {
    let mut run = Run {
        resolver,
        names: resolver.names(),
        out: String::new(),
    };
    run.scheme(template)?;
    run.authority(template)?;
    run.path(template)?;
    // The fragment is rendered first so its parameter does not leak
    // into the catch-all query, but appended last.
    let fragment = run.fragment(template)?;
    run.query(template)?;
    if let Some(fragment) = fragment {
        run.out.push_str(&fragment);
    }
    validate(&run.out)?;
    Ok(run.out)
}

/// Like [`expand_to_string`] but reparses the result as a literal
/// [`Template`].
pub fn expand_to_template(template: &Template, resolver: &dyn Resolver) -> Result<Template, Error> {
    parse_literal(&expand_to_string(template, resolver)?)
}

struct Run<'a> {
    resolver: &'a dyn Resolver,
    names: Vec<&'a str>,
    out: String,
}

impl<'a> Run<'a> {
    fn scheme(&mut self, template: &Template) -> Result<(), Error> {
        if template.has_scheme() {
            if let Part::Value(segment) = template.scheme() {
                let value = self.single_value(segment)?;
                self.out.push_str(&value);
            }
            self.out.push(':');
        }
        Ok(())
    }

    fn authority(&mut self, template: &Template) -> Result<(), Error> {
        if !template.has_authority() {
            return Ok(());
        }
        self.out.push_str("//");
        if let Part::Value(segment) = template.username() {
            let value = self.single_value(segment)?;
            self.out.push_str(&value);
        }
        if template.password().is_present() {
            self.out.push(':');
            if let Part::Value(segment) = template.password() {
                let value = self.single_value(segment)?;
                self.out.push_str(&value);
            }
        }
        if template.username().is_present() || template.password().is_present() {
            self.out.push('@');
        }
        if let Part::Value(segment) = template.host() {
            let value = self.single_value(segment)?;
            self.out.push_str(&value);
        }
        if template.port().is_present() {
            self.out.push(':');
            if let Part::Value(segment) = template.port() {
                let value = self.single_value(segment)?;
                self.out.push_str(&value);
            }
        }
        Ok(())
    }

    fn path(&mut self, template: &Template) -> Result<(), Error> {
        let mut parts: Vec<String> = Vec::new();
        for segment in template.path() {
            if segment.kind() == SegmentKind::Static || segment.is_anonymous() {
                parts.push(segment.text().to_owned());
                continue;
            }
            self.consume(segment.param_name());
            match self.lookup(segment.param_name()) {
                Some(values) if segment.is_glob() => {
                    parts.extend(values.iter().cloned());
                }
                Some(values) => parts.push(values[0].clone()),
                None if segment.min_required() > 0 => {
                    return Err(Error::Unresolved {
                        name: segment.param_name().to_owned(),
                    });
                }
                None => {}
            }
        }
        if template.is_absolute() {
            self.out.push('/');
        }
        self.out.push_str(&parts.join("/"));
        if template.is_directory() && !parts.is_empty() {
            self.out.push('/');
        }
        Ok(())
    }

    fn query(&mut self, template: &Template) -> Result<(), Error> {
        let mut count = 0;
        for query in template.queries() {
            for value in query.values() {
                self.query_pair(query.query_name(), value, &mut count);
            }
        }
        if template.extra().is_some() {
            let leftovers = std::mem::take(&mut self.names);
            for name in leftovers {
                if let Some(values) = self.resolver.values(name) {
                    for value in values {
                        separator(&mut self.out, &mut count);
                        self.out.push_str(name);
                        self.out.push('=');
                        self.out.push_str(value);
                    }
                }
            }
        }
        if template.has_query() && count == 0 {
            self.out.push('?');
        }
        Ok(())
    }

    fn query_pair(&mut self, name: &str, value: &Segment, count: &mut usize) {
        if value.is_anonymous() {
            separator(&mut self.out, count);
            self.out.push_str(name);
            if value.has_explicit_pattern() {
                self.out.push('=');
                self.out.push_str(value.text());
            }
            return;
        }
        self.consume(value.param_name());
        match self.lookup(value.param_name()) {
            // an unresolved query parameter degrades to a bare key
            None => {
                separator(&mut self.out, count);
                self.out.push_str(name);
            }
            Some(values) if value.is_glob() => {
                for v in values {
                    separator(&mut self.out, count);
                    self.out.push_str(name);
                    self.out.push('=');
                    self.out.push_str(v);
                }
            }
            Some(values) => {
                separator(&mut self.out, count);
                self.out.push_str(name);
                self.out.push('=');
                self.out.push_str(&values[0]);
            }
        }
    }

    fn fragment(&mut self, template: &Template) -> Result<Option<String>, Error> {
        if !template.has_fragment() {
            return Ok(None);
        }
        let mut out = String::from("#");
        if let Part::Value(segment) = template.fragment() {
            let value = self.single_value(segment)?;
            out.push_str(&value);
        }
        Ok(Some(out))
    }

    fn single_value(&mut self, segment: &Segment) -> Result<String, Error> {
        if segment.kind() == SegmentKind::Static || segment.is_anonymous() {
            return Ok(segment.text().to_owned());
        }
        self.consume(segment.param_name());
        match self.lookup(segment.param_name()) {
            Some(values) => Ok(values[0].clone()),
            None => Err(Error::Unresolved {
                name: segment.param_name().to_owned(),
            }),
        }
    }

    fn consume(&mut self, name: &str) {
        self.names.retain(|n| *n != name);
    }

    fn lookup(&self, name: &str) -> Option<&'a [String]> {
        match self.resolver.values(name) {
            Some(values) if !values.is_empty() => Some(values),
            _ => None,
        }
    }
}

fn separator(out: &mut String, count: &mut usize) {
    *count += 1;
    out.push(if *count == 1 { '?' } else { '&' });
}

// The pattern markup must be gone by now; leftovers mean the template
// had parameters nothing resolved into legal URI text.
fn validate(uri: &str) -> Result<(), Error> {
    if uri.contains(|c| matches!(c, '{' | '}' | ' ' | '<' | '>' | '"')) {
        return Err(Error::syntax(uri, "invalid character in expanded URI"));
    }
    Ok(())
}
