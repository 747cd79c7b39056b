//! URL rewriting: match an inbound or outbound URI against registered
//! rules, then re-render it through the winning rule's target template.

use crate::error::Error;
use crate::expand::expand_to_string;
use crate::extract::extract_template;
use crate::matcher::Matcher;
use crate::params::{Params, Resolver};
use crate::parser::parse_literal;
use crate::template::Template;

use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

/// One-shot rewrite: extract bindings from `uri` through `source`, then
/// expand `target` with those bindings layered over `resolver`.
pub fn rewrite(
    source: &Template,
    target: &Template,
    uri: &str,
    resolver: &dyn Resolver,
) -> Result<String, Error> {
    let concrete = parse_literal(uri)?;
    let extracted = extract_template(source, &concrete);
    expand_to_string(target, &Overlay::new(&extracted, resolver))
}

/// A rule registry holding source/target template pairs per direction.
/// A rewrite miss is a normal outcome: the caller keeps the original.
pub struct Rewriter {
    inbound: Matcher<Template>,
    outbound: Matcher<Template>,
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Rewriter {
    pub fn new() -> Self {
        Self {
            inbound: Matcher::new(),
            outbound: Matcher::new(),
        }
    }

    pub fn add(&mut self, direction: Direction, source: Template, target: Template) {
        debug!(?direction, source = %source, target = %target, "registering rewrite rule");
        self.matcher_mut(direction).add(source, target);
    }

    /// Rewrites `uri` through the best matching rule for `direction`,
    /// `Ok(None)` when no rule applies.
    pub fn rewrite(
        &self,
        direction: Direction,
        uri: &str,
        resolver: &dyn Resolver,
    ) -> Result<Option<String>, Error> {
        let concrete = parse_literal(uri)?;
        let matched = match self.matcher(direction).match_template(&concrete) {
            Some(matched) => matched,
            None => {
                trace!(?direction, uri, "no rewrite rule matched");
                return Ok(None);
            }
        };
        let extracted = extract_template(matched.template(), &concrete);
        let rewritten = expand_to_string(matched.value(), &Overlay::new(&extracted, resolver))?;
        trace!(?direction, uri, rewritten = %rewritten, "rewrote uri");
        Ok(Some(rewritten))
    }

    fn matcher(&self, direction: Direction) -> &Matcher<Template> {
        match direction {
            Direction::In => &self.inbound,
            Direction::Out => &self.outbound,
        }
    }

    fn matcher_mut(&mut self, direction: Direction) -> &mut Matcher<Template> {
        match direction {
            Direction::In => &mut self.inbound,
            Direction::Out => &mut self.outbound,
        }
    }
}

// Extracted bindings shadow the caller's resolver name by name.
struct Overlay<'a> {
    extracted: &'a Params,
    fallback: &'a dyn Resolver,
}

impl<'a> Overlay<'a> {
    fn new(extracted: &'a Params, fallback: &'a dyn Resolver) -> Self {
        Self {
            extracted,
            fallback,
        }
    }
}

impl Resolver for Overlay<'_> {
    fn names(&self) -> Vec<&str> {
        let mut names = self.extracted.names();
        for name in self.fallback.names() {
            if !self.extracted.contains(name) {
                names.push(name);
            }
        }
        names
    }

    fn values(&self, name: &str) -> Option<&[String]> {
        match self.extracted.values(name) {
            Some(values) if !values.is_empty() => Some(values),
            _ => self.fallback.values(name),
        }
    }
}
