use crate::error::Error;

use std::hash::{Hash, Hasher};

use regex::Regex;

pub(crate) const ANONYMOUS: &str = "";
pub(crate) const STAR: &str = "*";
pub(crate) const GLOB: &str = "**";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Static,
    Wildcard,
    Regex,
}

/// One classified unit of a pattern: a path element, a query value or a
/// scheme/authority/fragment token.
#[derive(Debug, Clone)]
pub struct Segment {
    param_name: String,
    original: Option<String>,
    pattern: String,
    kind: SegmentKind,
    min_required: usize,
    max_allowed: usize,
    regex: Option<Regex>,
}

impl Segment {
    /// Builds a template segment: `"*"` is a wildcard, `"**"` a glob,
    /// anything else containing `*` a regex, the rest static.
    pub fn new(param_name: &str, pattern: Option<&str>) -> Result<Self, Error> {
        let effective = pattern.unwrap_or(STAR).to_owned();
        Self::build(param_name, pattern.map(str::to_owned), effective, false)
    }

    /// Builds a static segment from concrete URI text. Wildcard characters
    /// in the text have no special meaning.
    pub fn literal(text: &str) -> Self {
        match Self::build(ANONYMOUS, Some(text.to_owned()), text.to_owned(), true) {
            Ok(segment) => segment,
            Err(_) => unreachable!("literal segments never compile a regex"),
        }
    }

    /// `pattern` is the effective pattern used for classification, which
    /// may differ from the written `original` (authority parts narrow a
    /// glob down to a single wildcard).
    pub(crate) fn build(
        param_name: &str,
        original: Option<String>,
        pattern: String,
        literal: bool,
    ) -> Result<Self, Error> {
        let (kind, min_required, max_allowed, regex) = if literal {
            (SegmentKind::Static, 1, 1, None)
        } else if pattern == STAR {
            (SegmentKind::Wildcard, 1, 1, None)
        } else if pattern == GLOB {
            (SegmentKind::Wildcard, 0, usize::MAX, None)
        } else if pattern.contains('*') {
            let regex = compile_star_pattern(&pattern)?;
            (SegmentKind::Regex, 1, 1, Some(regex))
        } else {
            (SegmentKind::Static, 1, 1, None)
        };

        Ok(Self {
            param_name: param_name.to_owned(),
            original,
            pattern,
            kind,
            min_required,
            max_allowed,
            regex,
        })
    }

    pub fn param_name(&self) -> &str {
        &self.param_name
    }

    /// The effective pattern, after defaulting (`{name}` reports `*`).
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The pattern text as written, or the effective pattern when the
    /// source had none (bare `{name}`, bare query key).
    pub fn text(&self) -> &str {
        match &self.original {
            Some(original) => original,
            None => &self.pattern,
        }
    }

    pub(crate) fn has_explicit_pattern(&self) -> bool {
        self.original.is_some()
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn min_required(&self) -> usize {
        self.min_required
    }

    pub fn max_allowed(&self) -> usize {
        self.max_allowed
    }

    pub fn is_glob(&self) -> bool {
        self.kind == SegmentKind::Wildcard && self.max_allowed > 1
    }

    pub fn is_anonymous(&self) -> bool {
        self.param_name.is_empty()
    }

    /// Rank used to break equal-depth ties in the matcher, most specific
    /// first: static, regex, wildcard, glob.
    pub(crate) fn specificity(&self) -> u8 {
        match self.kind {
            SegmentKind::Static => 1,
            SegmentKind::Regex => 2,
            SegmentKind::Wildcard => {
                if self.is_glob() {
                    4
                } else {
                    3
                }
            }
        }
    }

    /// Pairwise segment matching, template side on the left.
    ///
    /// Wildcards absorb anything in either direction. Two regex segments
    /// never match each other; call sites depend on that outcome.
    pub fn matches(&self, other: &Segment) -> bool {
        use SegmentKind::*;
        match (self.kind, other.kind) {
            (Wildcard, _) | (_, Wildcard) => true,
            (Static, Static) => self.pattern == other.pattern,
            (Static, Regex) => other.regex_matches(&self.pattern),
            (Regex, Static) => self.regex_matches(&other.pattern),
            (Regex, Regex) => false,
        }
    }

    fn regex_matches(&self, text: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(text),
            None => false,
        }
    }
}

// Structural equality over everything that identifies a pattern; the
// compiled regex is derived state and trie keys must coalesce across
// independently parsed templates.
impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.param_name == other.param_name
            && self.pattern == other.pattern
            && self.min_required == other.min_required
            && self.max_allowed == other.max_allowed
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.param_name.hash(state);
        self.pattern.hash(state);
        self.min_required.hash(state);
        self.max_allowed.hash(state);
    }
}

/// A query key with its ordered value segments. Repeats of the same key
/// (`?k=a&k=b`) accumulate here instead of creating duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySegment {
    query_name: String,
    values: Vec<Segment>,
}

impl QuerySegment {
    pub(crate) fn new(query_name: &str, value: Segment) -> Self {
        Self {
            query_name: query_name.to_owned(),
            values: vec![value],
        }
    }

    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    /// The bound variable name, `""` for literal query segments.
    pub fn param_name(&self) -> &str {
        self.values[0].param_name()
    }

    pub fn first(&self) -> &Segment {
        &self.values[0]
    }

    pub fn values(&self) -> &[Segment] {
        &self.values
    }

    pub(crate) fn push_value(&mut self, value: Segment) {
        self.values.push(value);
    }

    /// True if any declared value matches any input value.
    pub fn matches(&self, input: &QuerySegment) -> bool {
        self.values
            .iter()
            .any(|t| input.values.iter().any(|i| t.matches(i)))
    }
}

// Turn the filesystem style wildcard syntax into an anchored regex:
// escape regex-significant literals, then widen * to .*
fn compile_star_pattern(pattern: &str) -> Result<Regex, Error> {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '\\' | '.' | '{' | '}' | '$' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('$');
    Regex::new(&out).map_err(|source| Error::MalformedPattern {
        pattern: pattern.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(pattern: &str) -> Segment {
        Segment::new("p", Some(pattern)).unwrap()
    }

    #[test]
    fn classification() {
        assert_eq!(seg("*").kind(), SegmentKind::Wildcard);
        assert_eq!(seg("*").max_allowed(), 1);
        assert_eq!(seg("**").kind(), SegmentKind::Wildcard);
        assert!(seg("**").is_glob());
        assert_eq!(seg("**").min_required(), 0);
        assert_eq!(seg("wild*card").kind(), SegmentKind::Regex);
        assert_eq!(seg("static").kind(), SegmentKind::Static);
    }

    #[test]
    fn literal_text_is_always_static() {
        let s = Segment::literal("*");
        assert_eq!(s.kind(), SegmentKind::Static);
        assert_eq!(s.text(), "*");
    }

    #[test]
    fn regex_matching() {
        assert!(seg("prefix*suffix").matches(&Segment::literal("prefix-mid-suffix")));
        assert!(!seg("prefix*suffix").matches(&Segment::literal("not-prefix-suffix-x")));
        // two regex segments never match
        assert!(!seg("a*b").matches(&seg("a*b")));
    }

    #[test]
    fn bad_pattern_fails_eagerly() {
        assert!(Segment::new("p", Some("ab[*")).is_err());
    }

    #[test]
    fn structural_equality_ignores_param_source() {
        let a = Segment::new("host", None).unwrap();
        let b = Segment::new("host", Some("*")).unwrap();
        assert_eq!(a, b);
    }
}
