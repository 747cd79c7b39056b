use crate::segment::{QuerySegment, Segment, GLOB, STAR};

use std::fmt;

/// Presence of a single-valued URI part.
///
/// `Present` records that the part's delimiter appeared with nothing
/// after it (`"host:"` has a present but empty port); `Absent` means the
/// delimiter itself never appeared.
#[derive(Debug, Clone)]
pub enum Part {
    Absent,
    Present,
    Value(Segment),
}

impl Part {
    pub fn is_present(&self) -> bool {
        !matches!(self, Part::Absent)
    }

    pub fn segment(&self) -> Option<&Segment> {
        match self {
            Part::Value(segment) => Some(segment),
            _ => None,
        }
    }
}

/// A parsed URI template: classified segments for every URI component
/// plus the presence flags that distinguish `"/"` from `""` and `"?"`
/// from no query at all.
#[derive(Debug, Clone)]
pub struct Template {
    pub(crate) scheme: Part,
    pub(crate) has_authority: bool,
    pub(crate) username: Part,
    pub(crate) password: Part,
    pub(crate) host: Part,
    pub(crate) port: Part,
    pub(crate) is_absolute: bool,
    pub(crate) is_directory: bool,
    pub(crate) path: Vec<Segment>,
    pub(crate) has_query: bool,
    pub(crate) queries: Vec<QuerySegment>,
    pub(crate) extra: Option<QuerySegment>,
    pub(crate) fragment: Part,
}

impl Template {
    pub fn scheme(&self) -> &Part {
        &self.scheme
    }

    pub fn has_scheme(&self) -> bool {
        self.scheme.is_present()
    }

    pub fn has_authority(&self) -> bool {
        self.has_authority
    }

    pub fn username(&self) -> &Part {
        &self.username
    }

    pub fn password(&self) -> &Part {
        &self.password
    }

    pub fn host(&self) -> &Part {
        &self.host
    }

    pub fn port(&self) -> &Part {
        &self.port
    }

    /// True when the path starts at the root, `"/x"` rather than `"x"`.
    pub fn is_absolute(&self) -> bool {
        self.is_absolute
    }

    /// True when the path ends with a trailing slash.
    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    pub fn has_query(&self) -> bool {
        self.has_query
    }

    /// Declared query pairs in source order, the extra slot excluded.
    pub fn queries(&self) -> &[QuerySegment] {
        &self.queries
    }

    pub fn query(&self, name: &str) -> Option<&QuerySegment> {
        self.queries.iter().find(|q| q.query_name() == name)
    }

    /// The catch-all query slot, declared as `?*`, `?**`, `?{*}` or
    /// `?{**}`, which absorbs query pairs no named pair claims.
    pub fn extra(&self) -> Option<&QuerySegment> {
        self.extra.as_ref()
    }

    pub fn has_fragment(&self) -> bool {
        self.fragment.is_present()
    }

    pub fn fragment(&self) -> &Part {
        &self.fragment
    }
}

// Named segments always render their effective pattern, so reparsing a
// rendered template yields a structurally equal one and normalization
// stays visible: `{host}` renders as `{host=*}`.
fn write_segment(f: &mut fmt::Formatter<'_>, segment: &Segment) -> fmt::Result {
    if segment.is_anonymous() {
        f.write_str(segment.text())
    } else {
        write!(f, "{{{}={}}}", segment.param_name(), segment.pattern())
    }
}

fn write_query_pair(f: &mut fmt::Formatter<'_>, name: &str, value: &Segment) -> fmt::Result {
    if value.is_anonymous() {
        if value.has_explicit_pattern() {
            write!(f, "{}={}", name, value.text())
        } else {
            // bare key, `?name`
            f.write_str(name)
        }
    } else {
        if name != STAR && name != GLOB {
            write!(f, "{}=", name)?;
        }
        write_segment(f, value)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Part::Value(s) = &self.scheme {
            write_segment(f, s)?;
        }
        if self.scheme.is_present() {
            f.write_str(":")?;
        }
        if self.has_authority {
            f.write_str("//")?;
            if let Part::Value(s) = &self.username {
                write_segment(f, s)?;
            }
            if self.password.is_present() {
                f.write_str(":")?;
                if let Part::Value(s) = &self.password {
                    write_segment(f, s)?;
                }
            }
            if self.username.is_present() || self.password.is_present() {
                f.write_str("@")?;
            }
            if let Part::Value(s) = &self.host {
                write_segment(f, s)?;
            }
            if self.port.is_present() {
                f.write_str(":")?;
                if let Part::Value(s) = &self.port {
                    write_segment(f, s)?;
                }
            }
        }
        if self.is_absolute {
            f.write_str("/")?;
        }
        for (i, segment) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write_segment(f, segment)?;
        }
        if self.is_directory && !self.path.is_empty() {
            f.write_str("/")?;
        }
        if self.has_query {
            f.write_str("?")?;
            let mut first = true;
            for query in &self.queries {
                for value in query.values() {
                    if !first {
                        f.write_str("&")?;
                    }
                    first = false;
                    write_query_pair(f, query.query_name(), value)?;
                }
            }
            if let Some(extra) = &self.extra {
                for value in extra.values() {
                    if !first {
                        f.write_str("&")?;
                    }
                    first = false;
                    write_query_pair(f, extra.query_name(), value)?;
                }
            }
        }
        if self.fragment.is_present() {
            f.write_str("#")?;
            if let Part::Value(s) = &self.fragment {
                write_segment(f, s)?;
            }
        }
        Ok(())
    }
}

/// Incremental [`Template`] constructor; the parser drives one of these
/// per parse, but it is public so templates can be assembled directly.
#[derive(Debug)]
pub struct Builder {
    template: Template,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            template: Template {
                scheme: Part::Absent,
                has_authority: false,
                username: Part::Absent,
                password: Part::Absent,
                host: Part::Absent,
                port: Part::Absent,
                is_absolute: false,
                is_directory: false,
                path: Vec::new(),
                has_query: false,
                queries: Vec::new(),
                extra: None,
                fragment: Part::Absent,
            },
        }
    }

    pub fn scheme(&mut self, segment: Segment) -> &mut Self {
        self.template.scheme = Part::Value(segment);
        self
    }

    pub fn mark_scheme(&mut self) -> &mut Self {
        if !self.template.scheme.is_present() {
            self.template.scheme = Part::Present;
        }
        self
    }

    pub fn mark_authority(&mut self) -> &mut Self {
        self.template.has_authority = true;
        self
    }

    pub fn username(&mut self, segment: Segment) -> &mut Self {
        self.template.has_authority = true;
        self.template.username = Part::Value(singular(segment));
        self
    }

    pub fn password(&mut self, segment: Segment) -> &mut Self {
        self.template.has_authority = true;
        self.template.password = Part::Value(singular(segment));
        self
    }

    pub fn mark_password(&mut self) -> &mut Self {
        if !self.template.password.is_present() {
            self.template.password = Part::Present;
        }
        self
    }

    pub fn host(&mut self, segment: Segment) -> &mut Self {
        self.template.has_authority = true;
        self.template.host = Part::Value(singular(segment));
        self
    }

    pub fn port(&mut self, segment: Segment) -> &mut Self {
        self.template.has_authority = true;
        self.template.port = Part::Value(singular(segment));
        self
    }

    pub fn mark_port(&mut self) -> &mut Self {
        if !self.template.port.is_present() {
            self.template.port = Part::Present;
        }
        self
    }

    pub fn absolute(&mut self, absolute: bool) -> &mut Self {
        self.template.is_absolute = absolute;
        self
    }

    pub fn directory(&mut self, directory: bool) -> &mut Self {
        self.template.is_directory = directory;
        self
    }

    pub fn push_path(&mut self, segment: Segment) -> &mut Self {
        self.template.path.push(segment);
        self
    }

    pub fn mark_query(&mut self) -> &mut Self {
        self.template.has_query = true;
        self
    }

    /// Adds a query pair. Names `*` and `**` route to the extra slot and
    /// a repeated name appends another value to the existing pair.
    pub fn push_query(&mut self, query_name: &str, value: Segment) -> &mut Self {
        self.template.has_query = true;
        if query_name == STAR || query_name == GLOB {
            match &mut self.template.extra {
                Some(extra) => extra.push_value(value),
                None => self.template.extra = Some(QuerySegment::new(query_name, value)),
            }
            return self;
        }
        match self
            .template
            .queries
            .iter_mut()
            .find(|q| q.query_name() == query_name)
        {
            Some(query) => query.push_value(value),
            None => self.template.queries.push(QuerySegment::new(query_name, value)),
        }
        self
    }

    pub fn fragment(&mut self, segment: Segment) -> &mut Self {
        self.template.fragment = Part::Value(segment);
        self
    }

    pub fn mark_fragment(&mut self) -> &mut Self {
        if !self.template.fragment.is_present() {
            self.template.fragment = Part::Present;
        }
        self
    }

    pub fn build(self) -> Template {
        self.template
    }
}

// Authority parts hold at most one value, so a glob written there
// narrows to a single wildcard while keeping its written text.
fn singular(segment: Segment) -> Segment {
    if segment.is_glob() {
        match Segment::build(
            segment.param_name(),
            Some(segment.text().to_owned()),
            STAR.to_owned(),
            false,
        ) {
            Ok(narrowed) => narrowed,
            Err(_) => segment,
        }
    } else {
        segment
    }
}
