//! URI template text to [`Template`] conversion.
//!
//! The grammar is recognized by a small state machine over a
//! delimiter-retaining tokenizer. The set of delimiters narrows as the
//! cursor moves through the URI: `:` only separates in the leading
//! position, `/` stops mattering once the query starts, and nothing but
//! `#` matters inside a fragment.

use crate::error::Error;
use crate::segment::{Segment, ANONYMOUS, GLOB, STAR};
use crate::template::{Builder, Template};

/// Parses URI template text: `{name}` and `{name=pattern}` bind
/// parameters, `*` and `**` are wildcards.
pub fn parse_template(text: &str) -> Result<Template, Error> {
    Run::new(text, false).parse()
}

/// Parses a concrete URI into a [`Template`] of static segments.
/// `*`, `{` and `}` carry no special meaning here.
pub fn parse_literal(text: &str) -> Result<Template, Error> {
    Run::new(text, true).parse()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Unknown,
    Scheme,
    Authority,
    Path,
    Query,
    Fragment,
}

// Cursor state for one parse; a fresh Run per call keeps the public
// functions shareable across threads.
struct Run<'t> {
    text: &'t str,
    pos: usize,
    prev: Option<&'t str>,
    curr: Option<&'t str>,
    state: State,
    literal: bool,
    builder: Builder,
}

impl<'t> Run<'t> {
    fn new(text: &'t str, literal: bool) -> Self {
        Self {
            text,
            pos: 0,
            prev: None,
            curr: None,
            state: State::Unknown,
            literal,
            builder: Builder::new(),
        }
    }

    fn parse(mut self) -> Result<Template, Error> {
        while self.pos < self.text.len() {
            match self.state {
                State::Unknown => self.step_unknown()?,
                State::Scheme => self.step_scheme()?,
                State::Authority => self.step_authority()?,
                State::Path => self.step_path()?,
                State::Query => self.step_query()?,
                State::Fragment => self.step_fragment()?,
            }
        }
        self.finish()?;
        Ok(self.builder.build())
    }

    // Advances the cursor by one token. A character from `delims` forms
    // a one-character token; anything else extends to the next delimiter.
    fn next(&mut self, delims: &str) {
        self.prev = self.curr;
        let rest = &self.text[self.pos..];
        let len = match rest.find(|c: char| delims.contains(c)) {
            Some(0) => 1,
            Some(i) => i,
            None => rest.len(),
        };
        self.curr = Some(&rest[..len]);
        self.pos += len;
    }

    fn step_unknown(&mut self) -> Result<(), Error> {
        self.next(":/?#");
        match self.curr {
            Some("/") if self.prev == Some("/") => {
                self.state = State::Authority;
                self.builder.mark_authority();
            }
            Some("/") if self.prev.is_some() => {
                // anything before the first '/' is a relative path
                self.state = State::Path;
                self.consume_path(self.prev)?;
            }
            Some("/") => {
                // absolute path or authority, decided by the next token
            }
            Some("?") => {
                self.state = State::Query;
                self.builder.mark_query();
                if self.prev == Some("/") {
                    self.builder.absolute(true).directory(true);
                } else {
                    self.consume_path(self.prev)?;
                }
            }
            Some(":") => {
                if self.prev == Some("/") {
                    return Err(Error::syntax(self.text, "scheme delimiter after path"));
                }
                self.state = State::Scheme;
                self.builder.mark_scheme();
                self.consume_scheme(self.prev)?;
            }
            Some("#") => {
                self.state = State::Fragment;
                self.builder.mark_fragment();
                if self.prev == Some("/") {
                    self.builder.absolute(true).directory(true);
                } else {
                    self.consume_path(self.prev)?;
                }
            }
            _ if self.prev == Some("/") => {
                self.state = State::Path;
                self.builder.absolute(true);
                self.consume_path(self.curr)?;
            }
            _ => {
                // first token of a relative path or a scheme, wait
            }
        }
        Ok(())
    }

    fn step_scheme(&mut self) -> Result<(), Error> {
        self.next("/?#");
        match self.curr {
            Some("/") if self.prev == Some("/") => {
                self.state = State::Authority;
                self.builder.mark_authority();
            }
            Some("/") => {
                // absolute path or authority, decided by the next token
            }
            Some("?") => {
                self.state = State::Query;
                self.builder.mark_query();
                self.after_scheme_path()?;
            }
            Some("#") => {
                self.state = State::Fragment;
                self.builder.mark_fragment();
                self.after_scheme_path()?;
            }
            _ => {
                self.state = State::Path;
                if self.prev == Some("/") {
                    self.builder.absolute(true);
                }
                self.consume_path(self.curr)?;
            }
        }
        Ok(())
    }

    fn after_scheme_path(&mut self) -> Result<(), Error> {
        if self.prev == Some("/") {
            self.builder.absolute(true).directory(true);
        } else if self.prev != Some(":") {
            self.consume_path(self.prev)?;
        }
        Ok(())
    }

    fn step_authority(&mut self) -> Result<(), Error> {
        self.next("/?#");
        let boundary = !matches!(self.prev, Some("/") | Some(":"));
        match self.curr {
            Some("/") => {
                self.state = State::Path;
                self.builder.absolute(true);
                if boundary {
                    self.consume_authority(self.prev)?;
                }
            }
            Some("?") => {
                self.state = State::Query;
                self.builder.mark_query();
                if boundary {
                    self.consume_authority(self.prev)?;
                }
            }
            Some("#") => {
                self.state = State::Fragment;
                self.builder.mark_fragment();
                if boundary {
                    self.consume_authority(self.prev)?;
                }
            }
            _ => {
                // the authority token, consumed at the next boundary
            }
        }
        Ok(())
    }

    fn step_path(&mut self) -> Result<(), Error> {
        self.next("/?#");
        match self.curr {
            Some("/") => {
                // adjacent slashes create no empty segment
            }
            Some("?") => {
                self.state = State::Query;
                self.builder.mark_query();
                if self.prev == Some("/") {
                    self.builder.directory(true);
                }
            }
            Some("#") => {
                self.state = State::Fragment;
                self.builder.mark_fragment();
                if self.prev == Some("/") {
                    self.builder.directory(true);
                }
            }
            _ => self.consume_path(self.curr)?,
        }
        Ok(())
    }

    fn step_query(&mut self) -> Result<(), Error> {
        self.next("?&#");
        match self.curr {
            Some("?") | Some("&") => {
                // repeated separators are tolerated
            }
            Some("#") => {
                self.state = State::Fragment;
                self.builder.mark_fragment();
            }
            _ => {
                self.consume_query(self.curr)?;
                self.curr = None;
            }
        }
        Ok(())
    }

    fn step_fragment(&mut self) -> Result<(), Error> {
        self.next("#");
        if self.curr != Some("#") {
            self.consume_fragment(self.curr)?;
            self.curr = None;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        match self.state {
            State::Unknown => {
                if self.curr == Some("/") {
                    self.builder.absolute(true).directory(true);
                } else {
                    self.consume_path(self.curr)?;
                }
            }
            State::Scheme => {
                if self.curr == Some("/") {
                    self.builder.absolute(true).directory(true);
                }
            }
            State::Authority => {
                if self.curr != Some("/") {
                    self.consume_authority(self.curr)?;
                }
            }
            State::Path => {
                if self.curr == Some("/") {
                    self.builder.directory(true);
                }
            }
            State::Query => {
                if !matches!(self.curr, Some("?") | Some("&")) {
                    self.consume_query(self.curr)?;
                }
            }
            State::Fragment => {
                if self.curr != Some("#") {
                    self.consume_fragment(self.curr)?;
                }
            }
        }
        Ok(())
    }

    fn consume_scheme(&mut self, token: Option<&str>) -> Result<(), Error> {
        if let Some(token) = token {
            let segment = self.template_token(token, STAR)?;
            self.builder.scheme(segment);
        }
        Ok(())
    }

    fn consume_authority(&mut self, token: Option<&str>) -> Result<(), Error> {
        let token = match token {
            Some(t) => t,
            None => return Ok(()),
        };
        let (userinfo, hostinfo) = match token.find('@') {
            Some(i) => (Some(&token[..i]), &token[i + 1..]),
            None => (None, token),
        };
        if hostinfo.contains('@') {
            return Err(Error::syntax(self.text, "multiple '@' in authority"));
        }
        if let Some(userinfo) = userinfo {
            let (username, password) = split_once(userinfo, ':');
            if !username.is_empty() {
                let segment = self.template_token(username, STAR)?;
                self.builder.username(segment);
            }
            if let Some(password) = password {
                if password.is_empty() {
                    self.builder.mark_password();
                } else {
                    let segment = self.template_token(password, STAR)?;
                    self.builder.password(segment);
                }
            }
        }
        let (host, port) = split_once(hostinfo, ':');
        if !host.is_empty() {
            let segment = self.template_token(host, STAR)?;
            self.builder.host(segment);
        }
        if let Some(port) = port {
            if port.is_empty() {
                self.builder.mark_port();
            } else {
                let segment = self.template_token(port, STAR)?;
                self.builder.port(segment);
            }
        }
        Ok(())
    }

    fn consume_path(&mut self, token: Option<&str>) -> Result<(), Error> {
        if let Some(token) = token {
            let segment = self.template_token(token, STAR)?;
            self.builder.push_path(segment);
        }
        Ok(())
    }

    fn consume_query(&mut self, token: Option<&str>) -> Result<(), Error> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(()),
        };
        // `{name}` is shorthand for `name={name}`
        if !self.literal && token.starts_with('{') {
            let segment = self.template_token(token, STAR)?;
            let query_name = segment.param_name().to_owned();
            self.builder.push_query(&query_name, segment);
            return Ok(());
        }
        match split_once(token, '=') {
            (name, None) => {
                // bare key, `?name`: an anonymous wildcard value
                let value = Segment::build(ANONYMOUS, None, STAR.to_owned(), false)?;
                self.builder.push_query(name, value);
            }
            (name, Some(value)) => {
                let segment = self.template_token(value, STAR)?;
                self.builder.push_query(name, segment);
            }
        }
        Ok(())
    }

    fn consume_fragment(&mut self, token: Option<&str>) -> Result<(), Error> {
        if let Some(token) = token {
            let segment = self.template_token(token, STAR)?;
            self.builder.fragment(segment);
        }
        Ok(())
    }

    // Classifies one token: `{name}`, `{name=pattern}` or plain text.
    fn template_token(&self, token: &str, default_pattern: &str) -> Result<Segment, Error> {
        if self.literal {
            return Ok(Segment::literal(token));
        }
        if token.len() >= 2 && token.starts_with('{') && token.ends_with('}') {
            let inner = &token[1..token.len() - 1];
            if inner.contains('{') || inner.contains('}') {
                return Err(Error::syntax(self.text, "nested template markup"));
            }
            return match inner.find('=') {
                Some(i) => {
                    let (name, pattern) = (&inner[..i], &inner[i + 1..]);
                    Segment::build(name, Some(pattern.to_owned()), pattern.to_owned(), false)
                }
                None => {
                    let effective = if inner == GLOB { GLOB } else { default_pattern };
                    Segment::build(inner, None, effective.to_owned(), false)
                }
            };
        }
        if token.contains('{') || token.contains('}') {
            return Err(Error::syntax(self.text, "unbalanced template markup"));
        }
        Segment::build(ANONYMOUS, Some(token.to_owned()), token.to_owned(), false)
    }
}

fn split_once(s: &str, d: char) -> (&str, Option<&str>) {
    match s.find(d) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_retains_delimiters() {
        let mut run = Run::new("a/b?c", false);
        run.next(":/?#");
        assert_eq!(run.curr, Some("a"));
        run.next(":/?#");
        assert_eq!(run.curr, Some("/"));
        run.next("/?#");
        assert_eq!(run.curr, Some("b"));
        run.next("?&#");
        assert_eq!(run.curr, Some("?"));
        run.next("?&#");
        assert_eq!(run.curr, Some("c"));
        assert_eq!(run.pos, run.text.len());
    }

    #[test]
    fn stray_braces_are_rejected() {
        assert!(parse_template("/a/{name").is_err());
        assert!(parse_template("/a/name}").is_err());
        assert!(parse_template("/{a{b}}").is_err());
        assert!(parse_literal("/a/{name").is_ok());
    }
}
