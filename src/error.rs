#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed pattern or URI text, or expansion output that is not a
    /// syntactically legal URI.
    #[error("syntax error in {text:?}: {reason}")]
    Syntax { text: String, reason: &'static str },

    /// A regex segment whose pattern does not compile. Raised at parse
    /// time, never during matching.
    #[error("malformed segment pattern {pattern:?}")]
    MalformedPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Expansion required a value for a mandatory parameter but the
    /// resolver had none.
    #[error("no value resolved for required parameter {name:?}")]
    Unresolved { name: String },
}

impl Error {
    pub(crate) fn syntax(text: &str, reason: &'static str) -> Self {
        Self::Syntax {
            text: text.to_owned(),
            reason,
        }
    }
}
