#![deny(unsafe_code)]

//! URI template engine: parse a compact pattern language over
//! scheme/authority/path/query/fragment, match concrete URIs against a
//! registry of patterns, and convert between patterns and URIs in both
//! directions (expansion and extraction).
//!
//! ```
//! use urlgate::{parse_template, parse_literal, Matcher};
//!
//! let mut matcher = Matcher::new();
//! matcher.add(parse_template("/webhdfs/v1/{path=**}").unwrap(), "hdfs");
//!
//! let input = parse_literal("/webhdfs/v1/tmp/file").unwrap();
//! let found = matcher.match_template(&input).unwrap();
//! assert_eq!(*found.value(), "hdfs");
//! assert_eq!(
//!     found.params().values("path"),
//!     Some(&["tmp".to_owned(), "file".to_owned()][..])
//! );
//! ```

mod error;
mod expand;
mod extract;
mod matcher;
mod params;
mod parser;
mod rewrite;
mod segment;
mod shared;
mod template;

pub use crate::error::Error;
pub use crate::expand::{expand_to_string, expand_to_template};
pub use crate::extract::{extract, extract_template};
pub use crate::matcher::{Match, Matcher};
pub use crate::params::{Params, Resolver};
pub use crate::parser::{parse_literal, parse_template};
pub use crate::rewrite::{rewrite, Direction, Rewriter};
pub use crate::segment::{QuerySegment, Segment, SegmentKind};
pub use crate::shared::SharedMatcher;
pub use crate::template::{Builder, Part, Template};
