//! Filter-text compilation.
//!
//! A filter such as `src/hcd` becomes a case-insensitive expression that
//! requires `src` somewhere, then a path separator, then `hcd` somewhere
//! after it. Each segment is matched literally.

use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Compiled filter predicate.
#[derive(Clone, Debug)]
pub enum Matcher {
    Regex(Regex),
    /// Fallback when the derived expression cannot be compiled. Matches no
    /// path, so a broken filter shows an empty list instead of everything.
    Nothing,
}

impl Matcher {
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(candidate),
            Self::Nothing => false,
        }
    }
}

/// Compiles user-typed filter text into a [`Matcher`].
pub fn compile(pattern: &str) -> Matcher {
    let source = expression_for(pattern);

    match RegexBuilder::new(&source).case_insensitive(true).build() {
        Ok(re) => Matcher::Regex(re),
        Err(err) => {
            debug!(pattern, %err, "filter expression failed to compile");
            Matcher::Nothing
        }
    }
}

/// Builds the unanchored expression for `pattern`, one literal per path
/// segment with `.*<sep>.*` between consecutive segments.
fn expression_for(pattern: &str) -> String {
    let separator = regex::escape(MAIN_SEPARATOR_STR);
    let mut source = String::from(".*");

    for (index, segment) in pattern.split(MAIN_SEPARATOR).enumerate() {
        if index > 0 {
            source.push_str(".*");
            source.push_str(&separator);
            source.push_str(".*");
        }
        source.push_str(&regex::escape(segment));
    }
    source.push_str(".*");

    source
}
