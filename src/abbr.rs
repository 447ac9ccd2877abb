use std::borrow::Cow;
use std::path::MAIN_SEPARATOR;

/// Rewrites paths under the home directory into `~` shorthand.
///
/// Both row rendering and filtering go through the same abbreviation so
/// the user filters on exactly what is on screen.
#[derive(Clone, Debug, Default)]
pub struct TildeAbbr {
    home: Option<String>,
}

impl TildeAbbr {
    pub fn new(home: Option<String>) -> Self {
        let home = home
            .map(|home| home.trim_end_matches(MAIN_SEPARATOR).to_string())
            .filter(|home| !home.is_empty());

        Self { home }
    }

    /// Uses the current user's home directory, if one can be determined.
    pub fn from_env() -> Self {
        Self::new(dirs::home_dir().map(|home| home.to_string_lossy().to_string()))
    }

    pub fn abbreviate<'a>(&self, path: &'a str) -> Cow<'a, str> {
        let Some(home) = self.home.as_deref() else {
            return Cow::Borrowed(path);
        };
        let Some(rest) = path.strip_prefix(home) else {
            return Cow::Borrowed(path);
        };

        if rest.is_empty() {
            Cow::Borrowed("~")
        } else if rest.starts_with(MAIN_SEPARATOR) {
            Cow::Owned(format!("~{rest}"))
        } else {
            Cow::Borrowed(path)
        }
    }
}
