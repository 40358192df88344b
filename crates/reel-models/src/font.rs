//! Caption font selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Family used when a requested font is not in the table.
pub const DEFAULT_FONT_FAMILY: &str = "Impact";

/// Requested name → installed family. Fonts that are rarely installed map
/// onto a common heavy face.
const FONT_TABLE: &[(&str, &str)] = &[
    ("Impact", "Impact"),
    ("Arial-Black", "Arial Black"),
    ("Montserrat-Bold", "Montserrat"),
    ("Bebas-Neue", "Arial Black"),
    ("Oswald-Bold", "Arial Black"),
];

/// A caption font, resolved through the fallback table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontChoice {
    requested: String,
    family: String,
}

impl FontChoice {
    /// Resolve a requested font name. Unknown names fall back to
    /// [`DEFAULT_FONT_FAMILY`].
    pub fn resolve(requested: &str) -> Self {
        let family = FONT_TABLE
            .iter()
            .find(|(name, _)| *name == requested)
            .map(|(_, family)| *family)
            .unwrap_or(DEFAULT_FONT_FAMILY);

        Self {
            requested: requested.to_string(),
            family: family.to_string(),
        }
    }

    /// Names accepted without falling back.
    pub fn known_names() -> impl Iterator<Item = &'static str> {
        FONT_TABLE.iter().map(|(name, _)| *name)
    }

    pub fn requested(&self) -> &str {
        &self.requested
    }

    /// Installed font family.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Family escaped for the filter grammar (backslash before each space).
    pub fn escaped_family(&self) -> String {
        self.family.replace(' ', "\\ ")
    }
}

impl Default for FontChoice {
    fn default() -> Self {
        Self::resolve(DEFAULT_FONT_FAMILY)
    }
}

impl fmt::Display for FontChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        assert_eq!(FontChoice::resolve("Impact").family(), "Impact");
        assert_eq!(FontChoice::resolve("Montserrat-Bold").family(), "Montserrat");
        assert_eq!(FontChoice::resolve("Bebas-Neue").family(), "Arial Black");
    }

    #[test]
    fn test_unknown_falls_back() {
        let font = FontChoice::resolve("Comic Sans");
        assert_eq!(font.requested(), "Comic Sans");
        assert_eq!(font.family(), "Impact");
    }

    #[test]
    fn test_spaces_escaped() {
        assert_eq!(FontChoice::resolve("Arial-Black").escaped_family(), "Arial\\ Black");
        assert_eq!(FontChoice::resolve("Impact").escaped_family(), "Impact");
    }
}
