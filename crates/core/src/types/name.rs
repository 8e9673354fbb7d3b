//! Item name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`ItemName`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ItemNameError {
    /// The input is empty after trimming.
    #[error("item name cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("item name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that cannot appear in a store key.
    #[error("item name cannot contain '{0}'")]
    InvalidCharacter(char),
    /// The input is a reserved store key.
    #[error("item name '{0}' is reserved")]
    Reserved(String),
}

/// A normalized pantry item name.
///
/// The name doubles as the store's document key, so parsing normalizes it
/// once at the boundary: the input is trimmed and lower-cased, ensuring
/// that "Milk" and "milk" resolve to the same record. Every mutating
/// operation goes through this type; nothing else constructs store keys.
///
/// ## Constraints
///
/// - Non-empty after trimming
/// - At most 256 characters
/// - No `/` (document keys are path segments)
/// - Not `.` or `..`, and not wrapped in double underscores (reserved keys)
///
/// ## Examples
///
/// ```
/// use pantry_core::ItemName;
///
/// let name = ItemName::parse("  Olive Oil ").unwrap();
/// assert_eq!(name.as_str(), "olive oil");
///
/// assert!(ItemName::parse("   ").is_err());
/// assert!(ItemName::parse("a/b").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ItemName(String);

impl ItemName {
    /// Maximum length of an item name in characters.
    pub const MAX_LENGTH: usize = 256;

    /// Parse an `ItemName` from a raw user-supplied string.
    ///
    /// Trims surrounding whitespace and lower-cases the result. Parsing is
    /// idempotent: parsing an already-normalized name yields an equal value.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized name:
    /// - Is empty
    /// - Is longer than 256 characters
    /// - Contains `/`
    /// - Is a reserved key (`.`, `..`, or `__…__`)
    pub fn parse(s: &str) -> Result<Self, ItemNameError> {
        let normalized = s.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(ItemNameError::Empty);
        }

        if normalized.chars().count() > Self::MAX_LENGTH {
            return Err(ItemNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if normalized.contains('/') {
            return Err(ItemNameError::InvalidCharacter('/'));
        }

        if normalized == "." || normalized == ".." {
            return Err(ItemNameError::Reserved(normalized));
        }

        if normalized.starts_with("__") && normalized.ends_with("__") {
            return Err(ItemNameError::Reserved(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ItemName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the name capitalized for display ("olive oil" → "Olive oil").
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().collect::<String>() + chars.as_str()
        })
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
