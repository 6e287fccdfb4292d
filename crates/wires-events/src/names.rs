//! Event name arguments and their normalization.
//!
//! Every operation accepts an [`EventNames`] value and reduces it to
//! canonical single-event calls before touching the subscription table:
//!
//! ```text
//! "change"              → change
//! "change blur"         → change, blur
//! {change: a, blur: b}  → (change, a), (blur, b)
//! "" / Unnamed          → operation-specific (no-op, or "every event")
//! ```

/// The reserved event name whose listeners receive every event.
pub const ALL_EVENT: &str = "all";

/// Event name argument accepted by all operations.
///
/// `T` is whatever an event map pairs with each name: callbacks for
/// `on`/`once`/`off`, payload values for `trigger`.
#[derive(Debug, Clone)]
pub enum EventNames<T> {
    /// No name given.
    Unnamed,
    /// A single name, or several separated by whitespace.
    Name(String),
    /// An event map: each name paired with its own value.
    Map(Vec<(String, T)>),
}

/// Result of normalizing an [`EventNames`].
#[derive(Debug, PartialEq)]
pub(crate) enum Normalized<T> {
    /// Absent or empty name.
    Unnamed,
    /// One literal event name.
    Single(String),
    /// Several names, each re-invoked separately. Map entries carry their
    /// paired value.
    Many(Vec<(String, Option<T>)>),
}

impl<T> EventNames<T> {
    /// Returns `true` for an absent or empty name.
    #[must_use]
    pub fn is_unnamed(&self) -> bool {
        match self {
            Self::Unnamed => true,
            Self::Name(name) => name.is_empty(),
            Self::Map(_) => false,
        }
    }

    pub(crate) fn normalize(self) -> Normalized<T> {
        match self {
            Self::Unnamed => Normalized::Unnamed,
            Self::Name(name) if name.is_empty() => Normalized::Unnamed,
            Self::Name(name) if name.contains(char::is_whitespace) => Normalized::Many(
                name.split_whitespace()
                    .map(|n| (n.to_string(), None))
                    .collect(),
            ),
            Self::Name(name) => Normalized::Single(name),
            Self::Map(entries) => {
                Normalized::Many(entries.into_iter().map(|(n, v)| (n, Some(v))).collect())
            }
        }
    }
}

impl<T> Default for EventNames<T> {
    fn default() -> Self {
        Self::Unnamed
    }
}

impl<T> From<&str> for EventNames<T> {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl<T> From<String> for EventNames<T> {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl<T> From<&String> for EventNames<T> {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl<T> From<Option<&str>> for EventNames<T> {
    fn from(name: Option<&str>) -> Self {
        name.map_or(Self::Unnamed, Self::from)
    }
}

impl<T> From<Vec<(String, T)>> for EventNames<T> {
    fn from(entries: Vec<(String, T)>) -> Self {
        Self::Map(entries)
    }
}

impl<T, const N: usize> From<[(&str, T); N]> for EventNames<T> {
    fn from(entries: [(&str, T); N]) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }
}
