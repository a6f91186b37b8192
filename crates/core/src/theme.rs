//! Visual themes a room can be rendered with.
//!
//! The set is closed: the same list is offered to the AI generator as an enum
//! and enforced by a `CHECK` constraint on `escape_rooms.theme`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Theme applied to every page of a room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomTheme {
    #[default]
    Light,
    Dark,
    Mytheme,
    Hacker,
    Treasure,
}

impl RoomTheme {
    /// Every theme, in the order presented to authors.
    pub const ALL: [RoomTheme; 5] = [
        Self::Light,
        Self::Dark,
        Self::Mytheme,
        Self::Hacker,
        Self::Treasure,
    ];

    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Mytheme => "mytheme",
            Self::Hacker => "hacker",
            Self::Treasure => "treasure",
        }
    }

    /// Parse a stored or submitted theme name.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid theme '{value}'. Must be one of: {}",
                    Self::names().join(", ")
                ))
            })
    }

    /// Resolve an optional submitted theme. Missing or blank means the default.
    pub fn resolve(value: Option<&str>) -> Result<Self, CoreError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(name) => Self::parse(name),
        }
    }

    /// All theme names as strings.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }
}

impl std::fmt::Display for RoomTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
