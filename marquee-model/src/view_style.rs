use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Card layout used when rendering a movie grid.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewStyle {
    #[default]
    Poster,
    Backdrop,
}

impl ViewStyle {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ViewStyle::Poster => "poster",
            ViewStyle::Backdrop => "backdrop",
        }
    }

    /// Grid columns for this card style; backdrop cards are twice as wide.
    pub const fn grid_columns(&self) -> u16 {
        match self {
            ViewStyle::Poster => 4,
            ViewStyle::Backdrop => 2,
        }
    }

    pub const fn toggled(&self) -> Self {
        match self {
            ViewStyle::Poster => ViewStyle::Backdrop,
            ViewStyle::Backdrop => ViewStyle::Poster,
        }
    }
}

impl fmt::Display for ViewStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "poster" => Ok(ViewStyle::Poster),
            "backdrop" => Ok(ViewStyle::Backdrop),
            other => Err(format!("unknown view style '{other}'")),
        }
    }
}
