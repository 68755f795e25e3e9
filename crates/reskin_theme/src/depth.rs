//! Theme depth: the caller-selected scope of an apply run

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Scope of an apply run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeDepth {
    /// Rebind every themable property against the library variables
    #[default]
    Full,
    /// Rebind spacing variables only
    Spacing,
    /// Materialize the target collections locally, then theme fully against the local copies
    Local,
}

impl ThemeDepth {
    /// Stable id for config/serialization
    pub fn id(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Spacing => "spacing",
            Self::Local => "local",
        }
    }

    pub fn all() -> &'static [ThemeDepth] {
        const DEPTHS: [ThemeDepth; 3] = [ThemeDepth::Full, ThemeDepth::Spacing, ThemeDepth::Local];
        &DEPTHS
    }

    pub fn materializes_locally(self) -> bool {
        matches!(self, Self::Local)
    }

    pub fn is_spacing_only(self) -> bool {
        matches!(self, Self::Spacing)
    }
}

impl Display for ThemeDepth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ThemeDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|d| d.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown theme depth '{s}' (expected full, spacing or local)"))
    }
}
