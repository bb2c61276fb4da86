use std::fmt;
use std::str::FromStr;

use crate::error::ServiceError;

/// What the client wants done with an uploaded photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Scene caption plus detected object labels.
    #[default]
    Object,
    /// Banknote denomination.
    Currency,
    /// Printed text.
    Text,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Object, Mode::Currency, Mode::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Object => "object",
            Mode::Currency => "currency",
            Mode::Text => "text",
        }
    }

    /// Reads the optional `mode` form field. Absent means `Object`; anything
    /// present must name a known mode.
    pub fn from_field(value: Option<&str>) -> Result<Mode, ServiceError> {
        match value {
            None => Ok(Mode::default()),
            Some(v) => v.parse(),
        }
    }
}

impl FromStr for Mode {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ServiceError::UnknownMode(s.to_owned()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
