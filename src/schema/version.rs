use std::fmt;

/// Schema version stored in the version table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionNumber(pub u32);

impl VersionNumber {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Why a version table exists but yields no usable version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionIndeterminate {
    TableEmpty,
    ValueInvalid(String),
    ReadError(String),
}

impl fmt::Display for VersionIndeterminate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableEmpty => f.write_str("version table is empty"),
            Self::ValueInvalid(value) => write!(f, "version value '{value}' is not a version"),
            Self::ReadError(e) => write!(f, "version table could not be read: {e}"),
        }
    }
}

/// What the version table says about the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    /// A new database: no version table yet.
    NoVersionTable,
    Known(VersionNumber),
    Indeterminate(VersionIndeterminate),
}

impl Version {
    #[must_use]
    pub fn known(&self) -> Option<VersionNumber> {
        match self {
            Self::Known(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVersionTable => f.write_str("no version table"),
            Self::Known(v) => v.fmt(f),
            Self::Indeterminate(reason) => write!(f, "indeterminate ({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_order_and_display() {
        assert!(VersionNumber(1) < VersionNumber(1).next());
        assert_eq!(Version::Known(VersionNumber(3)).to_string(), "v3");
        assert_eq!(Version::NoVersionTable.known(), None);
        assert_eq!(
            Version::Indeterminate(VersionIndeterminate::TableEmpty).to_string(),
            "indeterminate (version table is empty)"
        );
    }
}
