use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A console section. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Dashboard,
    Products,
    Orders,
    Customers,
    Inquiries,
    Settings,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Dashboard,
        Section::Products,
        Section::Orders,
        Section::Customers,
        Section::Inquiries,
        Section::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Products => "products",
            Section::Orders => "orders",
            Section::Customers => "customers",
            Section::Inquiries => "inquiries",
            Section::Settings => "settings",
        }
    }

    /// Position in `ALL`
    pub fn index(&self) -> usize {
        match self {
            Section::Dashboard => 0,
            Section::Products => 1,
            Section::Orders => 2,
            Section::Customers => 3,
            Section::Inquiries => 4,
            Section::Settings => 5,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown section: {0}")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Section::Dashboard),
            "products" => Ok(Section::Products),
            "orders" => Ok(Section::Orders),
            "customers" => Ok(Section::Customers),
            // The API names inquiries "contacts"
            "inquiries" | "contacts" => Ok(Section::Inquiries),
            "settings" => Ok(Section::Settings),
            _ => Err(UnknownSection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all() {
        for (i, section) in Section::ALL.iter().enumerate() {
            assert_eq!(section.index(), i);
            assert_eq!(section.as_str().parse::<Section>().unwrap(), *section);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(" Orders ".parse::<Section>().unwrap(), Section::Orders);
        assert_eq!("contacts".parse::<Section>().unwrap(), Section::Inquiries);
        assert!("reports".parse::<Section>().is_err());
    }
}
