use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A class of the company's capital stock.
///
/// The derived ordering is the display/priority order: `A`, `B`, `C`,
/// `Ordinary`, then any label the system does not know about.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShareClassName {
    A,
    B,
    C,
    Ordinary,
    Other(String),
}

impl ShareClassName {
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        let lower = trimmed.to_ascii_lowercase();
        let stripped = lower
            .strip_prefix("class")
            .map(str::trim)
            .unwrap_or(lower.as_str());
        match stripped {
            "a" => Self::A,
            "b" => Self::B,
            "c" => Self::C,
            "ordinary" | "ord" => Self::Ordinary,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Short id used for view ids and JSON keys.
    pub fn key(&self) -> &str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::Ordinary => "Ordinary",
            Self::Other(label) => label.as_str(),
        }
    }

    /// Human label, e.g. "Class A".
    pub fn display_label(&self) -> String {
        match self {
            Self::A | Self::B | Self::C => format!("Class {}", self.key()),
            Self::Ordinary => "Ordinary".to_string(),
            Self::Other(label) => label.clone(),
        }
    }
}

impl fmt::Display for ShareClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-class share counts held by one involvement. Missing classes read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareAmounts {
    amounts: BTreeMap<ShareClassName, u64>,
}

impl ShareAmounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: ShareClassName, amount: u64) -> Self {
        self.set(class, amount);
        self
    }

    pub fn set(&mut self, class: ShareClassName, amount: u64) {
        if amount == 0 {
            self.amounts.remove(&class);
        } else {
            self.amounts.insert(class, amount);
        }
    }

    pub fn get(&self, class: &ShareClassName) -> u64 {
        self.amounts.get(class).copied().unwrap_or(0)
    }

    /// Sum over all classes, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.amounts.values().copied().fold(0, u64::saturating_add)
    }

    pub fn has_positive(&self) -> bool {
        self.amounts.values().any(|amount| *amount > 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ShareClassName, u64)> {
        self.amounts.iter().map(|(class, amount)| (class, *amount))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HolderKind {
    Person,
    Company,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Holder {
    Person {
        name: String,
        address: String,
        nationality: Option<String>,
    },
    Company {
        name: String,
        address: String,
        registration_number: Option<String>,
    },
}

impl Holder {
    pub fn person(name: impl Into<String>) -> Self {
        Self::Person {
            name: name.into(),
            address: String::new(),
            nationality: None,
        }
    }

    pub fn company(name: impl Into<String>) -> Self {
        Self::Company {
            name: name.into(),
            address: String::new(),
            registration_number: None,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Person { name, .. } | Self::Company { name, .. } => name.as_str(),
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Self::Person { address, .. } | Self::Company { address, .. } => address.as_str(),
        }
    }

    pub fn kind(&self) -> HolderKind {
        match self {
            Self::Person { .. } => HolderKind::Person,
            Self::Company { .. } => HolderKind::Company,
        }
    }
}

/// A relationship between the company and one holder: shareholding, office, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct Involvement {
    pub id: String,
    pub holder: Holder,
    pub shares: ShareAmounts,
    /// Flat percentage for holders known only by percentage (no itemized counts).
    pub share_percentage: Option<f64>,
    pub roles: Vec<String>,
}

impl Involvement {
    pub fn new(id: impl Into<String>, holder: Holder) -> Self {
        Self {
            id: id.into(),
            holder,
            shares: ShareAmounts::new(),
            share_percentage: None,
            roles: Vec::new(),
        }
    }

    pub fn with_shares(mut self, class: ShareClassName, amount: u64) -> Self {
        self.shares.set(class, amount);
        self
    }

    /// Non-finite values are stored as absent.
    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.share_percentage = percentage.is_finite().then_some(percentage);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn total_shares(&self) -> u64 {
        self.shares.total()
    }

    /// The flat percentage when it is usable (finite and positive).
    pub fn valid_percentage(&self) -> Option<f64> {
        self.share_percentage
            .filter(|value| value.is_finite() && *value > 0.0)
    }

    pub fn has_role_matching(&self, pattern: &Regex) -> bool {
        self.roles.iter().any(|role| pattern.is_match(role))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareClass {
    pub name: ShareClassName,
    pub issued: u64,
}

/// The root entity whose ownership is being visualized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub address: String,
    pub authorized_shares: u64,
    pub issued_shares: u64,
    pub share_classes: Vec<ShareClass>,
}

impl Company {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Issued count recorded for one class, summed if the class is listed twice.
    pub fn class_total(&self, class: &ShareClassName) -> u64 {
        self.share_classes
            .iter()
            .filter(|entry| &entry.name == class)
            .map(|entry| entry.issued)
            .fold(0, u64::saturating_add)
    }

    pub fn total_class_shares(&self) -> u64 {
        self.share_classes
            .iter()
            .map(|entry| entry.issued)
            .fold(0, u64::saturating_add)
    }
}

/// One immutable upstream snapshot: the company plus its involvement list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub company: Company,
    pub involvements: Vec<Involvement>,
}

impl Snapshot {
    pub fn new(company: Company, involvements: Vec<Involvement>) -> Self {
        Self {
            company,
            involvements,
        }
    }
}
