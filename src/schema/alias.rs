use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Fields the engine understands. Everything else is carried as `extra`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Contact,
    Status,
    CompletedBy,
    CompletedAt,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 4] = [
        CanonicalField::Contact,
        CanonicalField::Status,
        CanonicalField::CompletedBy,
        CanonicalField::CompletedAt,
    ];

    /// Canonical key, which is also always an accepted label
    pub fn key(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Status => "status",
            Self::CompletedBy => "completedby",
            Self::CompletedAt => "completedat",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

const STANDARD_ALIASES: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Contact,
        &[
            "contact",
            "contacts",
            "contact number",
            "phone",
            "phone number",
            "phone no",
            "number",
            "mobile",
            "mobile number",
        ],
    ),
    (CanonicalField::Status, &["status", "call status", "state"]),
    (
        CanonicalField::CompletedBy,
        &["completedby", "completed by", "completed_by", "called by", "caller"],
    ),
    (
        CanonicalField::CompletedAt,
        &["completedat", "completed at", "completed_at", "completed on", "called at"],
    ),
];

/// Header lookup key: trimmed, lower-cased, inner whitespace collapsed
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Mapping from normalized header label to canonical field
#[derive(Debug, Clone)]
pub struct AliasTable {
    lookup: HashMap<String, CanonicalField>,
}

impl AliasTable {
    /// Build a table from `(field, labels)` entries. The canonical key of each
    /// field is always accepted; a label listed for two fields keeps the first.
    pub fn new(entries: &[(CanonicalField, &[&str])]) -> Self {
        let mut lookup = HashMap::new();
        for field in CanonicalField::ALL {
            lookup.insert(field.key().to_string(), field);
        }
        for (field, labels) in entries {
            for label in labels.iter() {
                lookup.entry(normalize_label(label)).or_insert(*field);
            }
        }
        Self { lookup }
    }

    /// Process-wide table of every label variant seen in calling sheets
    pub fn standard() -> &'static AliasTable {
        static STANDARD: OnceLock<AliasTable> = OnceLock::new();
        STANDARD.get_or_init(|| AliasTable::new(STANDARD_ALIASES))
    }

    pub fn resolve(&self, label: &str) -> Option<CanonicalField> {
        self.lookup.get(&normalize_label(label)).copied()
    }

    /// Every normalized label that resolves to `field`, sorted
    pub fn labels_for(&self, field: CanonicalField) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .lookup
            .iter()
            .filter(|(_, f)| **f == field)
            .map(|(label, _)| label.as_str())
            .collect();
        labels.sort_unstable();
        labels
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(STANDARD_ALIASES)
    }
}
