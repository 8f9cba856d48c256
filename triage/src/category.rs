//! Ticket categories
//!
//! The fixed label set shared by both classifier providers. Classifier
//! output is joined to labels purely by position in the configured
//! ordering, never by name.

use serde::{Deserialize, Serialize};

/// One of the eight service-desk categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Access,
    #[serde(rename = "Administrative rights")]
    AdministrativeRights,
    Hardware,
    #[serde(rename = "HR Support")]
    HrSupport,
    #[serde(rename = "Internal Project")]
    InternalProject,
    Miscellaneous,
    Purchase,
    Storage,
}

impl Category {
    /// Every category, in the order the classifiers were trained with.
    pub const ALL: [Category; 8] = [
        Category::Access,
        Category::AdministrativeRights,
        Category::Hardware,
        Category::HrSupport,
        Category::InternalProject,
        Category::Miscellaneous,
        Category::Purchase,
        Category::Storage,
    ];

    /// Display label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Access => "Access",
            Self::AdministrativeRights => "Administrative rights",
            Self::Hardware => "Hardware",
            Self::HrSupport => "HR Support",
            Self::InternalProject => "Internal Project",
            Self::Miscellaneous => "Miscellaneous",
            Self::Purchase => "Purchase",
            Self::Storage => "Storage",
        }
    }

    /// Default first-line suggestion shown to the submitter.
    pub fn default_suggestion(&self) -> &'static str {
        match self {
            Self::Access => "If you can't access a system or application: check your credentials, reset your password, or contact IT support.",
            Self::AdministrativeRights => "Need admin rights? Submit a request through the IT Security portal with a business justification.",
            Self::Hardware => "Hardware issues? Restart the device, check power and connections, or submit a ticket for repair.",
            Self::HrSupport => "HR-related issues? Contact Human Resources directly or create a ticket for escalation.",
            Self::InternalProject => "Project management queries? Contact your project manager or tech lead.",
            Self::Miscellaneous => "For other issues: describe your problem in detail so we can assist properly.",
            Self::Purchase => "To purchase IT equipment: fill out the purchase request form and send it to the procurement team.",
            Self::Storage => "Running out of storage? Clear temp files, archive old data, or request additional storage.",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a label does not name a category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl std::str::FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive; accepts the display label or a snake_case form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['_', '-'], " ");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label().to_lowercase() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_has_eight_distinct_labels() {
        let mut labels: Vec<_> = Category::ALL.iter().map(|c| c.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 8);
    }

    #[test]
    fn test_default_order_matches_training_labels() {
        assert_eq!(Category::ALL[2], Category::Hardware);
        assert_eq!(Category::ALL[5], Category::Miscellaneous);
        assert_eq!(Category::ALL[7], Category::Storage);
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!("hr support".parse::<Category>().unwrap(), Category::HrSupport);
        assert_eq!(
            "administrative_rights".parse::<Category>().unwrap(),
            Category::AdministrativeRights
        );
        assert_eq!(" Storage ".parse::<Category>().unwrap(), Category::Storage);
        assert!("printer".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_uses_display_label() {
        let json = serde_json::to_string(&Category::InternalProject).unwrap();
        assert_eq!(json, "\"Internal Project\"");
        let back: Category = serde_json::from_str("\"HR Support\"").unwrap();
        assert_eq!(back, Category::HrSupport);
    }
}
