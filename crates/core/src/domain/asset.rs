use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Intake payload describing the item a seller wants valued. Labels are kept
/// verbatim as submitted; typed views are derived on demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub category: String,
    pub brand: String,
    pub model: String,
    pub condition: String,
    pub description: Option<String>,
    pub user_estimated_value: Option<Decimal>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Watches,
    Jewelry,
    Handbags,
    Electronics,
    Instruments,
    Cameras,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    New,
    Excellent,
    VeryGood,
    Good,
    Fair,
}

impl Category {
    /// Maps a submitted category label to its typed form. Returns `None` for
    /// labels outside the known catalog; those assets follow the generic path.
    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        [
            Self::Watches,
            Self::Jewelry,
            Self::Handbags,
            Self::Electronics,
            Self::Instruments,
            Self::Cameras,
            Self::Other,
        ]
        .into_iter()
        .find(|category| trimmed.eq_ignore_ascii_case(category.label()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Watches => "Luxury Watches",
            Self::Jewelry => "Fine Jewelry",
            Self::Handbags => "Designer Handbags",
            Self::Electronics => "Premium Electronics",
            Self::Instruments => "Musical Instruments",
            Self::Cameras => "Photography Equipment",
            Self::Other => "Other",
        }
    }
}

impl Condition {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "excellent" => Some(Self::Excellent),
            "very-good" => Some(Self::VeryGood),
            "good" => Some(Self::Good),
            "fair" => Some(Self::Fair),
            _ => None,
        }
    }

    pub fn factor(&self) -> Decimal {
        match self {
            Self::New => Decimal::new(100, 2),
            Self::Excellent => Decimal::new(90, 2),
            Self::VeryGood => Decimal::new(80, 2),
            Self::Good => Decimal::new(70, 2),
            Self::Fair => Decimal::new(60, 2),
        }
    }

    /// Factor for an arbitrary condition label. Unrecognized labels price
    /// conservatively at the `good` tier.
    pub fn adjustment_factor(label: &str) -> Decimal {
        Self::from_label(label).map(|condition| condition.factor()).unwrap_or(Decimal::new(70, 2))
    }
}

impl AssetDescriptor {
    pub fn category_kind(&self) -> Option<Category> {
        Category::from_label(&self.category)
    }

    pub fn condition_kind(&self) -> Option<Condition> {
        Condition::from_label(&self.condition)
    }

    pub fn condition_factor(&self) -> Decimal {
        Condition::adjustment_factor(&self.condition)
    }
}
