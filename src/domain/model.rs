use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Placeholder stored when a menu cell has no text.
pub const NO_MENU: &str = "메뉴 없음";

fn day_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d{4}\.\d{2}\.\d{2}").expect("static date pattern"))
}

/// A date label exactly as the source page prints it, e.g. `2024.03.18(월)`.
///
/// Only labels containing a `YYYY.MM.DD` day are accepted, which is what makes
/// plain string ordering chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuDate(String);

impl MenuDate {
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if day_pattern().is_match(label) {
            Some(Self(label.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `YYYY.MM.DD` part of the label.
    pub fn day(&self) -> &str {
        day_pattern()
            .find(&self.0)
            .map(|m| m.as_str())
            .unwrap_or(self.0.as_str())
    }

    /// Saturday and Sunday columns carry `(토)` / `(일)` markers.
    pub fn is_weekend(&self) -> bool {
        self.0.contains("(토)") || self.0.contains("(일)")
    }
}

impl fmt::Display for MenuDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true when `value` is a bare `YYYY.MM.DD` day.
pub fn is_day_key(value: &str) -> bool {
    value.len() == 10 && day_pattern().is_match(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Other(String),
}

impl MealType {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "조식" => MealType::Breakfast,
            "중식" => MealType::Lunch,
            "석식" => MealType::Dinner,
            other => MealType::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MealType::Breakfast => "조식",
            MealType::Lunch => "중식",
            MealType::Dinner => "석식",
            MealType::Other(label) => label.as_str(),
        }
    }

    /// Serving order within a day; unknown labels sort last.
    pub fn rank(&self) -> u8 {
        match self {
            MealType::Breakfast => 1,
            MealType::Lunch => 2,
            MealType::Dinner => 3,
            MealType::Other(_) => 4,
        }
    }
}

impl From<String> for MealType {
    fn from(label: String) -> Self {
        MealType::from_label(&label)
    }
}

impl From<MealType> for String {
    fn from(meal: MealType) -> Self {
        meal.label().to_string()
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub date: MenuDate,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    #[serde(rename = "menu")]
    pub menu_text: String,
}

impl MenuEntry {
    /// Builds an entry, substituting [`NO_MENU`] for blank text.
    pub fn new(date: MenuDate, meal_type: MealType, menu_text: impl Into<String>) -> Self {
        let menu_text = menu_text.into();
        let menu_text = if menu_text.trim().is_empty() {
            NO_MENU.to_string()
        } else {
            menu_text
        };
        Self {
            date,
            meal_type,
            menu_text,
        }
    }

    /// Date first, then meal rank.
    pub fn schedule_order(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.meal_type.rank().cmp(&other.meal_type.rank()))
    }
}

/// A persisted menu row, serialized as `{id, date, type, menu}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMenu {
    pub id: i64,
    pub date: String,
    #[serde(rename = "type")]
    pub meal_type: String,
    #[serde(rename = "menu")]
    pub menu_text: String,
}
