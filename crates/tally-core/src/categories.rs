//! Cost category metadata.
//!
//! Categories come from two places: the built-in list and rows in the settings
//! table. A [`CategoryRegistry`] merges both once per request and is passed to
//! whatever needs labels or colors.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Color used for categories nobody has configured.
pub const FALLBACK_COLOR: &str = "#6b7280";

/// Settings group holding cost categories.
pub const COST_CATEGORY_GROUP: &str = "cost_category";

/// Label language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    Th,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "th" => Ok(Locale::Th),
            "en" => Ok(Locale::En),
            other => Err(format!("unknown locale: {}", other)),
        }
    }
}

/// Display metadata of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub value: String,
    pub label: String,
    pub label_th: String,
    pub color: String,
}

impl CategoryInfo {
    fn new(value: &str, label: &str, label_th: &str, color: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            label_th: label_th.to_string(),
            color: color.to_string(),
        }
    }

    pub fn label_for(&self, locale: Locale) -> &str {
        match locale {
            Locale::Th => &self.label_th,
            Locale::En => &self.label,
        }
    }
}

/// A row of the settings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySetting {
    /// Settings group, e.g. `cost_category`.
    #[serde(default = "default_group")]
    pub category: String,
    pub value: String,
    #[serde(default)]
    pub label_th: String,
    #[serde(default)]
    pub label_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_group() -> String {
    COST_CATEGORY_GROUP.to_string()
}

fn default_active() -> bool {
    true
}

/// Resolved category metadata.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    entries: Vec<CategoryInfo>,
}

impl CategoryRegistry {
    /// Built-in cost categories.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                CategoryInfo::new("staff", "Staff", "ค่าสตาฟ", "#ef4444"),
                CategoryInfo::new("travel", "Travel", "ค่าเดินทาง", "#f97316"),
                CategoryInfo::new("equipment", "Equipment", "อุปกรณ์ออกอีเวนต์", "#eab308"),
                CategoryInfo::new("food", "Food & Beverage", "อาหารและเครื่องดื่ม", "#22c55e"),
                CategoryInfo::new("venue", "Venue", "ค่าสถานที่", "#3b82f6"),
                CategoryInfo::new("marketing", "Marketing", "การตลาด / โฆษณา", "#8b5cf6"),
                CategoryInfo::new("other", "Other", "อื่นๆ", FALLBACK_COLOR),
            ],
        }
    }

    /// Built-ins overlaid with active settings rows of the cost category group.
    ///
    /// A row whose value matches a built-in replaces the non-empty fields of
    /// that entry; other rows are appended in `sort_order`.
    pub fn with_settings(settings: &[CategorySetting]) -> Self {
        let mut registry = Self::builtin();

        let mut rows: Vec<&CategorySetting> = settings
            .iter()
            .filter(|s| s.is_active && s.category == COST_CATEGORY_GROUP)
            .collect();
        rows.sort_by_key(|s| s.sort_order);

        for row in rows {
            match registry.entries.iter_mut().find(|e| e.value == row.value) {
                Some(entry) => {
                    if !row.label_en.is_empty() {
                        entry.label = row.label_en.clone();
                    }
                    if !row.label_th.is_empty() {
                        entry.label_th = row.label_th.clone();
                    }
                    if let Some(color) = &row.color {
                        entry.color = color.clone();
                    }
                }
                None => registry.entries.push(CategoryInfo {
                    value: row.value.clone(),
                    label: non_empty_or(&row.label_en, &row.value),
                    label_th: non_empty_or(&row.label_th, &row.value),
                    color: row.color.clone().unwrap_or_else(|| FALLBACK_COLOR.to_string()),
                }),
            }
        }

        registry
    }

    pub fn get(&self, value: &str) -> Option<&CategoryInfo> {
        self.entries.iter().find(|e| e.value == value)
    }

    /// Label for a category; unknown keys are shown as-is.
    pub fn label<'a>(&'a self, value: &'a str, locale: Locale) -> &'a str {
        self.get(value).map(|e| e.label_for(locale)).unwrap_or(value)
    }

    /// Hex color for a category.
    pub fn color(&self, value: &str) -> &str {
        self.get(value).map(|e| e.color.as_str()).unwrap_or(FALLBACK_COLOR)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryInfo> {
        self.entries.iter()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn non_empty_or(s: &str, fallback: &str) -> String {
    let chosen = if s.is_empty() { fallback } else { s };
    chosen.to_string()
}
