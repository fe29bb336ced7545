use serde::{Deserialize, Serialize};
use std::fmt;

/// Brand constraints the translator must respect when writing copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandConfig {
    pub name: String,
    pub logo_url: String,
    pub colors: BrandColors,
    pub font: String,
    pub tone: Tone,

    /// Words the copy must never use
    pub forbidden: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandColors {
    pub primary: String,
    pub accent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Friendly,
    #[default]
    Professional,
    Bold,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
            Tone::Bold => "bold",
        })
    }
}

impl Default for BrandColors {
    fn default() -> Self {
        Self {
            primary: "#3b82f6".to_string(),
            accent: "#10b981".to_string(),
        }
    }
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "BeautyLab".to_string(),
            logo_url: String::new(),
            colors: BrandColors::default(),
            font: "Inter".to_string(),
            tone: Tone::Professional,
            forbidden: vec![
                "absolutely".to_string(),
                "guaranteed".to_string(),
                "instant results".to_string(),
            ],
        }
    }
}

impl BrandConfig {
    /// Forbidden words that occur in `text`, compared case-insensitively
    pub fn forbidden_in<'a>(&'a self, text: &str) -> Vec<&'a str> {
        let lowered = text.to_lowercase();
        self.forbidden
            .iter()
            .filter(|word| !word.is_empty() && lowered.contains(&word.to_lowercase()))
            .map(String::as_str)
            .collect()
    }
}
