//! # Page Layout
//!
//! The document being edited. Field names follow the JSON shape consumed by
//! the page renderer and the publish backends (`camelCase`, optional sections
//! omitted rather than `null`).
//!
//! ```text
//! PageLayout
//! ├── hero      headline / subhead / cta (+ colour, images)
//! ├── usps      ordered selling points
//! ├── science?  pain / cause / tips / refs
//! ├── specs?    key-value rows
//! ├── faq?      question / answer pairs
//! └── offer?    badge / expiry
//! ```
//!
//! Unknown fields are rejected so that a patch writing to a misspelled path
//! fails the schema check instead of silently growing the document.

use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageLayout {
    pub hero: Hero,

    /// Display order is significant.
    pub usps: Vec<Usp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub science: Option<Science>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<Vec<SpecEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq: Option<Vec<FaqItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<Offer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Hero {
    pub headline: String,
    pub subhead: String,
    pub cta: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<HeroImage>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HeroImage {
    pub url: String,
    pub original_url: String,
    pub alt: String,
}

/// Unique selling point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Usp {
    /// Short glyph, usually a single emoji
    pub icon: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaqItem {
    pub q: String,
    pub a: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecEntry {
    pub k: String,
    pub v: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Science {
    pub pain: String,
    pub cause: String,
    pub tips: Vec<Tip>,
    pub refs: Vec<Reference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tip {
    pub tip: String,
    pub why: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    pub title: String,
    pub url: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Offer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl PageLayout {
    /// Check a JSON document against the schema and return the typed layout.
    ///
    /// This is the gate every mutation goes through: after a patch batch is
    /// applied, after a manual edit, and when a layout is loaded from disk.
    pub fn from_value(value: Value) -> SchemaResult<Self> {
        let layout: PageLayout = serde_json::from_value(value)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Parse and validate a JSON string
    pub fn from_json(source: &str) -> SchemaResult<Self> {
        let layout: PageLayout = serde_json::from_str(source)?;
        layout.validate()?;
        Ok(layout)
    }

    /// JSON form used by the patch engine
    pub fn to_value(&self) -> SchemaResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Pretty JSON for files and prompts
    pub fn to_json_pretty(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Constraints serde cannot express
    pub fn validate(&self) -> SchemaResult<()> {
        if let Some(color) = &self.hero.cta_color {
            if !is_css_color(color) {
                return Err(SchemaError::invalid_color("hero.ctaColor", color));
            }
        }
        Ok(())
    }

    /// Starter page used when no scraped layout is available
    pub fn default_template() -> Self {
        Self {
            hero: Hero {
                headline: "Reinvent your skincare routine".to_string(),
                subhead: "A research-backed formula for professional results at home".to_string(),
                cta: "Try it now".to_string(),
                cta_color: None,
                image: Some(
                    "https://images.unsplash.com/photo-1556228578-0d85b1a4d571?w=800".to_string(),
                ),
                images: None,
            },
            usps: vec![
                Usp {
                    icon: "✨".to_string(),
                    text: "Visible results in 7 days".to_string(),
                },
                Usp {
                    icon: "🧪".to_string(),
                    text: "Lab-tested, gentle formula".to_string(),
                },
                Usp {
                    icon: "🏆".to_string(),
                    text: "Trusted by 100,000+ customers".to_string(),
                },
            ],
            science: None,
            specs: None,
            faq: Some(vec![FaqItem {
                q: "Is it suitable for sensitive skin?".to_string(),
                a: "Yes. The formula is tested on sensitive skin and suits every skin type."
                    .to_string(),
            }]),
            offer: None,
        }
    }

    /// Title shown in page listings
    pub fn title(&self) -> &str {
        &self.hero.headline
    }
}

/// `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, or a bare colour keyword.
fn is_css_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_template_round_trips() {
        let layout = PageLayout::default_template();
        let value = layout.to_value().unwrap();
        let back = PageLayout::from_value(value.clone()).unwrap();

        assert_eq!(back, layout);
        assert_eq!(back.to_value().unwrap(), value);
    }

    #[test]
    fn test_optional_sections_are_omitted() {
        let value = PageLayout::default_template().to_value().unwrap();
        let obj = value.as_object().unwrap();

        assert!(obj.contains_key("faq"));
        assert!(!obj.contains_key("science"));
        assert!(!obj.contains_key("offer"));
        assert!(!value["hero"].as_object().unwrap().contains_key("ctaColor"));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let value = json!({
            "hero": { "headline": "A", "subhead": "B" },
            "usps": []
        });

        let err = PageLayout::from_value(value).unwrap_err();
        assert!(matches!(err, SchemaError::Shape(_)));
        assert!(err.to_string().contains("cta"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let value = json!({
            "hero": { "headline": "A", "subhead": "B", "cta": "C", "tagline": "D" },
            "usps": []
        });

        assert!(PageLayout::from_value(value).is_err());
    }

    #[test]
    fn test_camel_case_fields() {
        let value = json!({
            "hero": {
                "headline": "A",
                "subhead": "B",
                "cta": "C",
                "ctaColor": "#f97316",
                "images": [{ "url": "u", "originalUrl": "o", "alt": "a" }]
            },
            "usps": [],
            "offer": { "badge": "-20%", "expiresAt": "2026-12-31" }
        });

        let layout = PageLayout::from_value(value.clone()).unwrap();
        assert_eq!(layout.hero.cta_color.as_deref(), Some("#f97316"));
        assert_eq!(layout.hero.images.as_ref().unwrap()[0].original_url, "o");
        assert_eq!(layout.offer.as_ref().unwrap().expires_at.as_deref(), Some("2026-12-31"));
        assert_eq!(layout.to_value().unwrap(), value);
    }

    #[test]
    fn test_cta_color_validation() {
        assert!(is_css_color("#fff"));
        assert!(is_css_color("#3b82f6"));
        assert!(is_css_color("orange"));
        assert!(!is_css_color("#12"));
        assert!(!is_css_color("url(javascript:alert(1))"));
        assert!(!is_css_color(""));

        let value = json!({
            "hero": { "headline": "A", "subhead": "B", "cta": "C", "ctaColor": "red;" },
            "usps": []
        });
        let err = PageLayout::from_value(value).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidColor { field: "hero.ctaColor", .. }));
    }

    #[test]
    fn test_science_section() {
        let value = json!({
            "hero": { "headline": "A", "subhead": "B", "cta": "C" },
            "usps": [{ "icon": "✨", "text": "x" }],
            "science": {
                "pain": "Dry skin",
                "cause": "Barrier damage",
                "tips": [{ "tip": "Moisturise", "why": "Restores lipids" }],
                "refs": [{ "title": "Study", "url": "https://example.org", "year": 2021 }]
            }
        });

        let layout = PageLayout::from_value(value).unwrap();
        let science = layout.science.unwrap();
        assert_eq!(science.refs[0].year, 2021);
        assert!(science.disclaimer.is_none());
    }
}
