//! Offline keyword translator.
//!
//! A fixed, ordered rule table over the lower-cased instruction. Each rule
//! looks for keyword groups (English and Chinese) and contributes at most one
//! operation, so the same instruction against the same page always yields the
//! same batch in the same order.

use crate::{TranslateResult, TranslationOutcome, TranslationRequest, Translator};
use async_trait::async_trait;
use pagesmith_schema::{PageLayout, PatchOperation};
use serde_json::json;
use tracing::debug;

type Rule = fn(&str, &PageLayout) -> Option<PatchOperation>;

const RULES: &[Rule] = &[headline_rule, subhead_rule, cta_rule, usp_rule, faq_rule];

const HEADLINE: &[&str] = &["headline", "title", "标题"];
const SUBHEAD: &[&str] = &["subtitle", "subhead", "description", "副标题", "描述"];
const CHANGE: &[&str] = &[
    "change", "update", "rewrite", "improve", "edit", "make", "改", "修改", "更新",
];
const BUTTON: &[&str] = &["button", "cta", "按钮"];
const BUY: &[&str] = &["buy", "purchase", "购买"];
const SELLING_POINT: &[&str] = &["selling point", "usp", "feature", "卖点", "优势"];
const ECO: &[&str] = &["eco", "green", "sustainab", "环保", "绿色"];
const TECH: &[&str] = &["tech", "smart", "科技", "智能"];
const FAQ: &[&str] = &["faq", "question", "问题"];

/// Rule table translator, used when no model credential is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedTranslator;

impl RuleBasedTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Run every rule in table order
    pub fn generate(&self, instruction: &str, layout: &PageLayout) -> Vec<PatchOperation> {
        let text = instruction.to_lowercase();
        RULES.iter().filter_map(|rule| rule(&text, layout)).collect()
    }
}

#[async_trait]
impl Translator for RuleBasedTranslator {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationOutcome> {
        let patches = self.generate(&request.instruction, &request.layout);
        debug!(matched = patches.len(), "Rule-based translation");
        Ok(TranslationOutcome::from_patches(patches))
    }
}

fn mentions(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

fn headline_rule(text: &str, _layout: &PageLayout) -> Option<PatchOperation> {
    // "subtitle" / "副标题" contain the headline keywords
    let text = text.replace("subtitle", "").replace("副标题", "");
    (mentions(&text, HEADLINE) && mentions(&text, CHANGE)).then(|| {
        PatchOperation::replace(
            "/hero/headline",
            json!("🌟 Breakthrough skincare: a visible glow in 7 days"),
        )
    })
}

fn subhead_rule(text: &str, _layout: &PageLayout) -> Option<PatchOperation> {
    mentions(text, SUBHEAD).then(|| {
        PatchOperation::replace(
            "/hero/subhead",
            json!("Personalised, research-backed care that adapts to your skin"),
        )
    })
}

fn cta_rule(text: &str, _layout: &PageLayout) -> Option<PatchOperation> {
    (mentions(text, BUTTON) && mentions(text, BUY))
        .then(|| PatchOperation::replace("/hero/cta", json!("Buy now")))
}

fn usp_rule(text: &str, _layout: &PageLayout) -> Option<PatchOperation> {
    if !mentions(text, SELLING_POINT) {
        return None;
    }
    let usp = if mentions(text, ECO) {
        json!({ "icon": "🌱", "text": "100% eco-friendly, sustainable packaging" })
    } else if mentions(text, TECH) {
        json!({ "icon": "🤖", "text": "AI-tailored formula for your skin type" })
    } else {
        return None;
    };
    Some(PatchOperation::add("/usps/-", usp))
}

fn faq_rule(text: &str, layout: &PageLayout) -> Option<PatchOperation> {
    if !mentions(text, FAQ) {
        return None;
    }
    let item = json!({
        "q": "What makes this product different?",
        "a": "An advanced, research-backed formula, rigorously tested for safety and results."
    });
    // `/faq/-` needs an existing array
    Some(match layout.faq {
        Some(_) => PatchOperation::add("/faq/-", item),
        None => PatchOperation::add("/faq", json!([item])),
    })
}
