//! Prompt sent to the language model.
//!
//! The output contract lives here: a JSON array of RFC 6902 operations and
//! nothing else, paths pointing into the document shown, `replace` for
//! existing fields and `add` with `-` for appends.

use crate::TranslationRequest;

pub fn build_prompt(request: &TranslationRequest) -> Result<String, serde_json::Error> {
    let layout = serde_json::to_string_pretty(&request.layout)?;
    let brand = &request.brand;
    let forbidden = if brand.forbidden.is_empty() {
        "(none)".to_string()
    } else {
        brand.forbidden.join(", ")
    };

    Ok(format!(
        r#"You are the editing assistant for a product landing page. Translate the user's request into a JSON Patch (RFC 6902) against the current page document.

Current page document:
{layout}

Brand:
- name: {name}
- tone: {tone}
- never use these words: {forbidden}

Rules:
1. Return ONLY a JSON array of patch objects. No explanations, no other text.
2. Each object has "op" (add, remove, replace, move, copy or test), "path", and "value" or "from" where the operation needs one.
3. Paths are JSON Pointers into the document above, for example /hero/headline, /hero/subhead, /hero/cta, /usps/0/text.
4. Prefer "replace" for fields that already exist. To append to an array use "add" with the "-" index, for example /usps/-.
5. Keep the copy persuasive, accurate and in the brand tone.

User request: {instruction}

Example response:
[{{"op": "replace", "path": "/hero/headline", "value": "New headline"}}]"#,
        name = brand.name,
        tone = brand.tone,
        instruction = request.instruction.trim(),
    ))
}
