//! System prompts, per-kind user templates, and A/B variant selection.
//!
//! Variant choice is an injected strategy so tests can pin the outcome; the
//! chosen label travels with the cache entry and feedback rows for offline
//! comparison.

use rand::Rng;

/// A labelled system-prompt configuration for the ask flow.
#[derive(Debug, Clone, Copy)]
pub struct PromptVariant {
    pub label: &'static str,
    pub system: &'static str,
}

/// System-prompt variants for free-form questions.
pub const ASK_VARIANTS: &[PromptVariant] = &[
    PromptVariant {
        label: "classic",
        system: "You are a friendly and knowledgeable bread expert. You answer questions about:\n\
                 - Different types of bread (sourdough, rye, baguettes, etc.)\n\
                 - Baking techniques and tips\n\
                 - Bread recipes and ingredients\n\
                 - The history and culture of bread around the world\n\
                 - Gluten-free and dietary alternatives\n\n\
                 Keep your answers concise, helpful, and focused on bread-related topics. \
                 If asked about something unrelated to bread, politely redirect the \
                 conversation back to bread.",
    },
    PromptVariant {
        label: "concise",
        system: "You are a bread expert. Answer bread and baking questions in 2-4 short \
                 sentences, leading with the single most useful fact. If the question is \
                 unrelated to bread, politely redirect the conversation back to bread.",
    },
];

/// Output-token budgets per flow.
pub const ASK_MAX_TOKENS: u32 = 500;
pub const RECIPE_MAX_TOKENS: u32 = 1500;
pub const GUIDE_MAX_TOKENS: u32 = 1000;

/// User prompt demanding a structured recipe for `bread_name`.
pub fn recipe_prompt(bread_name: &str) -> String {
    format!(
        r#"Generate a complete bread recipe for {bread_name}.

Return ONLY valid JSON in this exact format (no markdown, no code blocks):
{{
    "name": "{bread_name}",
    "description": "A brief 1-sentence description of this bread",
    "prep_time": "X min",
    "ferment_time": "X hrs" or "N/A" if no fermentation,
    "bake_time": "X min",
    "difficulty": "Easy" or "Medium" or "Hard",
    "ingredients": [
        {{"amount": "500g", "item": "bread flour"}},
        {{"amount": "10g", "item": "salt"}}
    ],
    "instructions": [
        "Step 1 description",
        "Step 2 description"
    ],
    "tips": "A helpful baker's tip for this specific bread"
}}

Be accurate with traditional recipes. Include 6-10 ingredients and 6-10 clear steps."#
    )
}

/// User prompt demanding a structured technique guide for `topic`.
pub fn technique_prompt(topic: &str) -> String {
    format!(
        r#"Explain the bread-baking technique: {topic}.

Return ONLY valid JSON in this exact format (no markdown, no code blocks):
{{
    "topic": "{topic}",
    "summary": "A 1-2 sentence overview of the technique",
    "steps": ["Step 1", "Step 2"],
    "common_mistakes": ["Mistake 1", "Mistake 2"],
    "pro_tip": "One tip a professional baker would give"
}}

Include 4-8 steps and 2-4 common mistakes."#
    )
}

/// User prompt demanding a structured diagnosis for `problem`.
pub fn troubleshoot_prompt(problem: &str) -> String {
    format!(
        r#"Diagnose this bread-baking problem: {problem}.

Return ONLY valid JSON in this exact format (no markdown, no code blocks):
{{
    "problem": "{problem}",
    "likely_causes": ["Cause 1", "Cause 2"],
    "fixes": ["Fix 1", "Fix 2"],
    "prevention": "How to avoid this next time"
}}

Order likely_causes from most to least probable. Include 2-4 causes and fixes."#
    )
}

/// Strategy for choosing among `n` prompt variants.
pub trait VariantPicker: Send + Sync {
    /// Return an index in `0..n`. `n` is always at least 1.
    fn pick(&self, n: usize) -> usize;
}

/// Uniform random selection for production A/B traffic.
#[derive(Debug, Default)]
pub struct RandomPicker;

impl VariantPicker for RandomPicker {
    fn pick(&self, n: usize) -> usize {
        if n <= 1 {
            0
        } else {
            rand::thread_rng().gen_range(0..n)
        }
    }
}

/// Pinned selection for tests.
#[derive(Debug)]
pub struct FixedPicker(pub usize);

impl VariantPicker for FixedPicker {
    fn pick(&self, n: usize) -> usize {
        self.0.min(n.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_labels_unique() {
        let mut labels: Vec<_> = ASK_VARIANTS.iter().map(|v| v.label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), ASK_VARIANTS.len());
    }

    #[test]
    fn test_random_picker_in_range() {
        let picker = RandomPicker;
        for _ in 0..100 {
            assert!(picker.pick(ASK_VARIANTS.len()) < ASK_VARIANTS.len());
        }
        assert_eq!(picker.pick(1), 0);
    }

    #[test]
    fn test_fixed_picker_pins_and_clamps() {
        assert_eq!(FixedPicker(1).pick(2), 1);
        assert_eq!(FixedPicker(9).pick(2), 1);
        assert_eq!(FixedPicker(0).pick(1), 0);
    }

    #[test]
    fn test_recipe_prompt_mentions_bread_name() {
        let prompt = recipe_prompt("Ciabatta");
        assert!(prompt.contains("Ciabatta"));
        assert!(prompt.contains("ONLY valid JSON"));
    }
}
