//! Static prompt-injection blocklist.
//!
//! An ordered list of detection rules, each tagged with a category. Fixed
//! phrases are compiled into a single Aho-Corasick automaton per rule;
//! phrasings with gaps or structure use a regex. Everything is built once at
//! startup and shared process-wide; nothing is recompiled per request.
//!
//! This is defense-in-depth by exclusion, not a classifier. Creative
//! bypasses are expected; the goal is to raise the cost of the common
//! injection idioms.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::is_domain_word;

/// Category of injection idiom a rule detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    InstructionOverride,
    RoleSwitch,
    PromptExtraction,
    DelimiterExploit,
    CodeExecution,
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InstructionOverride => "instruction-override",
            Self::RoleSwitch => "role-switch",
            Self::PromptExtraction => "prompt-extraction",
            Self::DelimiterExploit => "delimiter-exploit",
            Self::CodeExecution => "code-execution",
        };
        f.write_str(s)
    }
}

enum Matcher {
    /// Fixed substrings, matched ASCII case-insensitively.
    Phrases(AhoCorasick),
    /// Structural or gapped pattern.
    Pattern(Regex),
}

/// One entry in the ordered blocklist.
pub struct InjectionRule {
    category: RuleCategory,
    matcher: Matcher,
    /// Role-switch rules consult the domain carve-out: a match immediately
    /// followed by a domain role ("act as a baker") does not fire.
    carveout: bool,
}

impl InjectionRule {
    fn phrases(category: RuleCategory, carveout: bool, phrases: &[&str]) -> Self {
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(phrases)
            .expect("injection phrase set must compile");
        Self {
            category,
            matcher: Matcher::Phrases(automaton),
            carveout,
        }
    }

    fn pattern(category: RuleCategory, pattern: &str) -> Self {
        Self {
            category,
            matcher: Matcher::Pattern(Regex::new(pattern).expect("injection regex must compile")),
            carveout: false,
        }
    }

    /// True if the rule fires anywhere in `text`.
    ///
    /// For carve-out rules every occurrence is checked: a single match
    /// without a trailing domain role is enough to fire.
    fn fires(&self, text: &str) -> bool {
        let ends: Vec<usize> = match &self.matcher {
            Matcher::Phrases(ac) => ac.find_iter(text).map(|m| m.end()).collect(),
            Matcher::Pattern(re) => re.find_iter(text).map(|m| m.end()).collect(),
        };
        if !self.carveout {
            return !ends.is_empty();
        }
        ends.into_iter().any(|end| !domain_role_follows(&text[end..]))
    }
}

/// The process-wide blocklist, in category order. First match wins.
static RULES: Lazy<Vec<InjectionRule>> = Lazy::new(|| {
    vec![
        // instruction-override: "ignore/disregard/forget/override/bypass
        // ... previous/prior/system ... instructions/prompt/rules/guidelines"
        InjectionRule::pattern(
            RuleCategory::InstructionOverride,
            r"(?i)\b(ignore|disregard|forget|override|bypass)\b[^\n]{0,40}\b(previous|prior|above|all|system)\b[^\n]{0,40}\b(instructions?|prompts?|rules?|guidelines?)\b",
        ),
        InjectionRule::phrases(
            RuleCategory::InstructionOverride,
            false,
            &["new instructions", "updated instructions", "fresh instructions"],
        ),
        // A line that opens with "instructions:" is an injected directive,
        // not a question.
        InjectionRule::pattern(RuleCategory::InstructionOverride, r"(?im)^\s*instructions\s*:"),
        // role-switch, with the domain carve-out ("act as a baker" is fine)
        InjectionRule::phrases(
            RuleCategory::RoleSwitch,
            true,
            &[
                "you are now",
                "pretend you are",
                "pretend to be",
                "roleplay as",
                "role-play as",
                "act as",
            ],
        ),
        InjectionRule::pattern(
            RuleCategory::RoleSwitch,
            r"(?i)\bswitch to\b[^\n]{0,30}\b(mode|persona|character)\b",
        ),
        // prompt-extraction
        InjectionRule::pattern(
            RuleCategory::PromptExtraction,
            r"(?i)\b(show|reveal|repeat|display|print|share)\b[^\n]{0,30}\byour\b[^\n]{0,30}\b(prompt|instructions|guidelines|rules)\b",
        ),
        InjectionRule::pattern(
            RuleCategory::PromptExtraction,
            r"(?i)\b(what\s+are|tell\s+me)\b[^\n]{0,20}\byour\b[^\n]{0,30}\b(prompt|instructions|guidelines|rules)\b",
        ),
        // delimiter-exploit: fenced blocks and chat-protocol tokens
        InjectionRule::pattern(RuleCategory::DelimiterExploit, r"(?i)```\s*(system|assistant)"),
        InjectionRule::pattern(RuleCategory::DelimiterExploit, r"<\|[a-zA-Z_]+\|>"),
        InjectionRule::pattern(RuleCategory::DelimiterExploit, r"(?i)\[\[\s*/?inst"),
        InjectionRule::pattern(RuleCategory::DelimiterExploit, r"(?i)<<\s*/?sys"),
        // code-execution
        InjectionRule::pattern(
            RuleCategory::CodeExecution,
            r"(?i)\b(execute|run)\b[^\n]{0,20}\b(code|command|commands|script|shell)\b",
        ),
        InjectionRule::phrases(
            RuleCategory::CodeExecution,
            false,
            &["import os", "os.system", "subprocess", "eval(", "exec(", "rm -rf"],
        ),
    ]
});

/// Test `text` against the blocklist in order; return the category of the
/// first rule that fires, or `None` if the text is clean.
pub fn find_blocked(text: &str) -> Option<RuleCategory> {
    RULES.iter().find(|rule| rule.fires(text)).map(|r| r.category)
}

/// Filler words skipped between a role-switch phrase and the role itself.
const ROLE_FILLER: &[&str] = &[
    "a",
    "an",
    "the",
    "my",
    "your",
    "our",
    "professional",
    "master",
    "home",
    "artisan",
    "experienced",
    "skilled",
    "friendly",
    "expert",
];

/// True when the text after a role-switch match leads with a domain role,
/// e.g. " a baker" or " an experienced pastry chef".
fn domain_role_follows(rest: &str) -> bool {
    rest.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .find(|w| !ROLE_FILLER.contains(&w.as_str()))
        .is_some_and(|w| is_domain_word(&w))
}
