//! Glossary preprocessor
//!
//! Applies a shop's glossary rules to source text before engine dispatch.
//! Rules are applied in list order, each seeing the previous rule's output.
//! CUSTOM_TRANSLATION rules replace every literal occurrence of the term;
//! DO_NOT_TRANSLATE rules are accepted but currently leave the text
//! unchanged (the rule kind is reserved for a future masking strategy).

use regex::RegexBuilder;
use tracing::warn;

use crate::models::glossary_rule;

/// Rule kind string for terms excluded from translation
pub const RULE_DO_NOT_TRANSLATE: &str = "DO_NOT_TRANSLATE";
/// Rule kind string for forced translations
pub const RULE_CUSTOM_TRANSLATION: &str = "CUSTOM_TRANSLATION";

/// One glossary rule, detached from its database row.
///
/// The orchestrator snapshots a shop's active rules into these at job start
/// so rules edited mid-job do not affect the running matrix.
#[derive(Debug, Clone)]
pub struct GlossaryRuleData {
    pub term: String,
    pub translation: Option<String>,
    pub rule: String,
    pub case_sensitive: bool,
}

impl From<glossary_rule::Model> for GlossaryRuleData {
    fn from(model: glossary_rule::Model) -> Self {
        Self {
            term: model.term,
            translation: model.translation,
            rule: model.rule,
            case_sensitive: model.case_sensitive,
        }
    }
}

/// Apply glossary rules to `text`, returning the preprocessed result.
pub fn apply_rules(text: &str, rules: &[GlossaryRuleData]) -> String {
    let mut processed = text.to_string();

    for rule in rules {
        match rule.rule.as_str() {
            RULE_DO_NOT_TRANSLATE => {
                // No masking strategy yet; the term passes through to the
                // engine unchanged.
                continue;
            }
            RULE_CUSTOM_TRANSLATION => {
                let Some(translation) = &rule.translation else {
                    continue;
                };
                processed = replace_term(&processed, &rule.term, translation, rule.case_sensitive);
            }
            other => {
                warn!(rule = %other, term = %rule.term, "Skipping glossary rule of unknown kind");
            }
        }
    }

    processed
}

/// Replace every literal occurrence of `term` in `text` with `replacement`.
fn replace_term(text: &str, term: &str, replacement: &str, case_sensitive: bool) -> String {
    if term.is_empty() {
        return text.to_string();
    }

    let pattern = match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(pattern) => pattern,
        Err(err) => {
            warn!(term = %term, error = %err, "Failed to compile glossary term, leaving text unchanged");
            return text.to_string();
        }
    };

    pattern
        .replace_all(text, regex::NoExpand(replacement))
        .into_owned()
}
