//! Built-in prompt templates for chunk summarization.

use crate::error::{MeetscribeError, Result};
use serde::{Deserialize, Serialize};

/// A summarization prompt: system framing plus per-chunk instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub system: String,
    pub user: String,
}

impl Template {
    fn new(name: &str, system: &str, user: &str) -> Self {
        Self {
            name: name.to_string(),
            system: system.to_string(),
            user: user.to_string(),
        }
    }
}

/// The templates shipped with meetscribe.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        Template::new(
            "Meeting Summary",
            "You are an AI assistant helping summarize meetings.",
            "Provide a concise summary of the key points discussed:",
        ),
        Template::new(
            "Action Items",
            "You are an AI assistant tracking action items.",
            "List all action items and assignments mentioned:",
        ),
        Template::new(
            "Decision Tracking",
            "You are an AI assistant tracking decisions.",
            "List all decisions made during this discussion:",
        ),
    ]
}

/// Looks up a built-in template by name (case-insensitive).
pub fn find_template(name: &str) -> Result<Template> {
    builtin_templates()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| MeetscribeError::UnknownTemplate {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_present() {
        let names: Vec<_> = builtin_templates().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["Meeting Summary", "Action Items", "Decision Tracking"]
        );
    }

    #[test]
    fn test_find_template_case_insensitive() {
        let template = find_template("meeting summary").unwrap();
        assert_eq!(template.name, "Meeting Summary");
    }

    #[test]
    fn test_find_template_unknown() {
        let err = find_template("Standup").unwrap_err();
        assert_eq!(err.to_string(), "Unknown template 'Standup'");
    }
}
