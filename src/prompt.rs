use std::str::FromStr;

use crate::error::{Result, TabError};
use crate::language::TargetLanguage;

/// How much output the prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// One best translation
    Single,
    /// All gender-variant alternatives
    GenderVariants,
}

/// A prompt template bound to a target language. The format string carries
/// exactly one `{sentence}` substitution slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub style: PromptStyle,
    pub language: TargetLanguage,
}

impl PromptTemplate {
    pub fn format_string(&self) -> String {
        match self.style {
            PromptStyle::Single => format!(
                "Can you translate the following sentence into {}: {{sentence}}",
                self.language.name()
            ),
            PromptStyle::GenderVariants => format!(
                "Can you translate the following sentences into {} providing all \
                 the possible alternatives in terms of gender: {{sentence}}",
                self.language.name()
            ),
        }
    }

    /// Substitute the sentence into the template's single slot.
    pub fn render(&self, sentence: &str) -> String {
        self.format_string().replace("{sentence}", sentence)
    }
}

impl FromStr for PromptTemplate {
    type Err = TabError;

    /// Parse a template id such as `prompt1_NL` or `prompt2_ES`.
    fn from_str(id: &str) -> Result<Self> {
        let style = if let Some(rest) = id.strip_prefix("prompt1_") {
            Some((PromptStyle::Single, rest))
        } else {
            id.strip_prefix("prompt2_")
                .map(|rest| (PromptStyle::GenderVariants, rest))
        };

        let (style, lang) = style.ok_or_else(|| TabError::UnsupportedTemplate(id.to_string()))?;
        let language = lang
            .parse::<TargetLanguage>()
            .map_err(|_| TabError::UnsupportedTemplate(id.to_string()))?;

        Ok(Self { style, language })
    }
}
