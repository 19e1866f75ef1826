use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TabError};

/// Target languages supported by the dataset pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLanguage {
    Dutch,
    German,
    Greek,
    Spanish,
}

impl TargetLanguage {
    /// Lowercase ISO code, as taken by the web translation endpoint.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Dutch => "nl",
            Self::German => "de",
            Self::Greek => "el",
            Self::Spanish => "es",
        }
    }

    /// Uppercase code, as taken by the vendor MT API.
    pub fn vendor_code(&self) -> &'static str {
        match self {
            Self::Dutch => "NL",
            Self::German => "DE",
            Self::Greek => "EL",
            Self::Spanish => "ES",
        }
    }

    /// Full language name for prompts.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dutch => "Dutch",
            Self::German => "German",
            Self::Greek => "Greek",
            Self::Spanish => "Spanish",
        }
    }
}

impl FromStr for TargetLanguage {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NL" => Ok(Self::Dutch),
            "DE" => Ok(Self::German),
            "EL" => Ok(Self::Greek),
            "ES" => Ok(Self::Spanish),
            _ => Err(TabError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
