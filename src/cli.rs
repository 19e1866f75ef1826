use clap::Parser;
use std::path::PathBuf;

/// Translate the `source_sentences` column of a TSV dataset with an LLM
/// backend (local open-weight engine or commercial chat API).
#[derive(Parser, Debug)]
#[command(name = "translate-llm", version, about, long_about = None)]
pub struct LlmArgs {
    /// Input TSV dataset with a `source_sentences` column
    #[arg(long)]
    pub dataset_file: PathBuf,

    /// Model identifier (hub path for open-weight, family name for chat API)
    #[arg(long)]
    pub model_name_or_path: String,

    /// Output TSV path; the input plus a `translation` column
    #[arg(long)]
    pub output_file: PathBuf,

    /// Only translate the first 10 rows
    #[arg(long)]
    pub dry_run: bool,

    /// Prompt template id, e.g. prompt1_NL (raw source text when omitted)
    #[arg(long)]
    pub prompt_template: Option<String>,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.0)]
    pub temperature: f32,

    /// Maximum generated tokens per input
    #[arg(long, default_value_t = 512)]
    pub max_tokens: u32,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Translate the `source_sentences` column of a TSV dataset with a dedicated
/// machine-translation backend.
#[derive(Parser, Debug)]
#[command(name = "translate-mt", version, about, long_about = None)]
pub struct MtArgs {
    /// Input TSV dataset with a `source_sentences` column
    #[arg(long)]
    pub dataset_file: PathBuf,

    /// MT backend name: `deepl` or `google-translate`
    #[arg(long)]
    pub model_name_or_path: String,

    /// Output TSV path; the input plus a `translation` column
    #[arg(long)]
    pub output_file: PathBuf,

    /// Target language: NL, DE, EL or ES
    #[arg(long)]
    pub target_language: String,

    /// Vendor auth key (falls back to MT_AUTH_KEY or the settings file)
    #[arg(long)]
    pub auth_key: Option<String>,

    /// Only translate the first 10 rows
    #[arg(long)]
    pub dry_run: bool,

    /// Accepted for CLI parity; MT backends do not generate tokens
    #[arg(long, default_value_t = 512)]
    pub max_tokens: u32,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
