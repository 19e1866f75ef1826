use std::path::Path;
use tokio::fs;
use tracing::{error, info};

use crate::cli::{LlmArgs, MtArgs};
use crate::config::AppConfig;
use crate::dataset::Table;
use crate::error::{Result, TabError};
use crate::language::TargetLanguage;
use crate::postprocess::clean;
use crate::prompt::PromptTemplate;
use crate::translate::mt::is_failure_marker;
use crate::translate::{GenerationOptions, Translator, TranslatorFactory};

/// Rows kept in dry-run mode.
const DRY_RUN_ROWS: usize = 10;

/// Column the pipelines read from and the column they append.
const SOURCE_COLUMN: &str = "source_sentences";
const TRANSLATION_COLUMN: &str = "translation";

/// LLM-backed pipeline: load, template, translate, clean, persist.
pub async fn run_llm(args: &LlmArgs, config: &AppConfig) -> Result<()> {
    info!("Using prompt template: {:?}", args.prompt_template);

    let table = load_dataset(&args.dataset_file, &args.output_file, args.dry_run)?;
    let sources = table.column(SOURCE_COLUMN)?;

    let batch = match &args.prompt_template {
        Some(id) => {
            let template = id.parse::<PromptTemplate>()?;
            info!("Applying prompt template {}...", id);
            sources.iter().map(|s| template.render(s)).collect()
        }
        None => sources.clone(),
    };
    log_batch_stats(&sources, &batch);

    let mut translator = TranslatorFactory::create_llm(&args.model_name_or_path, config)
        .inspect_err(|e| error!("Failed to instantiate translator: {}", e))?;

    let opts = GenerationOptions {
        temperature: args.temperature,
        max_tokens: args.max_tokens,
    };
    let raw = run_translation(translator.as_mut(), &batch, &opts).await?;

    finalize(table, raw, &args.output_file).await
}

/// MT-backed pipeline: like the LLM one, but raw source text only, a
/// validated target language, and literal backend-name dispatch.
pub async fn run_mt(args: &MtArgs, config: &AppConfig) -> Result<()> {
    let target = args.target_language.parse::<TargetLanguage>()?;
    info!("Target language: {}", target);

    let table = load_dataset(&args.dataset_file, &args.output_file, args.dry_run)?;
    let sources = table.column(SOURCE_COLUMN)?;
    log_batch_stats(&sources, &sources);

    let mut translator = TranslatorFactory::create_mt(
        &args.model_name_or_path,
        target,
        args.auth_key.as_deref(),
        config,
    )
    .inspect_err(|e| error!("Failed to instantiate translator: {}", e))?;

    // MT backends take no generation parameters; max_tokens is CLI parity only.
    let opts = GenerationOptions {
        temperature: 0.0,
        max_tokens: args.max_tokens,
    };
    let raw = run_translation(translator.as_mut(), &sources, &opts).await?;

    finalize(table, raw, &args.output_file).await
}

/// Validate paths and load the input table, honoring dry-run truncation.
fn load_dataset(dataset_file: &Path, output_file: &Path, dry_run: bool) -> Result<Table> {
    if output_file.as_os_str().is_empty() {
        return Err(TabError::InputValidation(
            "output_file cannot be empty".to_string(),
        ));
    }
    if !dataset_file.exists() {
        return Err(TabError::FileNotFound(format!(
            "Dataset file not found: {}",
            dataset_file.display()
        )));
    }

    info!("Loading input data from: {}", dataset_file.display());
    let mut table = Table::from_tsv(dataset_file)
        .inspect_err(|e| error!("Failed to load dataset: {}", e))?;

    if dry_run {
        table.truncate(DRY_RUN_ROWS);
        info!("Running in dry-run mode with {} samples", table.len());
    }

    Ok(table)
}

fn log_batch_stats(sources: &[String], batch: &[String]) {
    let char_count: usize = sources.iter().map(|s| s.len()).sum();
    info!("Loaded {} rows with {} characters.", sources.len(), char_count);

    if !batch.is_empty() {
        let avg_words = batch
            .iter()
            .map(|t| t.split_whitespace().count())
            .sum::<usize>() as f64
            / batch.len() as f64;
        info!("Average words per passage: {:.2}", avg_words);
        info!("Some input texts...");
        for text in batch.iter().take(3) {
            info!("  {}", text);
        }
    }
}

async fn run_translation(
    translator: &mut dyn Translator,
    batch: &[String],
    opts: &GenerationOptions,
) -> Result<Vec<String>> {
    let raw = translator
        .translate(batch, opts)
        .await
        .inspect_err(|e| error!("Translation failed: {}", e))?;
    info!("Translation completed. Generated {} translations.", raw.len());
    Ok(raw)
}

/// Clean the raw results, enforce length parity, append the translation
/// column and persist the table.
async fn finalize(table: Table, raw: Vec<String>, output_file: &Path) -> Result<()> {
    let table = attach_translations(table, raw)?;

    if let Some(output_dir) = output_file.parent() {
        if !output_dir.as_os_str().is_empty() && !output_dir.exists() {
            fs::create_dir_all(output_dir).await?;
            info!("Created output directory: {}", output_dir.display());
        }
    }

    info!("Saving results to: {}", output_file.display());
    table.to_tsv(output_file)
}

/// Attach cleaned translations as a new column. A backend delivering a
/// mismatched count is a fatal error; silently truncating would misalign
/// rows.
fn attach_translations(mut table: Table, raw: Vec<String>) -> Result<Table> {
    if raw.len() != table.len() {
        return Err(TabError::Translation(format!(
            "Backend returned {} translations for {} inputs",
            raw.len(),
            table.len()
        )));
    }

    // Failure markers go into the output verbatim; the colon rule in
    // clean() would strip their label.
    let cleaned = raw
        .iter()
        .map(|t| {
            if is_failure_marker(t) {
                t.clone()
            } else {
                clean(t)
            }
        })
        .collect();
    table.append_column(TRANSLATION_COLUMN, cleaned)?;
    Ok(table)
}
