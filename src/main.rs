//! Resume analyzer: chunked TF-IDF retrieval with LLM-backed ratings

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_analyzer::cli::{self, Cli, Commands, ConfigAction};
use resume_analyzer::config::{ChunkingMode, Config, OutputFormat};
use resume_analyzer::error::{Result, ResumeAnalyzerError};
use resume_analyzer::input::file_detector::FileType;
use resume_analyzer::input::InputManager;
use resume_analyzer::llm::rating::parse_rating;
use resume_analyzer::llm::{CommandGenerator, ResumeAnalyzer, TextGenerator};
use resume_analyzer::output::{save_report_to_file, suggest_filename, AnalysisReport, ReportGenerator};
use resume_analyzer::processing::chunker::TextChunker;
use resume_analyzer::processing::document::Document;
use resume_analyzer::processing::features::extract_features;
use resume_analyzer::processing::tokenizer::Tokenizer;
use resume_analyzer::processing::vector_space::VectorService;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "text", "md", "markdown"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration from {}: {}", config_path.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            detailed,
            output,
            save,
            no_llm,
            top_k,
        } => {
            cli::validate_file_extension(&resume, SUPPORTED_EXTENSIONS)
                .map_err(|e| ResumeAnalyzerError::InvalidInput(format!("Resume file: {}", e)))?;

            let format = match output {
                Some(output) => cli::parse_output_format(&output).map_err(ResumeAnalyzerError::InvalidInput)?,
                None => config.output.format,
            };
            config.apply_top_k(top_k)?;
            let detailed = detailed || config.output.detailed;

            info!("Analyzing {}", resume.display());
            let document = load_document(&resume).await?;
            let mut analyzer = ResumeAnalyzer::new(&config)?;

            let generator = if no_llm {
                None
            } else {
                let generator = CommandGenerator::from_config(&config.llm);
                if generator.is_none() {
                    warn!(
                        "No llm.command set in {}; running retrieval only",
                        config_path.display()
                    );
                }
                generator
            };

            let analysis = match generator {
                Some(generator) => {
                    let spinner = spinner(&format!("Generating analysis with {}...", generator.name()));
                    let result = analyzer.analyze(&document, &generator).await;
                    spinner.finish_and_clear();
                    result?
                }
                None => analyzer.analyze_offline(&document),
            };

            let report = AnalysisReport::from_analysis(analysis, &resume.to_string_lossy());
            let use_colors = config.output.color_output && save.is_none();
            let content = ReportGenerator::with_options(use_colors, detailed, true).generate_report(&report, format)?;

            match save {
                Some(path) => {
                    let path = resolve_save_path(path, format, &resume);
                    save_report_to_file(&content, &path)?;
                    println!("{} {}", "Report saved to".green(), path.display());
                }
                None => println!("{}", content),
            }
        }

        Commands::Chunk {
            file,
            size,
            overlap,
            sentences,
        } => {
            let mut processing = config.processing.clone();
            if let Some(size) = size {
                processing.chunk_size = size;
                processing.min_chunk_length = processing.min_chunk_length.min(size);
            }
            if let Some(overlap) = overlap {
                processing.chunk_overlap = overlap;
            }
            if sentences {
                processing.chunking_mode = ChunkingMode::Sentence;
            }
            config.processing = processing;
            config.validate()?;

            let document = load_document(&file).await?;
            let chunks = TextChunker::from_config(&config.processing)?.chunk(document.content());

            println!(
                "{} chunks ({:?} mode, target {}, overlap {})",
                chunks.len(),
                config.processing.chunking_mode,
                config.processing.chunk_size,
                config.processing.chunk_overlap
            );
            for chunk in &chunks {
                let span = chunk
                    .span
                    .map(|(start, end)| format!(", chars {}..{}", start, end))
                    .unwrap_or_default();
                println!(
                    "\n{}",
                    format!("── chunk {} ({} chars{}) ──", chunk.position, chunk.len(), span).cyan()
                );
                println!("{}", chunk.content);
            }
        }

        Commands::Search { file, query, top_k } => {
            config.apply_top_k(top_k)?;
            let k = config.retrieval.top_k;
            let document = load_document(&file).await?;
            let chunks = TextChunker::from_config(&config.processing)?.chunk(document.content());
            let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();

            let mut vectors = VectorService::new(Tokenizer::new(config.processing.min_token_length));
            vectors.build_index(&contents);
            let hits = vectors.search(&query, k);

            if hits.is_empty() {
                println!("No chunks to search in {}", file.display());
            }
            for (rank, hit) in hits.iter().enumerate() {
                println!(
                    "\n{}",
                    format!("#{} chunk {} score {:.4}", rank + 1, hit.position, hit.score).cyan()
                );
                println!("{}", hit.content);
            }
        }

        Commands::Features { file, json } => {
            let document = load_document(&file).await?;
            let features = extract_features(document.content());

            if json {
                println!("{}", serde_json::to_string_pretty(&features)?);
            } else {
                print_list("Skills", &features.skills);
                print_list("Experience", &features.experience);
                print_list("Education", &features.education);
                print_list("Certifications", &features.certifications);
                print_list("Keywords", &features.keywords);
            }
        }

        Commands::Rate { response, json } => {
            let text = tokio::fs::read_to_string(&response).await?;
            let rating = parse_rating(&text);

            if json {
                println!("{}", serde_json::to_string_pretty(&rating)?);
            } else {
                println!("{} {}/10 {}", "Total:".bold(), rating.total, rating.grade.label());
                if !rating.total_stated {
                    println!("(no TOTAL SCORE line; summed from sub-scores)");
                }
                for (criterion, score) in rating.sub_scores.iter() {
                    println!("  {:<24} {}/{}", criterion.label(), score, criterion.max_score());
                }
                if !rating.improvements.is_empty() {
                    println!("\n{}", "Improvements:".bold());
                    for (i, item) in rating.improvements.iter().enumerate() {
                        println!("  {}. {}", i + 1, item);
                    }
                }
            }
        }

        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    ResumeAnalyzerError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("# {}\n{}", config_path.display(), content);
            }
            ConfigAction::Reset => {
                Config::default().save_to(config_path)?;
                println!("Configuration reset to defaults at {}", config_path.display());
            }
            ConfigAction::Path => println!("{}", config_path.display()),
        },
    }

    Ok(())
}

async fn load_document(path: &Path) -> Result<Document> {
    let mut input_manager = InputManager::new().with_cache(false);
    let text = input_manager.extract_text(path).await?;
    Ok(Document::new(text, FileType::from_path(path)))
}

/// A directory (existing, or written with a trailing separator) gets a
/// generated file name inside it.
fn resolve_save_path(path: PathBuf, format: OutputFormat, resume: &Path) -> PathBuf {
    let is_dir = path.is_dir() || path.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR);
    if is_dir {
        path.join(suggest_filename(format, &resume.to_string_lossy(), true))
    } else {
        path
    }
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        println!("{}: {}", label.bold(), "none found".dimmed());
    } else {
        println!("{}: {}", label.bold(), items.join(", "));
    }
}
