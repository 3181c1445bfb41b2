use std::{path::Path, process};

use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt};

use storyline_app::cli::{Cli, Commands, OutputFormat, RunArgs, SanitizeArgs, TextArgs};
use storyline_app::config;
use storyline_app::error::AppError;
use storyline_app::pipeline::{Content, TextProcessor};
use storyline_app::services::{RobotOverrides, RobotRequest, build_text_robot, processor_options};

const STDIN_LABEL: &str = "-";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(determine_log_level(&cli));

    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn init_tracing(level: Option<LevelFilter>) {
    let filter = match level {
        Some(level) => EnvFilter::default().add_directive(level.into()),
        None => EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy(),
    };
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("Tracing subscriber already set; skipping re-initialization.");
    }
}

/// `None` defers to `RUST_LOG`.
fn determine_log_level(cli: &Cli) -> Option<LevelFilter> {
    match cli.verbose {
        0 => None,
        1 => Some(LevelFilter::INFO),
        2 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Some(Commands::Run(args)) => run_robot(args).await,
        Some(Commands::Sanitize(args)) => sanitize(args).await,
        None => {
            Cli::print_help();
            Ok(())
        }
    }
}

fn overrides_from(text: &TextArgs) -> RobotOverrides {
    RobotOverrides {
        max_sentences: text.max_sentences,
        strict: text.strict,
        ..RobotOverrides::default()
    }
}

async fn run_robot(args: RunArgs) -> Result<(), AppError> {
    let cfg = config::load()?;
    let overrides = RobotOverrides {
        state_path: args.state_file,
        skip_keywords: args.skip_keywords,
        ..overrides_from(&args.text)
    };
    let robot = build_text_robot(&cfg, &overrides)?;

    let content = robot
        .run(RobotRequest {
            search_term: args.search_term,
            prefix: args.prefix,
        })
        .await?;

    let mut stdout = tokio::io::stdout();
    let rendered = render_text(&content.search_term, &content);
    stdout
        .write_all(rendered.as_bytes())
        .await
        .map_err(AppError::Output)?;
    stdout.flush().await.map_err(AppError::Output)?;
    info!(
        path = %robot.store().path().display(),
        "content record saved"
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct SanitizedDocument<'a> {
    source: &'a str,
    sentences: Vec<&'a str>,
}

async fn sanitize(args: SanitizeArgs) -> Result<(), AppError> {
    let cfg = config::load()?;
    let processor = TextProcessor::new(processor_options(&cfg, &overrides_from(&args.text)))?;

    let mut inputs = Vec::with_capacity(args.inputs.len().max(1));
    if args.inputs.is_empty() {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .map_err(AppError::Stdin)?;
        inputs.push((STDIN_LABEL.to_string(), raw));
    } else {
        for path in &args.inputs {
            let raw = read_input(path).await?;
            inputs.push((path.display().to_string(), raw));
        }
    }

    let mut rendered = String::new();
    for (label, raw) in inputs {
        let mut content = Content::new(label.clone());
        content.source_content_original = raw;
        processor.process(&mut content)?;

        match args.format {
            OutputFormat::Text => rendered.push_str(&render_text(&label, &content)),
            OutputFormat::Json => {
                let document = SanitizedDocument {
                    source: &label,
                    sentences: content.sentence_texts().collect(),
                };
                rendered.push_str(&serde_json::to_string(&document)?);
                rendered.push('\n');
            }
        }
    }

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(rendered.as_bytes())
        .await
        .map_err(AppError::Output)?;
    stdout.flush().await.map_err(AppError::Output)?;
    Ok(())
}

async fn read_input(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn render_text(title: &str, content: &Content) -> String {
    let mut out = format!("# {title}\n");
    for (index, sentence) in content.sentences.iter().enumerate() {
        out.push_str(&format!("{:>2}. {}\n", index + 1, sentence.text));
        if !sentence.keywords.is_empty() {
            out.push_str(&format!("    keywords: {}\n", sentence.keywords.join(", ")));
        }
    }
    out
}
