#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Formwright **
//! Command-line front end for the questionnaire builder model.

use formwright_data::QuestionType;
use formwright_engine::config::CONFIG_FILE;
use formwright_engine::export::export_file_name;
use formwright_engine::{
    EditorConfig, FORMWRIGHT_VERSION, QuestionnaireDraft, load_config, read_questionnaire, slug, write_questionnaire,
};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::info;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version = FORMWRIGHT_VERSION, about = "Build and check questionnaire documents.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the slug derived from a title.
    Slug {
        title: String,
        /// Slugs already taken; the result is suffixed to avoid them.
        #[arg(long, value_delimiter = ',')]
        existing: Vec<String>,
    },
    /// Create an empty questionnaire file.
    New {
        title: String,
        /// Output file (.json or .ron). Defaults to a name derived from the title.
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Validate a questionnaire file.
    Check { file: PathBuf },
    /// Append a question of the given type (text, textarea, radio, ...).
    Add { file: PathBuf, kind: String },
    /// Move a question to a new position.
    Move { file: PathBuf, id: String, index: usize },
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(Path::new(CONFIG_FILE));

    match cli.command {
        Commands::Slug { title, existing } => {
            let base = config.slug_codec().from_title(&title);
            let taken: HashSet<String> = existing.into_iter().collect();
            println!("{}", slug::unique(&base, &taken));
            Ok(ExitCode::SUCCESS)
        },
        Commands::New { title, out } => {
            let draft = QuestionnaireDraft::new(&title, &config);
            let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(&title, config.export.format)));
            write_questionnaire(&path, &draft.to_questionnaire())?;
            println!("{} {}", "Created".bright_green(), path.display());
            report_slug(&draft);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Check { file } => check(&file, &config),
        Commands::Add { file, kind } => {
            let kind = QuestionType::from_key(&kind).ok_or_else(|| {
                let keys: Vec<_> = QuestionType::ALL.iter().map(|k| k.key()).collect();
                anyhow!("unknown question type '{kind}' (expected one of: {})", keys.join(", "))
            })?;
            let draft = open(&file, &config)?.add_question(kind)?;
            let added = draft.selected_question().map(|q| q.id.clone()).unwrap_or_default();
            write_questionnaire(&file, &draft.to_questionnaire())?;
            println!("{} {kind} question '{added}'", "Added".bright_green());
            Ok(ExitCode::SUCCESS)
        },
        Commands::Move { file, id, index } => {
            let draft = open(&file, &config)?.move_question(&id, index)?;
            write_questionnaire(&file, &draft.to_questionnaire())?;
            let position = draft.questions().position(&id).unwrap_or(index);
            println!("{} '{id}' to position {position}", "Moved".bright_green());
            Ok(ExitCode::SUCCESS)
        },
    }
}

fn open(file: &Path, config: &EditorConfig) -> Result<QuestionnaireDraft> {
    let questionnaire = read_questionnaire(file)?;
    QuestionnaireDraft::from_questionnaire(questionnaire, config)
        .with_context(|| format!("opening {} for editing", file.display()))
}

fn check(file: &Path, config: &EditorConfig) -> Result<ExitCode> {
    let draft = open(file, config)?;
    let errors = draft.check();
    if errors.is_empty() {
        info!("{} passed validation", file.display());
        println!(
            "{} {} ({} questions)",
            "OK".bright_green().bold(),
            draft.title(),
            draft.questions().len()
        );
        return Ok(ExitCode::SUCCESS);
    }
    for error in &errors {
        println!("{} {error}", "error:".bright_red().bold());
    }
    println!("{} problem(s) in {}", errors.len(), file.display());
    Ok(ExitCode::FAILURE)
}

fn report_slug(draft: &QuestionnaireDraft) {
    match (draft.share_path(), draft.slug_error()) {
        (Some(path), _) => println!("{} {}", "Share at".bright_blue(), path),
        (None, Some(problem)) => println!("{} {problem}", "Slug:".yellow()),
        (None, None) => {},
    }
}
