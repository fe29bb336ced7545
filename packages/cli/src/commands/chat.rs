use crate::commands::history::{print_history, resolve_version_id, short_id};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{Document, EditSession, SessionSnapshot, SubmitOutcome};
use pagesmith_schema::PageLayout;
use pagesmith_translator::{api_key_from_env, build_translator, Strategy};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Layout to edit (defaults to the configured layout)
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Session file to resume and save (defaults to the configured one)
    #[arg(long)]
    pub session: Option<PathBuf>,

    /// Translator strategy: rules, remote or auto
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Ignore any saved session and start from the layout file
    #[arg(long)]
    pub new: bool,
}

/// A `:`-prefixed line typed at the prompt
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Undo,
    Redo,
    Goto(String),
    History,
    Show,
    Save,
    Help,
    Quit,
}

impl ReplCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let argument = parts.next();

        match (name, argument) {
            ("undo", None) => Ok(ReplCommand::Undo),
            ("redo", None) => Ok(ReplCommand::Redo),
            ("goto", Some(id)) => Ok(ReplCommand::Goto(id.to_string())),
            ("goto", None) => Err("usage: :goto <version id>".to_string()),
            ("history", None) => Ok(ReplCommand::History),
            ("show", None) => Ok(ReplCommand::Show),
            ("save", None) => Ok(ReplCommand::Save),
            ("help", None) => Ok(ReplCommand::Help),
            ("quit" | "q" | "exit", None) => Ok(ReplCommand::Quit),
            _ => Err(format!("unknown command ':{line}' (try :help)")),
        }
    }
}

struct Paths {
    layout: PathBuf,
    session: PathBuf,
}

pub async fn chat(args: ChatArgs, cwd: &str) -> Result<()> {
    let mut config = Config::load(cwd)?;
    if let Some(strategy) = args.strategy {
        config.translator.strategy = strategy;
    }

    let paths = Paths {
        layout: match &args.layout {
            Some(path) => Config::resolve(cwd, path),
            None => config.layout_path(cwd),
        },
        session: match &args.session {
            Some(path) => Config::resolve(cwd, path),
            None => config.session_path(cwd),
        },
    };

    let translator = build_translator(&config.translator, api_key_from_env())?;

    let session = if !args.new && paths.session.exists() {
        let snapshot = SessionSnapshot::load(&paths.session)
            .with_context(|| format!("Cannot resume {}", paths.session.display()))?;
        let session = EditSession::restore(snapshot, translator, config.brand.clone())?;
        println!(
            "{} Resumed session {} ({} versions)",
            "↺".cyan(),
            short_id(&session.id),
            session.history().len()
        );
        session
    } else {
        let layout = if paths.layout.exists() {
            Document::load(&paths.layout)
                .with_context(|| format!("Cannot load {}", paths.layout.display()))?
                .into_layout()
        } else {
            println!(
                "{} {} not found, starting from the default template",
                "ℹ".blue(),
                paths.layout.display()
            );
            PageLayout::default_template()
        };
        EditSession::new(layout, translator, config.brand.clone())
    };
    let mut session = session.with_history_limit(config.history_limit);

    println!(
        "{} Editing {} with the {} translator. Type :help for commands.",
        "✏️".bright_blue(),
        session.layout().title().bright_white(),
        session.translator_name()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "›".cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            match ReplCommand::parse(command) {
                Ok(ReplCommand::Quit) => break,
                Ok(command) => run_command(&mut session, command, &paths)?,
                Err(message) => println!("{}", message.red()),
            }
            continue;
        }

        match session.submit(line).await {
            Ok(report) => {
                let content = &report.reply.content;
                match report.outcome {
                    SubmitOutcome::Applied { .. } => {
                        println!("{}", content.green());
                        save_snapshot(&session, &paths.session)?;
                    }
                    SubmitOutcome::NoChanges => println!("{}", content.yellow()),
                    SubmitOutcome::Failed(_) => println!("{}", content.red()),
                }
            }
            Err(err) if err.is_refusal() => println!("{}", err.to_string().red()),
            Err(err) => return Err(err.into()),
        }
    }

    save_snapshot(&session, &paths.session)?;
    println!("{} Session saved to {}", "✓".green(), paths.session.display());
    Ok(())
}

fn run_command(session: &mut EditSession, command: ReplCommand, paths: &Paths) -> Result<()> {
    match command {
        ReplCommand::Undo => {
            if session.rollback()? {
                println!("{} Back to: {}", "↶".cyan(), current_message(session));
            } else {
                println!("{}", "Already at the oldest version".yellow());
            }
        }
        ReplCommand::Redo => {
            if session.forward()? {
                println!("{} Forward to: {}", "↷".cyan(), current_message(session));
            } else {
                println!("{}", "Already at the newest version".yellow());
            }
        }
        ReplCommand::Goto(prefix) => {
            let switched = match resolve_version_id(session.history(), &prefix) {
                Some(id) => session.switch_to_version(&id)?,
                None => false,
            };
            if switched {
                println!("{} Switched to: {}", "→".cyan(), current_message(session));
            } else {
                println!("{}", format!("No single version matches '{prefix}'").red());
            }
        }
        ReplCommand::History => print_history(session.history()),
        ReplCommand::Show => println!("{}", session.layout().to_json_pretty()?),
        ReplCommand::Save => {
            Document::from_layout(session.layout().clone()).save_as(&paths.layout)?;
            save_snapshot(session, &paths.session)?;
            println!("  {} Wrote {}", "✓".green(), paths.layout.display());
        }
        ReplCommand::Help => print_help(),
        ReplCommand::Quit => {}
    }
    Ok(())
}

fn current_message(session: &EditSession) -> &str {
    &session.history().current_version().message
}

fn save_snapshot(session: &EditSession, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    session.snapshot().save(path)?;
    info!(session = %session.id, path = %path.display(), "Saved session");
    Ok(())
}

fn print_help() {
    println!("Describe a change in plain words, or use:");
    println!("  :undo           step back one version");
    println!("  :redo           step forward one version");
    println!("  :goto <id>      jump to a version (an id prefix is enough)");
    println!("  :history        list versions");
    println!("  :show           print the current layout");
    println!("  :save           write the layout file and the session");
    println!("  :quit           save the session and leave");
}
