use anyhow::{anyhow, bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use indicatif::ProgressBar;
use output::{OutputFormat, Renderer};
use progress::spinner;
use takhrij_client::GeminiClient;
use takhrij_core::{filter_suggestions, SearchError, SearchPhase, SearchSession};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "takhrij",
    version,
    about = "Semak status hadis, matan, dan terjemahan terus dari shell."
)]
struct Cli {
    /// Preferred renderer for command output.
    #[arg(long, global = true, value_enum, default_value = "markdown")]
    format: OutputFormat,
    /// Disable ANSI colors in CLI output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Suppress non-critical CLI output.
    #[arg(long, global = true)]
    quiet: bool,
    /// Disable progress indicators for long-running checks.
    #[arg(long, global = true)]
    no_progress: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, Clone)]
enum Command {
    /// Run a takhrij check for a matan fragment or keyword.
    Check {
        /// Matan hadis atau kata kunci (quoting is optional).
        query: Vec<String>,
    },
    /// List popular-search suggestions matching the given input.
    Suggest {
        input: Vec<String>,
    },
    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    fn progress_enabled(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli)?;

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    match &cli.command {
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "takhrij", &mut std::io::stdout());
            Ok(())
        }
        Command::Check { query } => handle_check(query.join(" "), &cli).await,
        Command::Suggest { input } => handle_suggest(&input.join(" "), &cli),
    }
}

async fn handle_check(query: String, cli: &Cli) -> Result<()> {
    let renderer = Renderer::new(cli.format);
    if query.trim().is_empty() {
        bail!("{}", SearchError::EmptyQuery.user_message());
    }

    let client = match GeminiClient::from_env() {
        Ok(client) => client,
        Err(err) => bail!("{}", SearchError::from(err).user_message()),
    };

    info!(
        target: "takhrij_cli",
        model = client.model(),
        "issuing takhrij check"
    );

    let session = SearchSession::new(client);
    session.input_changed(&query).await;

    let progress = spinner(cli.progress_enabled(), "Sedang menyemak ribuan kitab...");
    let state = session.submit().await;
    finish_spinner(progress);

    renderer.search_state(&state)?;
    if state.phase == SearchPhase::Error {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_suggest(input: &str, cli: &Cli) -> Result<()> {
    let renderer = Renderer::new(cli.format);
    renderer.suggestions(input, &filter_suggestions(input))
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,takhrij_cli=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .without_time()
        .with_ansi(!cli.no_color)
        .compact()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize logging: {error}"))
}

fn finish_spinner(spinner: Option<ProgressBar>) {
    if let Some(progress) = spinner {
        progress.finish_and_clear();
    }
}

mod output {
    use anyhow::Result;
    use clap::ValueEnum;
    use serde::Serialize;
    use serde_json::json;
    use takhrij_core::{Citation, SearchPhase, SearchState};

    #[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
    pub enum OutputFormat {
        Json,
        Markdown,
        Text,
    }

    #[derive(Copy, Clone, Debug)]
    pub struct Renderer {
        format: OutputFormat,
    }

    #[derive(Serialize)]
    struct VerdictReport<'a> {
        query: &'a str,
        status: &'static str,
        matan: &'a str,
        translation: &'a str,
        sources: &'a [String],
        explanation: &'a str,
        citations: &'a [Citation],
    }

    impl Renderer {
        pub fn new(format: OutputFormat) -> Self {
            Self { format }
        }

        pub fn search_state(&self, state: &SearchState) -> Result<()> {
            match state.phase {
                SearchPhase::Success => self.verdict(state),
                SearchPhase::Error => {
                    let message = state
                        .error_message
                        .as_deref()
                        .unwrap_or("Berlaku ralat semasa pencarian. Sila cuba lagi.");
                    self.error(message)
                }
                _ => self.error("Tiada semakan dijalankan."),
            }
        }

        fn verdict(&self, state: &SearchState) -> Result<()> {
            let Some(result) = &state.result else {
                return self.error("Tiada semakan dijalankan.");
            };

            match self.format {
                OutputFormat::Json => {
                    let report = VerdictReport {
                        query: &state.query,
                        status: result.status.label(),
                        matan: &result.matan,
                        translation: &result.translation,
                        sources: &result.sources,
                        explanation: &result.explanation,
                        citations: &state.citations,
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Markdown => {
                    println!("# Semakan Takhrij Hadis");
                    println!();
                    println!("**Status:** {}", result.status.label());
                    println!();
                    println!("## Matan Hadis");
                    println!();
                    println!("{}", result.matan);
                    println!();
                    println!("## Terjemahan");
                    println!();
                    println!("{}", result.translation);
                    println!();
                    println!("## Sumber Kitab Utama");
                    println!();
                    for source in &result.sources {
                        println!("- {source}");
                    }
                    println!();
                    println!("## Huraian Status & Analisis Sanad");
                    println!();
                    println!("{}", result.explanation);
                    if !state.citations.is_empty() {
                        println!();
                        println!("## Pautan Rujukan Web");
                        println!();
                        for citation in &state.citations {
                            println!("- [{}]({})", citation.title, citation.url);
                        }
                    }
                }
                OutputFormat::Text => {
                    // Mirrors the shareable plain-text rendering of a verdict.
                    println!("*Semakan Takhrij Hadis*");
                    println!();
                    println!("*Status:* {}", result.status.label());
                    println!();
                    println!("*Matan:* {}", result.matan);
                    println!();
                    println!("*Terjemahan:* {}", result.translation);
                    println!();
                    println!("*Sumber:* {}", result.sources.join(", "));
                    println!();
                    println!("*Huraian:* {}", result.explanation);
                    for citation in &state.citations {
                        println!();
                        println!("{} — {}", citation.title, citation.url);
                    }
                }
            }
            Ok(())
        }

        fn error(&self, message: &str) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "error": message }))?);
                }
                OutputFormat::Markdown => {
                    println!("## Carian Gagal");
                    println!();
                    println!("{message}");
                }
                OutputFormat::Text => println!("{message}"),
            }
            Ok(())
        }

        pub fn suggestions(&self, input: &str, matches: &[&'static str]) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    let payload = json!({ "input": input, "suggestions": matches });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Markdown => {
                    println!("## Cadangan Carian");
                    println!();
                    if matches.is_empty() {
                        println!("Tiada cadangan padanan.");
                    }
                    for entry in matches {
                        println!("- {entry}");
                    }
                }
                OutputFormat::Text => {
                    for entry in matches {
                        println!("{entry}");
                    }
                }
            }
            Ok(())
        }
    }
}

mod progress {
    use std::time::Duration;

    use indicatif::{ProgressBar, ProgressStyle};

    pub fn spinner(message_enabled: bool, message: impl Into<String>) -> Option<ProgressBar> {
        if !message_enabled {
            return None;
        }
        let progress = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.set_message(message.into());
        progress.enable_steady_tick(Duration::from_millis(80));
        Some(progress)
    }
}
