//! CLI command implementations

use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use marquee_core::{MarqueeConfig, RuntimeMode};
use marquee_search::{
    FetchOutcome, Movie, MovieProvider, SearchSession, SearchView, ViewContent, fetch_movies,
    provider_for_mode,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Server {
        /// Host to bind to (defaults to MARQUEE_HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (defaults to MARQUEE_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
        /// Use demo data instead of the movie database
        #[arg(long)]
        demo: bool,
    },
    /// Search movies by title
    Search {
        /// Title to search for
        query: String,
        /// Print the raw results as JSON
        #[arg(long)]
        json: bool,
        /// Use demo data instead of the movie database
        #[arg(long)]
        demo: bool,
    },
    /// List popular movies
    Discover {
        /// Print the raw results as JSON
        #[arg(long)]
        json: bool,
        /// Use demo data instead of the movie database
        #[arg(long)]
        demo: bool,
    },
    /// Type search terms line by line and watch debounced results
    Interactive {
        /// Use demo data instead of the movie database
        #[arg(long)]
        demo: bool,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands, mut config: MarqueeConfig) -> anyhow::Result<()> {
    match command {
        Commands::Server { host, port, demo } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            tracing::info!(
                host = %config.server.host,
                port = config.server.port,
                demo,
                "Starting web server"
            );
            marquee_web::run_server(config, RuntimeMode::from_demo_flag(demo)).await?;
            Ok(())
        }
        Commands::Search { query, json, demo } => {
            run_one_shot(&config, RuntimeMode::from_demo_flag(demo), &query, json).await
        }
        Commands::Discover { json, demo } => {
            run_one_shot(&config, RuntimeMode::from_demo_flag(demo), "", json).await
        }
        Commands::Interactive { demo } => {
            run_interactive(&config, RuntimeMode::from_demo_flag(demo)).await
        }
    }
}

fn build_provider(
    config: &MarqueeConfig,
    mode: RuntimeMode,
) -> anyhow::Result<Arc<dyn MovieProvider>> {
    config.validate(mode)?;
    provider_for_mode(mode, config).context("Failed to create movie provider")
}

/// Runs a single search (or discover, for an empty term) and prints it.
///
/// # Errors
/// - Configuration is invalid or the provider cannot be created
/// - `--json` output could not be serialized
pub async fn run_one_shot(
    config: &MarqueeConfig,
    mode: RuntimeMode,
    term: &str,
    json: bool,
) -> anyhow::Result<()> {
    let provider = build_provider(config, mode)?;
    tracing::debug!(term, %mode, ?provider, "Running one-shot fetch");
    let outcome = fetch_movies(provider.as_ref(), term).await;

    if json {
        let movies: &[Movie] = match &outcome {
            FetchOutcome::Movies(movies) => movies.as_slice(),
            _ => &[],
        };
        println!("{}", serde_json::to_string_pretty(movies)?);
    } else {
        match &outcome {
            FetchOutcome::Movies(movies) => println!("{}", render_movie_list(movies)),
            other => {
                if let Some(message) = other.message() {
                    println!("{message}");
                }
            }
        }
    }

    if let FetchOutcome::Failed(error) = outcome {
        anyhow::bail!(error);
    }
    Ok(())
}

/// Reads search terms from stdin and prints the view whenever it settles.
///
/// Each line replaces the whole search term, like retyping the search box;
/// lines arriving within the debounce window collapse into one request.
///
/// # Errors
/// - Configuration is invalid or the provider cannot be created
/// - Reading stdin failed
pub async fn run_interactive(config: &MarqueeConfig, mode: RuntimeMode) -> anyhow::Result<()> {
    let provider = build_provider(config, mode)?;
    let session = SearchSession::start(provider, &config.search);

    println!("Type a title and press enter; an empty line lists popular movies. Ctrl+D quits.");

    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_printed = None;
        loop {
            let rendered = render_view(&updates.borrow_and_update());
            if last_printed.as_ref() != Some(&rendered) {
                println!("{rendered}");
                last_printed = Some(rendered);
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        tracing::trace!(term = %line, "Search term read from stdin");
        session.set_search_term(line);
    }
    tracing::debug!("Input closed, waiting for the last search");

    tokio::time::sleep(session_settle_time(config)).await;
    session.wait_until_idle().await;
    printer.abort();
    Ok(())
}

fn session_settle_time(config: &MarqueeConfig) -> std::time::Duration {
    config.search.debounce_window + std::time::Duration::from_millis(50)
}

/// Renders the view the way the search page would show it.
pub fn render_view(view: &SearchView) -> String {
    match view.content() {
        ViewContent::Loading => "Loading...".to_string(),
        ViewContent::Message(message) => message.to_string(),
        ViewContent::Movies(movies) => {
            let heading = if view.debounced_term.is_empty() {
                "All Movies".to_string()
            } else {
                format!("Results for '{}'", view.debounced_term)
            };
            format!("{heading}\n{:-<60}\n{}", "", render_movie_list(movies))
        }
    }
}

/// One line per movie: title, year, rating and language.
pub fn render_movie_list(movies: &[Movie]) -> String {
    if movies.is_empty() {
        return "(empty)".to_string();
    }

    movies
        .iter()
        .enumerate()
        .map(|(i, movie)| {
            format!(
                "{:>3}. {} ({})  ★ {}  [{}]",
                i + 1,
                movie.title,
                movie.year_label(),
                movie.rating_label(),
                movie.language_label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
