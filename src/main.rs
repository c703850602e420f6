use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dialoguer::Input;
use quote_detective::match_selector::SelectionPolicy;
use quote_detective::server::{self, AppState};
use quote_detective::{
    Config, GeneratorKind, ProgressEvent, QuotePipeline, ResolvedMedia, TimecodeSource,
    VideoRecord, VideoSearch,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Find out which movie or tv episode a quote is from
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    providers: ProviderArgs,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Print progress while resolving
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify the movie or episode a quote is from
    Guess {
        /// The quote; prompted for when omitted
        quote: Option<String>,
    },
    /// Search video clips for a free-text query
    Videos {
        query: String,

        /// Start playback at this timecode (HH:MM:SS, MM:SS or seconds)
        #[arg(long)]
        timecode: Option<String>,
    },
    /// Identify a quote and search a clip starting at the scene
    Find {
        /// The quote; prompted for when omitted
        quote: Option<String>,
    },
    /// Run the HTTP server
    Serve {
        #[arg(long, env = "SERVER_HOST", default_value = "127.0.0.1")]
        host: IpAddr,

        #[arg(long, env = "SERVER_PORT", default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Args, Debug)]
struct ProviderArgs {
    /// Backend generating hypotheses: gemini, mistral, gemini-cli or claude-cli
    #[arg(long, env = "QUOTE_DETECTIVE_GENERATOR", default_value = "gemini", global = true)]
    generator: GeneratorKind,

    /// How catalog candidates are disambiguated: year-aware or type-and-title
    #[arg(long, default_value = "year-aware", global = true)]
    selection: SelectionPolicy,

    /// Timeout for every outbound request, in seconds
    #[arg(long, env = "QUOTE_DETECTIVE_TIMEOUT_SECS", default_value_t = 10, global = true)]
    timeout_secs: u64,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", global = true)]
    gemini_model: Option<String>,

    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true, global = true)]
    mistral_api_key: Option<String>,

    #[arg(long, env = "MISTRAL_MODEL", global = true)]
    mistral_model: Option<String>,

    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true, global = true)]
    tmdb_api_key: Option<String>,

    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true, global = true)]
    youtube_api_key: Option<String>,
}

impl ProviderArgs {
    fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            generator: self.generator,
            gemini_api_key: self.gemini_api_key,
            gemini_model: self.gemini_model.unwrap_or(defaults.gemini_model),
            mistral_api_key: self.mistral_api_key,
            mistral_model: self.mistral_model.unwrap_or(defaults.mistral_model),
            tmdb_api_key: self.tmdb_api_key,
            youtube_api_key: self.youtube_api_key,
            request_timeout: Duration::from_secs(self.timeout_secs),
            selection_policy: self.selection,
            ..defaults
        }
    }
}

/// Handles progress events and prints them to stderr
fn handle_progress_event(event: ProgressEvent) {
    match event {
        ProgressEvent::Hypothesizing => {
            eprintln!("Asking the language model...");
        }
        ProgressEvent::HypothesisReady { hypothesis } => {
            if hypothesis.is_empty() {
                eprintln!("  No usable answer");
            } else if let Some(title) = hypothesis.title {
                eprintln!("  Suspect: {}", title);
            }
        }
        ProgressEvent::SearchingCatalog { title } => {
            eprintln!("Searching the catalog for '{}'...", title);
        }
        ProgressEvent::CandidatesFound { count } => {
            eprintln!("  Found {} candidate(s)", count);
        }
        ProgressEvent::MatchSelected { catalog_id, title } => {
            eprintln!("  Selected '{}' (#{})", title, catalog_id);
        }
        ProgressEvent::FetchingDetails { .. } => {
            eprintln!("Fetching cast and crew...");
        }
        ProgressEvent::TimecodeSettled { timecode, source } => {
            let origin = match source {
                TimecodeSource::Hypothesis => "from the model",
                TimecodeSource::KnownQuote => "well-known quote",
                TimecodeSource::Default => "default",
            };
            eprintln!("Timecode {} ({})", timecode, origin);
        }
    }
}

fn print_media(media: &ResolvedMedia) {
    println!("\n=== Identification ===\n");
    match &media.title {
        Some(title) => match &media.year {
            Some(year) => println!("  Title: {} ({})", title, year),
            None => println!("  Title: {}", title),
        },
        None => println!("  Title: unknown"),
    }
    if let (Some(season), Some(episode)) = (&media.season, &media.episode) {
        println!("  Episode: season {}, episode {}", season, episode);
    }
    if let Some(director) = &media.director {
        println!("  Director: {}", director);
    }
    if let Some(actors) = &media.actors {
        println!("  Cast: {}", actors.join(", "));
    }
    if let Some(overview) = &media.overview {
        println!("  Overview: {}", overview);
    }
    println!("  Timecode: {}", media.timecode);
}

fn print_videos(videos: &[VideoRecord]) {
    println!("\n=== Clips ===\n");
    if videos.is_empty() {
        println!("No videos found.");
        return;
    }
    for (index, video) in videos.iter().enumerate() {
        println!("#{} {}", index + 1, video.title);
        println!("  Channel: {}", video.channel_title);
        println!("  Watch: {}", video.embed_url);
    }
}

fn read_quote(quote: Option<String>) -> anyhow::Result<String> {
    let quote = match quote {
        Some(quote) => quote,
        None => Input::new()
            .with_prompt("Which quote are you looking for?")
            .interact_text()
            .context("Failed to read quote")?,
    };
    let quote = quote.trim().to_string();
    anyhow::ensure!(!quote.is_empty(), "Quote is required");
    Ok(quote)
}

fn resolve(pipeline: &QuotePipeline, quote: &str, verbose: bool) -> ResolvedMedia {
    if verbose {
        pipeline.resolve_quote_with_progress(quote, handle_progress_event)
    } else {
        pipeline.resolve_quote(quote)
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quote_detective=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.providers.into_config();

    match cli.command {
        Command::Guess { quote } => {
            let quote = read_quote(quote)?;
            let pipeline = QuotePipeline::from_config(&config)?;
            let media = resolve(&pipeline, &quote, cli.verbose);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&media)?);
            } else {
                print_media(&media);
            }
        }
        Command::Videos { query, timecode } => {
            let search = VideoSearch::from_config(&config)?;
            let videos = search.search_videos_for_query(&query, timecode.as_deref())?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&videos)?);
            } else {
                print_videos(&videos);
            }
        }
        Command::Find { quote } => {
            let quote = read_quote(quote)?;
            let pipeline = QuotePipeline::from_config(&config)?;
            let search = VideoSearch::from_config(&config)?;

            let media = resolve(&pipeline, &quote, cli.verbose);
            let videos = search.find_clip(&media, &quote)?;

            if cli.json {
                let output = serde_json::json!({ "result": media, "videos": videos });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_media(&media);
                print_videos(&videos);
            }
        }
        Command::Serve { host, port } => {
            // Blocking http clients must not be created or dropped inside the runtime
            let pipeline = Arc::new(QuotePipeline::from_config(&config)?);
            let videos = match VideoSearch::from_config(&config) {
                Ok(search) => Some(Arc::new(search)),
                Err(e) => {
                    tracing::warn!(error = %e, "Video search disabled");
                    None
                }
            };
            let state = AppState::new(pipeline, videos);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime.block_on(server::serve(state.clone(), SocketAddr::new(host, port)))?;
            drop(runtime);
            drop(state);
        }
    }

    Ok(())
}
