use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clipcheck_core::{
    AnalysisReport, AnalysisRequest, GeminiClient, GeminiConfig, Orchestrator, Phase, Platform,
    PollPolicy, Preferences, Progress, ProgressEvent, analyze_media, format_report_readable,
    get_cache_dir, get_report_path, load_preferences, load_report, mime_type_for,
    preferences::{FileStore, default_preferences_path},
    resolve_api_key, save_preferences, save_report,
};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::{fs, sync::mpsc, task::JoinHandle};
use tracing_subscriber::EnvFilter;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Platform enum (needed for clap ValueEnum)
#[derive(Clone, Copy, Default, ValueEnum)]
enum CliPlatform {
    #[default]
    Youtube,
    Tiktok,
    Instagram,
    Linkedin,
    Generic,
}

impl From<CliPlatform> for Platform {
    fn from(cli: CliPlatform) -> Self {
        match cli {
            CliPlatform::Youtube => Platform::Youtube,
            CliPlatform::Tiktok => Platform::Tiktok,
            CliPlatform::Instagram => Platform::Instagram,
            CliPlatform::Linkedin => Platform::Linkedin,
            CliPlatform::Generic => Platform::Generic,
        }
    }
}

#[derive(Parser)]
#[command(name = "clipcheck")]
#[command(about = "Upload a video to Gemini and get a timestamped QA report")]
struct Cli {
    /// Video file to review
    file: PathBuf,

    /// Video title given to the model. Defaults to the file name.
    #[arg(short, long)]
    title: Option<String>,

    /// Platform the video is made for
    #[arg(short, long, default_value = "youtube")]
    platform: CliPlatform,

    /// Free-text notes for the reviewer (audience, claims to double check, ...)
    #[arg(short, long)]
    context: Option<String>,

    /// Channel URL; falls back to the saved one for the platform
    #[arg(long)]
    channel_url: Option<String>,

    /// Segment length in seconds for long videos
    #[arg(short, long)]
    window_seconds: Option<u64>,

    /// Gemini model name
    #[arg(short, long)]
    model: Option<String>,

    /// Also write the report JSON here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Remember channel URL, model and window size as defaults
    #[arg(long)]
    remember: bool,

    /// Store the key from GEMINI_API_KEY in the preferences file
    #[arg(long)]
    save_api_key: bool,

    /// Preferences file
    #[arg(long)]
    preferences: Option<PathBuf>,

    /// Force re-processing even if a cached report exists
    #[arg(short, long)]
    force: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Mirror progress events onto the spinner; milestones stay on screen.
fn spawn_progress_view(
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    spinner: ProgressBar,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event.phase {
                Phase::SegmentFailed { .. } => spinner.println(format!(
                    "{} {}",
                    style("!").yellow().bold(),
                    style(&event.phase).yellow()
                )),
                Phase::MediaReady { .. } | Phase::SegmentCompleted { .. } => {
                    spinner.println(format!("{} {}", style("✓").green().bold(), event.phase))
                }
                _ => spinner.set_message(event.phase.to_string()),
            }
        }
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled video".to_string())
}

fn update_preferences(cli: &Cli, prefs: &mut Preferences, platform: Platform) -> bool {
    let mut changed = false;
    if cli.remember {
        if let Some(url) = &cli.channel_url {
            prefs.channel_urls.insert(platform, url.clone());
        }
        if let Some(model) = &cli.model {
            prefs.model = model.clone();
        }
        if let Some(window) = cli.window_seconds.filter(|w| *w > 0) {
            prefs.window_seconds = window;
        }
        changed = true;
    }
    if cli.save_api_key {
        match std::env::var(clipcheck_core::provider::API_KEY_ENV_VAR) {
            Ok(key) if !key.trim().is_empty() => {
                prefs.api_key = Some(key);
                changed = true;
            }
            _ => eprintln!(
                "{} --save-api-key needs {} to be set",
                style("Warning:").yellow().bold(),
                clipcheck_core::provider::API_KEY_ENV_VAR
            ),
        }
    }
    changed
}

fn print_report(report: &AnalysisReport, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", format_report_readable(report));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let platform: Platform = cli.platform.into();

    let prefs_path = cli.preferences.clone().unwrap_or_else(default_preferences_path);
    let mut store = FileStore::open(&prefs_path);
    let mut prefs = load_preferences(&store);
    if update_preferences(&cli, &mut prefs, platform) {
        save_preferences(&mut store, &prefs)
            .with_context(|| format!("saving preferences to {}", prefs_path.display()))?;
    }

    // Validate API key early
    let api_key = match resolve_api_key(&prefs) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let window_seconds = cli
        .window_seconds
        .filter(|w| *w > 0)
        .unwrap_or(prefs.window_seconds);
    let model = cli.model.clone().unwrap_or_else(|| prefs.model.clone());
    let request = AnalysisRequest {
        title: cli.title.clone().unwrap_or_else(|| default_title(&cli.file)),
        platform,
        channel_url: cli
            .channel_url
            .clone()
            .or_else(|| prefs.channel_url(platform).map(str::to_string)),
        context: cli.context.clone(),
    };

    println!(
        "\n{}  {}\n",
        style("clipcheck").cyan().bold(),
        style("Video QA").dim()
    );

    let metadata = fs::metadata(&cli.file)
        .await
        .with_context(|| format!("reading {}", cli.file.display()))?;
    let cache_dir = get_cache_dir(&cli.file, metadata.len());
    fs::create_dir_all(&cache_dir).await?;
    let report_path = get_report_path(&cache_dir, platform, window_seconds);

    println!("{}", style("─".repeat(60)).dim());
    let total_start = Instant::now();

    let report = if !cli.force && report_path.exists() {
        tracing::info!(path = %report_path.display(), "using cached report");
        let report = load_report(&report_path).await?;
        println!(
            "{} Report loaded {}",
            style("✓").green().bold(),
            style("(cached)").dim()
        );
        report
    } else {
        let bytes = fs::read(&cli.file).await?;
        let mime_type = mime_type_for(&cli.file);
        let client = GeminiClient::new(GeminiConfig::with_model(&model), api_key);
        let orchestrator = Orchestrator::new(client.clone()).with_window_seconds(window_seconds);

        let (tx, rx) = mpsc::unbounded_channel();
        let spinner = create_spinner(&format!("Analyzing with {}...", model));
        let view = spawn_progress_view(rx, spinner.clone());

        let outcome = tokio::select! {
            result = analyze_media(
                &client,
                &orchestrator,
                bytes,
                mime_type,
                &request,
                PollPolicy::default(),
                Progress::new(&tx),
            ) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        drop(tx);
        let _ = view.await;

        let report = match outcome {
            Some(Ok(report)) => report,
            Some(Err(e)) => {
                spinner.finish_and_clear();
                eprintln!("{} {}", style("Error:").red().bold(), e);
                std::process::exit(1);
            }
            None => {
                spinner.finish_and_clear();
                eprintln!("{} interrupted", style("Aborted:").yellow().bold());
                std::process::exit(130);
            }
        };

        save_report(&report, &report_path).await?;
        spinner.finish_with_message(format!(
            "{} Report generated ({}) {}",
            style("✓").green().bold(),
            model,
            style(format!("[{}]", format_duration(total_start.elapsed()))).dim()
        ));
        report
    };

    if let Some(output) = &cli.output {
        save_report(&report, output).await?;
    }

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    println!(
        "{} {}\n",
        style("Saved:").dim(),
        style(cli.output.as_deref().unwrap_or(&report_path).display()).cyan()
    );
    println!("{}", style("─".repeat(60)).dim());

    print_report(&report, cli.json)
}
