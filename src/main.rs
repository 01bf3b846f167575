use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

mod cli;

use cli::Cli;
use ytsum::config::Config;
use ytsum::output;
use ytsum::pipeline::{Pipeline, PipelineSettings};
use ytsum::prompt::{PromptMode, WordLimit};
use ytsum::summarize::{self, GeminiClient};
use ytsum::translate::{GoogleTranslate, Translator};
use ytsum::youtube::YouTubeCaptions;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn build_after_help() -> String {
    format!(
        "\nENVIRONMENT:\n  {}    Gemini API key (required)\n\nConfig: {}\nLogs are written to: {}",
        summarize::API_KEY_ENV,
        ytsum::config::config_path().display(),
        log_dir().join("ytsum.log").display()
    )
}

fn create_spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")?,
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

fn prompt_mode(cli: &Cli, config: &Config) -> Result<PromptMode> {
    if let Some(ref question) = cli.question {
        let question = question.trim();
        if question.is_empty() {
            bail!("--question must not be empty");
        }
        return Ok(PromptMode::Question {
            question: question.to_string(),
        });
    }

    let word_limit = match cli.words.or(config.default_word_limit) {
        Some(words) => WordLimit::new(words)?,
        None => WordLimit::default(),
    };

    Ok(PromptMode::Summary {
        style: cli.style.or(config.default_style).unwrap_or_default(),
        word_limit,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring invalid config: {e}");
        Config::default()
    });

    // The API key is the one fatal startup condition
    let api_key = summarize::api_key_from_env()?;

    let mode = prompt_mode(&cli, &config)?;
    let settings = PipelineSettings::from_config(&config, cli.lang.as_deref());
    debug!("Mode: {mode:?}, settings: {settings:?}");

    let fetcher = YouTubeCaptions::new(settings.transcript_timeout)?;
    let translate_enabled = !cli.no_translate && config.translate.unwrap_or(true);
    let google_translate = if translate_enabled {
        Some(GoogleTranslate::new(settings.translation_timeout)?)
    } else {
        None
    };
    let model = cli
        .model
        .as_deref()
        .or(config.model.as_deref())
        .unwrap_or(summarize::DEFAULT_MODEL);
    let endpoint = config.endpoint.as_deref().unwrap_or(summarize::DEFAULT_ENDPOINT);
    let generator = GeminiClient::new(api_key, model, endpoint, settings.generation_timeout)?;

    let pipeline = Pipeline::new(
        &fetcher,
        google_translate.as_ref().map(|t| t as &dyn Translator),
        &generator,
        settings,
    );

    // Collect URLs: from arg or stdin
    let urls: Vec<String> = if let Some(ref url) = cli.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };
    let urls: Vec<&str> = urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()).collect();

    if urls.is_empty() {
        bail!("no URL provided\n\nUsage: ytsum <URL>\n       echo <URL> | ytsum");
    }

    let mut failed = 0;
    for url in &urls {
        let spinner = create_spinner(&format!("Summarizing {url}..."))?;
        let outcome = pipeline.run(url, &mode).await;
        spinner.finish_and_clear();

        let result = match outcome {
            Ok(result) => result,
            Err(e) if e.is_recoverable() => {
                eprintln!("{}", output::render_error(url, &e));
                failed += 1;
                continue;
            }
            Err(e) => {
                eprintln!("{}", output::render_error(url, &e));
                return Err(e.into());
            }
        };

        if cli.verbose {
            eprintln!("{}", output::render_details(&result));
        }
        println!("{}\n", output::render_markdown(&result));

        if let Some(ref path) = cli.output {
            let path = if urls.len() > 1 {
                output::export_path_for(path, &result.video_id)
            } else {
                path.clone()
            };
            output::export(&result, &path)?;
            if cli.verbose {
                eprintln!("Output written to: {}", path.display());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} request(s) failed", urls.len());
    }

    Ok(())
}
