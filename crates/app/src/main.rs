use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use lms_core::model::QuizId;
use services::{ApiConfig, Clock, HttpBackend, InMemoryBackend, LmsBackend};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuizId { raw: String },
    DemoWithApi,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --quiz-id value: {raw}"),
            ArgsError::DemoWithApi => write!(f, "--demo cannot be combined with --api"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    backend: Arc<dyn LmsBackend>,
    clock: Clock,
    quiz_id: Option<QuizId>,
}

impl UiApp for DesktopApp {
    fn backend(&self) -> Arc<dyn LmsBackend> {
        Arc::clone(&self.backend)
    }

    fn clock(&self) -> Clock {
        self.clock
    }

    fn open_quiz_on_launch(&self) -> Option<QuizId> {
        self.quiz_id
    }
}

#[derive(Debug, Default)]
struct Args {
    api: Option<String>,
    quiz_id: Option<QuizId>,
    demo: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [ui] [--api <base_url>] [--quiz-id <id>] [--demo]");
    eprintln!();
    eprintln!("Without --api or LMS_API_BASE_URL the app runs against a built-in demo course.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LMS_API_BASE_URL, LMS_API_TOKEN, LMS_API_TIMEOUT_SECS, RUST_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => parsed.api = Some(require_value(args, "--api")?),
                "--quiz-id" => {
                    let value = require_value(args, "--quiz-id")?;
                    let quiz_id = value
                        .parse::<QuizId>()
                        .map_err(|_| ArgsError::InvalidQuizId { raw: value.clone() })?;
                    parsed.quiz_id = Some(quiz_id);
                }
                "--demo" => parsed.demo = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if parsed.demo && parsed.api.is_some() {
            return Err(ArgsError::DemoWithApi);
        }
        Ok(parsed)
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_fmt::layer())
        .init();
}

fn build_backend(args: &Args, clock: Clock) -> Result<Arc<dyn LmsBackend>, Box<dyn std::error::Error>> {
    let config = match (&args.api, args.demo) {
        (_, true) => None,
        (Some(api), false) => Some(ApiConfig::new(api)?.with_env_overrides()?),
        (None, false) => ApiConfig::from_env()?,
    };

    match config {
        Some(config) => {
            info!(base_url = %config.base_url(), "using LMS backend");
            Ok(Arc::new(HttpBackend::new(config)?))
        }
        None => {
            info!("using demo course");
            Ok(Arc::new(InMemoryBackend::sample_course(clock)))
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.first().map(String::as_str) == Some("ui") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let clock = Clock::default();
    let app = DesktopApp {
        backend: build_backend(&parsed, clock)?,
        clock,
        quiz_id: parsed.quiz_id,
    };
    let app: Arc<dyn UiApp> = Arc::new(app);
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Study")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
