use clap::{Parser, Subcommand};
use dialogflow_middleware::{DialogflowMiddleware, Message, PatternSet, PatternSpec};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dfmw")]
#[command(about = "Annotate chat messages with Dialogflow intents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run one message through the middleware and print the annotated message as JSON.
    Detect {
        /// Config file path (default: DIALOGFLOW_CONFIG_PATH or ~/.dialogflow-middleware/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Message text
        #[arg(long, short)]
        text: String,

        /// Language code (default "en")
        #[arg(long)]
        lang: Option<String>,

        /// Message type (checked against ignoreType)
        #[arg(long = "type", value_name = "TYPE")]
        message_type: Option<String>,

        #[arg(long, default_value = "cli-user")]
        user: String,

        #[arg(long, default_value = "cli")]
        channel: String,
    },

    /// Annotate each stdin line interactively; /exit or /quit to stop.
    Chat {
        /// Config file path (default: DIALOGFLOW_CONFIG_PATH or ~/.dialogflow-middleware/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Language code (default "en")
        #[arg(long)]
        lang: Option<String>,

        #[arg(long, default_value = "cli-user")]
        user: String,

        #[arg(long, default_value = "cli")]
        channel: String,

        /// Intent patterns to test with `hears` (literal; prefix with `re:` for a regex)
        #[arg(long = "hears", value_name = "PATTERN")]
        hears: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("dfmw {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Detect {
            config,
            text,
            lang,
            message_type,
            user,
            channel,
        }) => {
            let mut message = Message::new(text)
                .with_field("user", user)
                .with_field("channel", channel);
            message.lang = lang;
            message.message_type = message_type;
            if let Err(e) = run_detect(config, message).await {
                log::error!("detect failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat {
            config,
            lang,
            user,
            channel,
            hears,
        }) => {
            if let Err(e) = run_chat(config, lang, user, channel, hears).await {
                log::error!("chat failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn build_middleware(config_path: Option<PathBuf>) -> anyhow::Result<DialogflowMiddleware> {
    let (config, path) = dialogflow_middleware::config::load_config(config_path)?;
    log::debug!("loaded config from {}", path.display());
    Ok(DialogflowMiddleware::new(config)?)
}

async fn run_detect(config_path: Option<PathBuf>, mut message: Message) -> anyhow::Result<()> {
    let middleware = build_middleware(config_path)?;
    let outcome = middleware.process(&mut message).await?;
    log::info!("outcome: {:?}", outcome);
    println!("{}", serde_json::to_string_pretty(&message)?);
    Ok(())
}

/// `re:<expr>` is a regex, anything else a literal.
fn parse_hears(patterns: Vec<String>) -> anyhow::Result<PatternSet> {
    let specs = patterns.into_iter().map(|p| match p.strip_prefix("re:") {
        Some(expr) => PatternSpec::regex(expr),
        None => PatternSpec::Literal(p),
    });
    Ok(PatternSet::compile(specs)?)
}

async fn run_chat(
    config_path: Option<PathBuf>,
    lang: Option<String>,
    user: String,
    channel: String,
    hears: Vec<String>,
) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let middleware = build_middleware(config_path)?;
    let hears = parse_hears(hears)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        let mut message = Message::new(input)
            .with_field("user", user.as_str())
            .with_field("channel", channel.as_str());
        message.lang = lang.clone();

        let mut failure = None;
        middleware
            .receive(&mut message, |err| failure = err)
            .await;
        if let Some(e) = failure {
            eprintln!("dialogflow error: {}", e);
            continue;
        }

        println!(
            "< intent={} confidence={:.2}",
            message.intent.as_deref().unwrap_or("-"),
            message.confidence.unwrap_or(0.0)
        );
        if !message.entities.is_empty() {
            println!("< entities={}", serde_json::Value::Object(message.entities.clone()));
        }
        if let Some(speech) = message
            .fulfillment
            .as_ref()
            .map(|f| f.speech.trim())
            .filter(|s| !s.is_empty())
        {
            println!("< {}", speech);
        }
        if !hears.is_empty() {
            println!("< hears={}", middleware.hears(&hears, &message));
        }
    }

    Ok(())
}
