use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voice_front::api::{ApiServer, ApiState};
use voice_front::command::Utterance;
use voice_front::{
    Config, KeywordResponder, Responder, Speech, SpeechWorker, Transcript, VoiceCommandNormalizer,
};

/// Voice front end - wake words, intents and speech for AI assistants
#[derive(Parser)]
#[command(name = "voice-front", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Don't speak responses, even if enabled in config
    #[arg(long, env = "VOICE_MUTE", global = true)]
    mute: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (default)
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Speak text through the configured backend
    Say {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
        /// Voice to use, by position in `voices`
        #[arg(long)]
        voice: Option<usize>,
    },
    /// List voices of the active speech backend
    Voices {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Normalize an utterance and print the result as JSON
    Normalize {
        /// Utterance to normalize
        utterance: String,
    },
    /// Normalize an utterance and print the assistant's answer
    Respond {
        /// Utterance to answer
        utterance: String,
        /// Also speak the answer
        #[arg(long)]
        speak: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voice_front=info",
        1 => "info,voice_front=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if cli.mute {
        config.voice.speak = false;
        tracing::info!("speech muted via --mute");
    }

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => serve(config, host, port).await,
        Command::Say { text, voice } => say(&config, &text, voice).await,
        Command::Voices { json } => list_voices(&config, json).await,
        Command::Normalize { utterance } => normalize(&config, &utterance),
        Command::Respond { utterance, speak } => respond(&config, &utterance, speak).await,
    }
}

/// Start the speech worker for a configuration
async fn start_speech(config: &Config) -> anyhow::Result<SpeechWorker> {
    let voice = config.voice.clone();
    let worker = SpeechWorker::start(move || Speech::from_config(&voice, &Transcript::stdout())).await?;
    Ok(worker)
}

async fn serve(config: Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let speech = if config.voice.speak {
        Some(Arc::new(start_speech(&config).await?))
    } else {
        tracing::info!("speech disabled, responses are text only");
        None
    };

    let responder: Arc<dyn Responder> = Arc::new(KeywordResponder::default());
    let state = Arc::new(ApiState::new(&config, responder, speech)?);

    tracing::info!(
        agent = %config.assistant.name,
        wake_words = ?config.assistant.wake_words,
        speak = config.voice.speak,
        listen = config.voice.listen,
        "starting voice front end"
    );

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    ApiServer::new(state, host, port).run().await?;

    tracing::info!("voice front end stopped");
    Ok(())
}

async fn say(config: &Config, text: &str, voice: Option<usize>) -> anyhow::Result<()> {
    let worker = start_speech(config).await?;
    let status = worker.status();
    println!(
        "Speaking with {} ({:?}{})",
        status.backend,
        status.state,
        if status.using_fallback { ", fallback" } else { "" }
    );

    let outcome = worker.speak(text, voice).await;
    tracing::debug!(?outcome, "say finished");
    Ok(())
}

async fn list_voices(config: &Config, json: bool) -> anyhow::Result<()> {
    let worker = start_speech(config).await?;
    let voices = &worker.status().voices;

    if json {
        println!("{}", serde_json::to_string_pretty(voices)?);
        return Ok(());
    }

    if voices.is_empty() {
        println!("No voices available from {}", worker.status().backend);
        return Ok(());
    }

    for voice in voices {
        let languages: Vec<&str> = voice.language_tags.iter().map(String::as_str).collect();
        println!(
            "{:>3}  {:<32} {}",
            voice.index,
            voice.display_name,
            languages.join(", ")
        );
    }
    Ok(())
}

fn normalizer_for(config: &Config) -> anyhow::Result<VoiceCommandNormalizer> {
    Ok(VoiceCommandNormalizer::new(
        config.assistant.wake_words.clone(),
        config.assistant.confirmation_phrases.clone(),
    )?)
}

fn normalize(config: &Config, utterance: &str) -> anyhow::Result<()> {
    let command = normalizer_for(config)?.normalize(&Utterance::new(utterance));
    println!("{}", serde_json::to_string_pretty(&command)?);
    Ok(())
}

async fn respond(config: &Config, utterance: &str, speak: bool) -> anyhow::Result<()> {
    let command = normalizer_for(config)?.normalize(&Utterance::new(utterance));
    let answer = KeywordResponder::default().respond(&command.stripped_text);
    println!("{answer}");

    if speak && config.voice.speak {
        start_speech(config).await?.speak(answer, None).await;
    }
    Ok(())
}
