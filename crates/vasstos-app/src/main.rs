//! VASSTOS Assist terminal binary - composition root.
//!
//! 1. Parse CLI args and load configuration from TOML
//! 2. Initialize tracing on stderr
//! 3. Build the API service and the speech player
//! 4. Run the chat loop over stdin until `/quit` or EOF

mod cli;
mod output;
mod repl;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use vasstos_audio::AudioPlayer;
use vasstos_chat::{
    ChatError, ConversationBackend, ConversationController, GeminiService, PendingTurn,
    TurnOutcome,
};
use vasstos_core::config::VasstosConfig;
use vasstos_core::types::ConversationResult;

use cli::CliArgs;
use repl::Command;

type Completion = (PendingTurn, Result<ConversationResult, ChatError>);

/// Run the reply call on its own task and report back on `done`.
fn spawn_reply(
    turn: PendingTurn,
    backend: Arc<dyn ConversationBackend>,
    done: mpsc::UnboundedSender<Completion>,
) {
    tokio::spawn(async move {
        let outcome = turn.run(backend.as_ref()).await;
        // The receiver lives as long as the chat loop.
        let _ = done.send((turn, outcome));
    });
}

/// Synthesize and play one message without blocking the chat loop.
fn spawn_speech(
    text: String,
    controller: &ConversationController,
    backend: Arc<dyn ConversationBackend>,
    player: Arc<AudioPlayer>,
) {
    let language = controller.state().language();
    tokio::spawn(async move {
        let Some(bytes) = backend.synthesize_speech(&text, language).await else {
            println!("(speech unavailable)");
            return;
        };
        match player.play_pcm(&bytes) {
            Ok(true) => tracing::debug!(bytes = bytes.len(), "Speech started"),
            Ok(false) => tracing::info!("Speech skipped, another clip is playing"),
            Err(e) => tracing::warn!(error = %e, "Speech playback failed"),
        }
    });
}

fn print_chips(controller: &ConversationController) {
    let chips = repl::render_chips(controller.suggestions());
    if !chips.is_empty() {
        println!("{}", chips);
    }
}

/// Print the last message and the chips after a turn completes.
fn print_reply(controller: &ConversationController) {
    if let Some(msg) = controller.messages().last() {
        println!("\n{}\n", repl::render_reply(msg));
    }
    print_chips(controller);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing so the file can set the log level.
    let config_file = args.resolve_config_path();
    let loaded = VasstosConfig::load(&config_file);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => VasstosConfig::default(),
    };
    args.apply_overrides(&mut config)?;

    // Tracing goes to stderr so it stays out of the transcript.
    let filter = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting VASSTOS Assist v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(_) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Config not loaded, using defaults"
        ),
    }

    // Service.
    let api_key = config.api.resolve_api_key().ok_or_else(|| {
        format!(
            "no API key: set {} (or API_KEY) in the environment",
            config.api.api_key_env
        )
    })?;
    let backend: Arc<dyn ConversationBackend> =
        Arc::new(GeminiService::new(&config.api, api_key)?);

    // Speech.
    let player = Arc::new(AudioPlayer::new(
        output::select_sink(args.save_audio.clone()),
        config.audio.playback_mode,
    ));

    let conversation = config.conversation();
    tracing::info!(
        variant = %conversation.variant,
        language = %conversation.language,
        use_search = conversation.use_search,
        "Conversation ready"
    );
    let mut controller = ConversationController::new(conversation);

    println!("{}\n", repl::render_reply(&controller.messages()[0]));
    print_chips(&controller);
    println!("\n(/help for commands)");

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some((turn, outcome)) = done_rx.recv() => {
                match controller.complete_turn(turn, outcome) {
                    TurnOutcome::Answered | TurnOutcome::Failed => print_reply(&controller),
                    TurnOutcome::Discarded => {}
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match repl::parse(&line) {
                    Command::Empty => {}
                    Command::Quit => break,
                    Command::Help => println!("{}", repl::HELP),
                    Command::History => {
                        println!("{}", repl::render_history(controller.messages()))
                    }
                    Command::Invalid(reason) => println!("{}", reason),
                    Command::Send(text) => {
                        controller.set_input(text);
                        match controller.begin_from_input() {
                            Ok(turn) => spawn_reply(turn, Arc::clone(&backend), done_tx.clone()),
                            Err(e) if e.is_validation() => {}
                            Err(e) => println!("{}", e),
                        }
                    }
                    Command::Chip(index) => match controller.begin_suggestion(index) {
                        Ok(turn) => {
                            if let Some(question) = turn.history().last() {
                                println!("> {}", question.content);
                            }
                            spawn_reply(turn, Arc::clone(&backend), done_tx.clone());
                        }
                        Err(e) if e.is_validation() => {}
                        Err(e) => println!("{}", e),
                    },
                    Command::Lang(target) => {
                        let language = target
                            .unwrap_or_else(|| controller.state().language().toggled());
                        match controller.switch_language(language) {
                            Ok(()) => {
                                println!("\n{}\n", repl::render_reply(&controller.messages()[0]));
                                print_chips(&controller);
                            }
                            Err(e) => println!("{}", e),
                        }
                    }
                    Command::Search(enabled) => {
                        controller.set_use_search(enabled);
                        println!("(search {})", if enabled { "on" } else { "off" });
                    }
                    Command::Speak(index) => {
                        if !config.audio.enabled {
                            println!("(audio is disabled in the configuration)");
                            continue;
                        }
                        let index = index.or_else(|| controller.latest_assistant_index());
                        let Some(index) = index else { continue };
                        match controller.speech_target(index) {
                            Ok(text) => spawn_speech(
                                text.to_string(),
                                &controller,
                                Arc::clone(&backend),
                                Arc::clone(&player),
                            ),
                            Err(e) => println!("{}", e),
                        }
                    }
                }
            }
        }
    }

    tracing::info!("Goodbye");
    Ok(())
}
