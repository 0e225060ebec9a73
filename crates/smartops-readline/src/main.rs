mod command;
mod helper;
mod render;

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use smartops_application::ConsoleUseCase;
use smartops_core::console::{ConsoleState, Notice};
use smartops_core::speech::{SilentSpeech, SpeechInput, SpeechOutput};
use smartops_core::SmartOpsError;
use smartops_core::config::ConsoleConfig;
use smartops_execution::tracing_layer::DispatchEventLayer;
use smartops_infrastructure::logging::BoxedLayer;
use smartops_infrastructure::{ConfigOverrides, ConfigService, SmartOpsPaths, init_logging};
use smartops_interaction::{CommandSpeechInput, CommandSpeechOutput, HttpOperationService};

use command::ReplCommand;
use helper::CliHelper;

const GREETING: &str = "Neural Core Online. Standing by for operations.";
const PROMPT: &str = ">> ";

#[derive(Parser)]
#[command(name = "smartops")]
#[command(about = "SmartOps - review, edit and execute natural-language operations", long_about = None)]
struct Cli {
    /// Base URL of the operations API, e.g. http://127.0.0.1:8000/api/v1
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Start with voice output on
    #[arg(long)]
    voice: bool,

    /// Config file to use instead of ~/.config/smartops/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Prints conversation messages that have not been shown yet.
struct Transcript {
    shown: Mutex<usize>,
}

impl Transcript {
    fn new() -> Self {
        Self {
            shown: Mutex::new(0),
        }
    }

    fn print_new(&self, state: &ConsoleState) {
        let mut shown = self.shown.lock().unwrap_or_else(PoisonError::into_inner);
        let messages = state.conversation().messages();
        for message in messages.iter().skip(*shown) {
            render::print_message(message);
        }
        *shown = messages.len();
    }
}

fn print_error(err: &SmartOpsError) {
    if err.is_busy() {
        eprintln!("{}", "Busy: wait for the current operation to finish.".yellow());
    } else {
        eprintln!("{}", format!("Error: {err}").red());
    }
}

async fn report(
    console: &ConsoleUseCase,
    transcript: &Transcript,
    result: smartops_core::Result<Vec<Notice>>,
) {
    transcript.print_new(&console.snapshot().await);
    match result {
        Ok(notices) => notices.iter().for_each(render::print_notice),
        Err(err) => {
            tracing::debug!("command rejected: {err}");
            print_error(&err);
        }
    }
}

/// Runs a network-bound operation in the background so the prompt stays
/// usable; the busy flag in the console state rejects overlapping submissions.
fn spawn_operation<F, Fut>(console: &Arc<ConsoleUseCase>, transcript: &Arc<Transcript>, operation: F)
where
    F: FnOnce(Arc<ConsoleUseCase>) -> Fut + Send + 'static,
    Fut: Future<Output = smartops_core::Result<Vec<Notice>>> + Send + 'static,
{
    let console = Arc::clone(console);
    let transcript = Arc::clone(transcript);
    tokio::spawn(async move {
        let result = operation(Arc::clone(&console)).await;
        report(&console, &transcript, result).await;
    });
}

fn build_speech(config: &ConsoleConfig) -> (Arc<dyn SpeechOutput>, Arc<dyn SpeechInput>) {
    let output: Arc<dyn SpeechOutput> = match config.speech.tts_command.as_deref() {
        Some(command) => match CommandSpeechOutput::new(command) {
            Ok(output) => Arc::new(output),
            Err(err) => {
                tracing::warn!("text-to-speech disabled: {err}");
                Arc::new(SilentSpeech)
            }
        },
        None => Arc::new(SilentSpeech),
    };
    let input: Arc<dyn SpeechInput> = match config.speech.stt_command.as_deref() {
        Some(command) => match CommandSpeechInput::new(command) {
            Ok(input) => Arc::new(input),
            Err(err) => {
                tracing::warn!("speech-to-text disabled: {err}");
                Arc::new(SilentSpeech)
            }
        },
        None => Arc::new(SilentSpeech),
    };
    (output, input)
}

fn build_service(config: &ConsoleConfig) -> Result<HttpOperationService> {
    Ok(match config.request_timeout_secs {
        Some(secs) => HttpOperationService::with_timeout(
            config.api_base_url.clone(),
            std::time::Duration::from_secs(secs),
        )?,
        None => HttpOperationService::new(config.api_base_url.clone()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Configuration =====
    let overrides = ConfigOverrides::from_env().merge(ConfigOverrides {
        api_base_url: cli.api_url,
        log_level: None,
        voice: cli.voice.then_some(true),
    });
    let config_service = ConfigService::new(cli.config, overrides)?;
    let config = config_service.get_config()?;

    // ===== Logging =====
    let (dispatch_layer, mut dispatch_rx) = DispatchEventLayer::channel();
    let _logging_guard = match SmartOpsPaths::default().log_dir() {
        Ok(log_dir) => {
            match init_logging(&log_dir, &config.log_level, vec![Box::new(dispatch_layer) as BoxedLayer]) {
                Ok(guard) => Some(guard),
                Err(err) => {
                    eprintln!("{}", format!("Logging disabled: {err}").yellow());
                    None
                }
            }
        }
        Err(err) => {
            eprintln!("{}", format!("Logging disabled: {err}").yellow());
            None
        }
    };
    tracing::info!(api = %config.api_base_url, "starting smartops");

    tokio::spawn(async move {
        while let Some(event) = dispatch_rx.recv().await {
            render::print_dispatch_event(&event);
        }
    });

    // ===== Backend =====
    let service = Arc::new(build_service(&config)?);
    let (speech_out, speech_in) = build_speech(&config);
    let console = Arc::new(
        ConsoleUseCase::new(service)
            .with_speech(speech_out, speech_in)
            .with_history_limit(config.history_limit)
            .with_state(ConsoleState::with_greeting(GREETING).with_voice(config.speech.enabled)),
    );
    let transcript = Arc::new(Transcript::new());

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== SMART.OPS ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Backend: {}. Type /help for commands, 'quit' to exit.", config.api_base_url)
            .bright_black()
    );
    transcript.print_new(&console.snapshot().await);
    for notice in console.refresh_history().await {
        render::print_notice(&notice);
    }
    println!();

    let mut dictated: Option<String> = None;

    // ===== Main REPL Loop =====
    loop {
        let readline = match dictated.take() {
            Some(text) => rl.readline_with_initial(PROMPT, (&text, "")),
            None => rl.readline(PROMPT),
        };

        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let command = match command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{}", err.to_string().yellow());
                continue;
            }
        };

        match command {
            ReplCommand::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            ReplCommand::Help => render::print_help(),
            ReplCommand::Analyze(text) => {
                spawn_operation(&console, &transcript, move |console| async move {
                    console.submit_command(&text).await
                });
            }
            ReplCommand::ShowPlan => {
                let state = console.snapshot().await;
                render::print_plan(state.plan(), &console.preflight().await);
            }
            ReplCommand::Set {
                index,
                key,
                value,
                nested,
            } => {
                let result = console.edit_parameter(index, &key, &value, nested).await;
                let ok = result.is_ok();
                report(&console, &transcript, result).await;
                if ok {
                    let state = console.snapshot().await;
                    render::print_plan(state.plan(), &console.preflight().await);
                }
            }
            ReplCommand::Approve => {
                spawn_operation(&console, &transcript, |console| async move {
                    console.approve_plan().await
                });
            }
            ReplCommand::Retry => {
                spawn_operation(&console, &transcript, |console| async move {
                    console.retry_plan().await
                });
            }
            ReplCommand::Cancel => {
                let result = console.cancel_plan().await;
                report(&console, &transcript, result).await;
            }
            ReplCommand::History => {
                spawn_operation(&console, &transcript, |console| async move {
                    let notices = console.refresh_history().await;
                    render::print_history(console.snapshot().await.history().entries());
                    Ok(notices)
                });
            }
            ReplCommand::Edit(id) => {
                let result = console.load_for_edit(id).await;
                report(&console, &transcript, result).await;
                let state = console.snapshot().await;
                if state.plan().is_proposed() {
                    render::print_plan(state.plan(), &console.preflight().await);
                }
            }
            ReplCommand::Delete(id) => {
                spawn_operation(&console, &transcript, move |console| async move {
                    Ok(console.delete_history_entry(id).await)
                });
            }
            ReplCommand::Voice => {
                let result = console.toggle_voice().await;
                report(&console, &transcript, result).await;
            }
            ReplCommand::Listen => {
                println!("{}", "Listening...".bright_black());
                match console.listen().await {
                    Some(text) => dictated = Some(text),
                    None => println!("{}", "Nothing heard.".bright_black()),
                }
            }
        }
    }

    tracing::info!("smartops stopped");
    Ok(())
}
