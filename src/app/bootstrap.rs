use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::{Cli, Commands};
use crate::config::{resolve_tracker_config, TrackerConfig};
use crate::error::{AppError, Context, Result, FETCH_SYMBOL_REQUIRED, START_SYMBOL_REQUIRED};
use crate::fetch::{build_provider, FetchCoordinator, QuoteProvider};
use crate::ui::{parse_command, render_table, render_view, ConsoleCommand, HELP_TEXT};
use crate::utils::current_human_timestamp;

use super::controller::SessionController;
use super::scheduler::RefreshPeriod;

/// Entry point used by `main` once arguments are parsed.
pub async fn run(cli: Cli) -> Result<()> {
    let config = resolve_tracker_config(&config_root(), cli.config.as_deref())?;
    info!(
        "using `{}` config ({} provider at {})",
        config.name,
        config.provider.kind(),
        config.provider.base_url()
    );
    let provider = build_provider(&config.provider);

    match cli.command {
        Commands::Track {
            symbol,
            minutes,
            seconds,
        } => {
            let period = period_or_default(&config, minutes.as_deref(), seconds.as_deref());
            track(provider, &symbol, period).await
        }
        Commands::Once { symbol, json } => once(provider, &symbol, json).await,
        Commands::Interactive => interactive(provider, &config).await,
    }
}

/// Descriptors are looked up beside the working directory first, then in the crate.
fn config_root() -> PathBuf {
    std::env::current_dir()
        .ok()
        .filter(|dir| dir.join("assets").join("configs").is_dir())
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).to_path_buf())
}

fn period_or_default(
    config: &TrackerConfig,
    minutes: Option<&str>,
    seconds: Option<&str>,
) -> RefreshPeriod {
    let minutes = minutes.map(str::trim).filter(|s| !s.is_empty());
    let seconds = seconds.map(str::trim).filter(|s| !s.is_empty());
    if minutes.is_none() && seconds.is_none() {
        return RefreshPeriod::new(config.refresh.minutes, config.refresh.seconds);
    }
    RefreshPeriod::from_inputs(minutes.unwrap_or_default(), seconds.unwrap_or_default())
}

fn print_view(controller: &SessionController) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "\n[{}]", current_human_timestamp())?;
    writeln!(stdout, "{}", render_view(&controller.view()))?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}

async fn track(provider: Arc<dyn QuoteProvider>, symbol: &str, period: RefreshPeriod) -> Result<()> {
    let mut controller = SessionController::new(provider);
    if controller.start_tracking_with(symbol, period).is_err() {
        return Err(AppError::message(START_SYMBOL_REQUIRED));
    }
    if period.is_repeating() {
        println!("{}", controller.auto_refresh_message());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal.context("failed to listen for Ctrl-C")?;
                controller.stop_tracking();
                break;
            }
            event = controller.next_event() => {
                let Some(event) = event else { break };
                if controller.handle_event(event).changes_view() {
                    print_view(&controller)?;
                }
                if !period.is_repeating() && !controller.is_loading() {
                    break;
                }
            }
        }
    }
    Ok(())
}

async fn once(provider: Arc<dyn QuoteProvider>, symbol: &str, json: bool) -> Result<()> {
    let coordinator = FetchCoordinator::new(provider);
    let observation = coordinator
        .fetch(symbol)
        .await
        .map_err(|err| AppError::message(err.user_message()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&observation)?);
    } else {
        println!("{}", render_table(std::slice::from_ref(&observation)));
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush().context("failed to flush stdout")?;
    Ok(())
}

async fn interactive(provider: Arc<dyn QuoteProvider>, config: &TrackerConfig) -> Result<()> {
    let mut controller = SessionController::new(provider);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("NSE tracker ({} provider). Type `help` for commands.", controller.provider_name());
    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read console input")? else {
                    break;
                };
                if !run_command(&mut controller, config, parse_command(&line))? {
                    break;
                }
                prompt()?;
            }
            Some(event) = controller.next_event() => {
                if controller.handle_event(event).changes_view() {
                    print_view(&controller)?;
                    prompt()?;
                }
            }
        }
    }

    controller.stop_tracking();
    Ok(())
}

/// Apply one console command; `false` ends the session.
fn run_command(
    controller: &mut SessionController,
    config: &TrackerConfig,
    command: ConsoleCommand,
) -> Result<bool> {
    match command {
        ConsoleCommand::Start {
            symbol,
            minutes,
            seconds,
        } => {
            controller.set_symbol_input(&symbol);
            let period = period_or_default(config, Some(&minutes), Some(&seconds));
            match controller.start_tracking_with(&symbol, period) {
                Ok(()) if controller.auto_refresh_message().is_empty() => {
                    println!("Fetching {} once.", controller.active_symbol());
                }
                Ok(()) => println!("{}", controller.auto_refresh_message()),
                Err(_) => println!("{}", START_SYMBOL_REQUIRED),
            }
        }
        ConsoleCommand::Fetch(symbol) => {
            if let Some(symbol) = symbol {
                controller.set_symbol_input(&symbol);
            }
            if controller.manual_refresh().is_err() {
                println!("{}", FETCH_SYMBOL_REQUIRED);
            }
        }
        ConsoleCommand::Stop => {
            controller.stop_tracking();
            println!("Auto-refresh stopped.");
        }
        ConsoleCommand::Show => print_view(controller)?,
        ConsoleCommand::Help => println!("{HELP_TEXT}"),
        ConsoleCommand::Quit => return Ok(false),
        ConsoleCommand::Empty => {}
        ConsoleCommand::Unknown(word) => {
            println!("Unknown command `{word}`. Type `help` for commands.");
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_tracker_config;

    fn backend_config() -> TrackerConfig {
        load_tracker_config(Path::new(env!("CARGO_MANIFEST_DIR")), "backend").unwrap()
    }

    #[test]
    fn blank_interval_uses_config_defaults() {
        let config = backend_config();
        let expected = RefreshPeriod::new(config.refresh.minutes, config.refresh.seconds);

        assert_eq!(period_or_default(&config, None, None), expected);
        assert_eq!(period_or_default(&config, Some(""), Some(" ")), expected);
        assert_eq!(
            period_or_default(&config, None, Some("7")),
            RefreshPeriod::new(0, 7)
        );
        assert_eq!(
            period_or_default(&config, Some("-2"), Some("abc")),
            RefreshPeriod::new(0, 0)
        );
    }

    #[tokio::test]
    async fn console_commands_drive_the_controller() {
        let config = backend_config();
        let provider = crate::fetch::test_support::ScriptedProvider::new();
        let mut controller = SessionController::new(provider.clone());

        let started = parse_command("start infy 0 0");
        assert!(run_command(&mut controller, &config, started).unwrap());
        assert_eq!(controller.active_symbol(), "INFY");

        let event = controller.next_event().await.unwrap();
        controller.handle_event(event);
        assert_eq!(controller.rows().symbols(), vec!["INFY"]);

        run_command(&mut controller, &config, parse_command("stop")).unwrap();
        assert_eq!(controller.active_symbol(), "");

        assert!(!run_command(&mut controller, &config, parse_command("quit")).unwrap());
        assert_eq!(provider.calls(), 1);
    }
}
