/// One line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start {
        symbol: String,
        minutes: String,
        seconds: String,
    },
    /// Fetch once; a symbol replaces the symbol field first.
    Fetch(Option<String>),
    Stop,
    Show,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  start <SYMBOL> [MINUTES] [SECONDS]  track a symbol, refreshing on the given interval
  fetch [SYMBOL]                      fetch a quote once without touching tracking
  stop                                stop auto-refresh (rows are kept)
  show                                print the current table
  help                                show this message
  quit                                exit";

pub fn parse_command(line: &str) -> ConsoleCommand {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return ConsoleCommand::Empty;
    };

    let mut arg = || parts.next().unwrap_or_default().to_string();
    match head.to_lowercase().as_str() {
        "start" | "track" => ConsoleCommand::Start {
            symbol: arg(),
            minutes: arg(),
            seconds: arg(),
        },
        "fetch" | "once" => {
            let symbol = arg();
            ConsoleCommand::Fetch((!symbol.is_empty()).then_some(symbol))
        }
        "stop" => ConsoleCommand::Stop,
        "show" | "ls" => ConsoleCommand::Show,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => ConsoleCommand::Unknown(other.to_string()),
    }
}
