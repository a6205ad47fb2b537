//! Interactive client execution.
//!
//! Reads lines with rustyline on a blocking thread and drives a
//! [`CollabSession`]. Plain lines are sent as comments; lines starting with
//! `/` are commands.

use std::sync::Arc;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    config::SessionConfig,
    error::ClientError,
    formatter::MessageFormatter,
    session::{CollabSession, ConnectionState, SessionEvent},
    transport::WebSocketConnector,
    ui::{prompt, redisplay_prompt},
};

const HELP: &str = "\
Commands:
  <text>              send a comment
  /solution <code>    share your current solution
  /who                show the members of the room
  /log                show the activity log
  /quit               leave the room and exit
";

/// 入力行の解釈結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Comment(String),
    Solution(String),
    Who,
    Log,
    Help,
    Quit,
    Unknown(String),
}

/// 入力行をコマンドに変換する
pub fn parse_command(line: &str) -> Option<InputCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(command) = line.strip_prefix('/') else {
        return Some(InputCommand::Comment(line.to_string()));
    };

    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command, ""),
    };

    let parsed = match name {
        "solution" | "s" if !argument.is_empty() => InputCommand::Solution(argument.to_string()),
        "who" | "w" => InputCommand::Who,
        "log" | "l" => InputCommand::Log,
        "help" | "h" => InputCommand::Help,
        "quit" | "q" | "exit" => InputCommand::Quit,
        _ => InputCommand::Unknown(line.to_string()),
    };
    Some(parsed)
}

/// Spawn a blocking thread for rustyline (synchronous readline)
fn spawn_readline(username: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };
        let prompt = prompt(&username);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// Run the interactive client until the user quits or reconnection gives up
pub async fn run_client(config: SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    let username = config.username.clone();
    let user_id = config.user_id;
    let max_reconnect_attempts = config.max_reconnect_attempts;

    let (session, mut events) = CollabSession::start(config, Arc::new(WebSocketConnector::new()));
    let mut input = spawn_readline(username.clone());

    println!(
        "\nYou are '{}'. Type a comment and press Enter to send, /help for commands.\n",
        username
    );

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    SessionEvent::StateChanged(ConnectionState::Failed) => {
                        session.wait().await;
                        return Err(Box::new(ClientError::ReconnectExhausted {
                            attempts: max_reconnect_attempts,
                        }));
                    }
                    SessionEvent::StateChanged(state) => {
                        tracing::debug!("Connection state: {:?}", state);
                    }
                    SessionEvent::RosterChanged(roster) => {
                        print!("{}", MessageFormatter::format_roster(&roster, user_id));
                        redisplay_prompt(&username);
                    }
                    SessionEvent::Activity(envelope) => {
                        if let Some(text) = MessageFormatter::format_activity(&envelope) {
                            print!("{}", text);
                            redisplay_prompt(&username);
                        }
                    }
                    SessionEvent::Notice(notice) => {
                        print!("{}", MessageFormatter::format_notice(&notice));
                        redisplay_prompt(&username);
                    }
                }
            }
            line = input.recv() => {
                let Some(line) = line else {
                    // stdin closed
                    break;
                };
                let Some(command) = parse_command(&line) else { continue };
                match command {
                    InputCommand::Comment(comment) => {
                        // A rejected send is reported through a notice event
                        let _ = session.send_comment(comment).await;
                    }
                    InputCommand::Solution(solution) => {
                        let _ = session.send_solution(solution).await;
                    }
                    InputCommand::Who => {
                        print!("{}", MessageFormatter::format_roster(&session.roster().await, user_id));
                        redisplay_prompt(&username);
                    }
                    InputCommand::Log => {
                        for envelope in session.activity().await {
                            if let Some(text) = MessageFormatter::format_activity(&envelope) {
                                print!("{}", text);
                            }
                        }
                        redisplay_prompt(&username);
                    }
                    InputCommand::Help => {
                        print!("{}", HELP);
                        redisplay_prompt(&username);
                    }
                    InputCommand::Quit => break,
                    InputCommand::Unknown(raw) => {
                        print!("{}", MessageFormatter::format_notice(&format!("unknown command: {}", raw)));
                        redisplay_prompt(&username);
                    }
                }
            }
        }
    }

    session.disconnect().await;
    session.wait().await;
    tracing::info!("Client session ended normally");
    Ok(())
}
