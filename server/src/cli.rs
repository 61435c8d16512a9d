//! The line-based operator console (spec.md §6): `new`, `start <id>
//! <init_word>`, `load <id>`, `disconnect <id> <player>`, `q`.
//!
//! stdin is blocking, so it is read on a dedicated thread via
//! [`tokio::task::spawn_blocking`] and forwarded to the async world
//! over an unbounded channel — the only non-event-loop thread this
//! server runs, mirroring the teacher's `_cmd` thread in the original
//! engine.

use std::io::BufRead;
use tokio::sync::mpsc;

/// One parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `new` — allocate a fresh, empty game.
    New,
    /// `start <id> <init_word>` — deal hands and start the game.
    Start { game_id: u64, init_word: String },
    /// `load <id>` — replay a game's event log from disk.
    Load { game_id: u64 },
    /// `disconnect <id> <player>` — force-drop a live connection.
    Disconnect { game_id: u64, player: String },
    /// `q` — shut the server down.
    Quit,
}

/// Parses one line of operator input. Unrecognised or malformed
/// lines produce a human-readable error rather than panicking.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["q"] => Ok(Command::Quit),
        ["new"] => Ok(Command::New),
        ["start", id, init_word] => {
            let game_id = id.parse().map_err(|_| format!("not a game id: {id}"))?;
            Ok(Command::Start {
                game_id,
                init_word: init_word.to_string(),
            })
        }
        ["load", id] => {
            let game_id = id.parse().map_err(|_| format!("not a game id: {id}"))?;
            Ok(Command::Load { game_id })
        }
        ["disconnect", id, player] => {
            let game_id = id.parse().map_err(|_| format!("not a game id: {id}"))?;
            Ok(Command::Disconnect {
                game_id,
                player: player.to_string(),
            })
        }
        [] => Err("empty command".to_string()),
        _ => Err(format!("unrecognised command: {line}")),
    }
}

/// Spawns the blocking stdin reader and returns a channel of parsed
/// commands. Lines that fail to parse are logged and skipped rather
/// than forwarded.
pub fn spawn_reader() -> mpsc::UnboundedReceiver<Command> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(line.trim()) {
                Ok(command) => {
                    let is_quit = command == Command::Quit;
                    if tx.send(command).is_err() || is_quit {
                        break;
                    }
                }
                Err(err) => log::warn!("{err}"),
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_new() {
        assert_eq!(parse_command("new"), Ok(Command::New));
    }

    #[test]
    fn parses_start() {
        assert_eq!(
            parse_command("start 42 hello"),
            Ok(Command::Start { game_id: 42, init_word: "hello".into() })
        );
    }

    #[test]
    fn parses_load() {
        assert_eq!(parse_command("load 7"), Ok(Command::Load { game_id: 7 }));
    }

    #[test]
    fn parses_disconnect() {
        assert_eq!(
            parse_command("disconnect 7 alice"),
            Ok(Command::Disconnect { game_id: 7, player: "alice".into() })
        );
    }

    #[test]
    fn parses_quit() {
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_id() {
        assert!(parse_command("load abc").is_err());
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(parse_command("frobnicate").is_err());
    }
}
