//! Input line parsing and transcript rendering for the terminal front end.

use std::fmt::Write as _;

use vasstos_core::types::{Language, Message, Role};

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to send as a question.
    Send(String),
    /// Send suggestion chip at this 0-based index.
    Chip(usize),
    /// Speak the assistant message at this 0-based index, or the latest.
    Speak(Option<usize>),
    /// Switch to this language, or toggle when `None`.
    Lang(Option<Language>),
    Search(bool),
    History,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  <text>           ask a question
  #N               send suggestion N
  /speak [N]       read message N aloud (default: latest answer)
  /lang [pt|en]    switch language (resets the conversation)
  /search on|off   toggle web-search grounding
  /history         show the conversation
  /help            show this help
  /quit            exit";

/// Parse one input line. Numbers typed by the user are 1-based.
pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    if let Some(n) = line.strip_prefix('#') {
        return match one_based(n) {
            Some(index) => Command::Chip(index),
            None => Command::Invalid(format!("not a suggestion number: {}", n)),
        };
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Command::Send(line.to_string());
    };
    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();

    match (name, arg) {
        ("quit" | "exit" | "q", _) => Command::Quit,
        ("help" | "h" | "?", _) => Command::Help,
        ("history", _) => Command::History,
        ("speak", None) => Command::Speak(None),
        ("speak", Some(n)) => match one_based(n) {
            Some(index) => Command::Speak(Some(index)),
            None => Command::Invalid(format!("not a message number: {}", n)),
        },
        ("lang", None) => Command::Lang(None),
        ("lang", Some(code)) => match code.parse::<Language>() {
            Ok(language) => Command::Lang(Some(language)),
            Err(e) => Command::Invalid(e.to_string()),
        },
        ("search", Some("on")) => Command::Search(true),
        ("search", Some("off")) => Command::Search(false),
        ("search", _) => Command::Invalid("usage: /search on|off".to_string()),
        _ => Command::Invalid(format!("unknown command: /{}", name)),
    }
}

fn one_based(s: &str) -> Option<usize> {
    s.trim().parse::<usize>().ok()?.checked_sub(1)
}

/// An assistant reply with its numbered citations.
pub fn render_reply(message: &Message) -> String {
    let mut out = message.content.clone();
    if let Some(sources) = &message.sources {
        out.push('\n');
        for (i, source) in sources.iter().enumerate() {
            let _ = write!(out, "\n  [{}] {} <{}>", i + 1, source.title, source.uri);
        }
    }
    out
}

/// Numbered suggestion chips, or an empty string when there are none.
pub fn render_chips(suggestions: &[String]) -> String {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| format!("  #{} {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The whole log, one numbered entry per message.
pub fn render_history(messages: &[Message]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let who = match m.role {
                Role::User => "you",
                Role::Assistant => "assistant",
                Role::System => "system",
            };
            format!("{:>3}. {}: {}", i + 1, who, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ===== Tests =====
