//! Command grammar: free-form model text → at most one [`Command`]
//!
//! The grammar recognizes a small set of markers, checked in a fixed
//! priority order (create-table, insert-user, list-users). The first kind
//! whose marker appears anywhere in the text decides the outcome, no matter
//! where in the text the marker sits.
//!
//! | Kind | Markers (case-insensitive) | Arguments |
//! |------|----------------------------|-----------|
//! | create | `CMD:CREATE`, `CREATE_TABLE` | `table="..."` or a bare name (optional, default `users`) |
//! | insert | `CMD:INSERT`, `CMD:ADD`, `INSERT_USER` | `name="..." email="..."` |
//! | list | `CMD:LIST`, `CMD:GET`, `GET_USERS` | none |
//!
//! Arguments are `key="value"` pairs directly after the marker, separated by
//! whitespace and/or commas, optionally wrapped in parentheses. The create
//! marker also takes an unquoted table name on its own line (`TABLE staff`,
//! `table=staff`, `table='staff'`). Any other text after a marker on the same
//! line makes the command malformed rather than falling back to a default:
//!
//! ```
//! use dbassist_domain::command::{Command, CommandGrammar};
//!
//! let grammar = CommandGrammar::new();
//! assert_eq!(
//!     grammar.parse(r#"INSERT_USER(name="Bob", email="bob@x.com")"#),
//!     Some(Command::insert_user("Bob", "bob@x.com"))
//! );
//! assert_eq!(grammar.parse("Hello, how can I help?"), None);
//! ```

use super::entities::Command;
use crate::tool::catalog::ToolKind;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static CREATE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bCMD:\s*CREATE\b|\bCREATE_TABLE\b").expect("static pattern")
});

static INSERT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bCMD:\s*(?:INSERT|ADD)\b|\bINSERT_USER\b").expect("static pattern")
});

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bCMD:\s*(?:LIST|GET)\b|\bGET_USERS\b").expect("static pattern")
});

/// One `key="value"` pair at the start of the remaining text.
static ARGUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[\s,(]*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*"([^"]*)""#).expect("static pattern")
});

/// Unquoted table name filling the rest of the create marker's line.
static BARE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^(?:table(?:_name)?(?:\s*[=:]\s*|\s+))?(['"]?)([A-Za-z0-9_]+)(['"]?)$"#)
        .expect("static pattern")
});

/// Result of classifying a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A complete command
    Command(Command),
    /// Insert intent without any arguments; name and email must be obtained
    /// from the operator
    InsertNeedsDetails,
    /// A marker was present but its arguments could not be used
    Malformed { kind: ToolKind, reason: String },
    /// No marker at all: a conversational reply
    NoCommand,
}

impl ParseOutcome {
    pub fn into_command(self) -> Option<Command> {
        match self {
            ParseOutcome::Command(command) => Some(command),
            _ => None,
        }
    }
}

/// Ordered-pattern matcher for model replies.
#[derive(Debug, Clone)]
pub struct CommandGrammar {
    interactive_insert: bool,
}

impl Default for CommandGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandGrammar {
    pub fn new() -> Self {
        Self {
            interactive_insert: true,
        }
    }

    /// Whether an argument-less insert marker asks the operator for details.
    /// When disabled it is reported as malformed instead.
    pub fn with_interactive_insert(mut self, enabled: bool) -> Self {
        self.interactive_insert = enabled;
        self
    }

    /// Extract a complete command, if any.
    pub fn parse(&self, text: &str) -> Option<Command> {
        self.classify(text).into_command()
    }

    /// Classify a reply, keeping track of why no command was produced.
    pub fn classify(&self, text: &str) -> ParseOutcome {
        if let Some(m) = CREATE_MARKER.find(text) {
            return classify_create(&text[m.end()..]);
        }

        if let Some(m) = INSERT_MARKER.find(text) {
            return self.classify_insert(&text[m.end()..]);
        }

        if LIST_MARKER.is_match(text) {
            return ParseOutcome::Command(Command::ListUsers);
        }

        ParseOutcome::NoCommand
    }

    fn classify_insert(&self, rest: &str) -> ParseOutcome {
        let args = parse_arguments(rest);

        if args.is_empty() {
            if !is_blank(first_line(rest)) {
                return malformed_insert("name and email must be written as key=\"value\"");
            }
            if !self.interactive_insert {
                return malformed_insert("no name or email given");
            }
            return ParseOutcome::InsertNeedsDetails;
        }

        let field = |key: &str| {
            args.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        match (field("name"), field("email")) {
            (Some(name), Some(email)) => ParseOutcome::Command(Command::insert_user(name, email)),
            (None, Some(_)) => malformed_insert("missing name"),
            (Some(_), None) => malformed_insert("missing email"),
            (None, None) => malformed_insert("missing name and email"),
        }
    }
}

fn classify_create(rest: &str) -> ParseOutcome {
    let args = parse_arguments(rest);
    if let Some(table) = args.get("table").or_else(|| args.get("table_name")) {
        return ParseOutcome::Command(Command::create_table(table));
    }

    let line = first_line(rest)
        .trim()
        .trim_end_matches(['.', ',', ';', '!', '?', ')'])
        .trim_start_matches([':', ',', '('])
        .trim();
    if line.is_empty() || line.eq_ignore_ascii_case("table") {
        return ParseOutcome::Command(Command::create_table(""));
    }

    match BARE_TABLE.captures(line) {
        Some(caps) if caps.get(1).map(|q| q.as_str()) == caps.get(3).map(|q| q.as_str()) => {
            let table = caps.get(2).map(|t| t.as_str()).unwrap_or_default();
            ParseOutcome::Command(Command::create_table(table))
        }
        _ => ParseOutcome::Malformed {
            kind: ToolKind::CreateTable,
            reason: format!("unrecognized table argument: {}", line),
        },
    }
}

fn first_line(rest: &str) -> &str {
    rest.lines().next().unwrap_or_default()
}

/// Nothing but whitespace and punctuation
fn is_blank(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || (c.is_ascii_punctuation() && c != '"' && c != '\''))
}

fn malformed_insert(reason: &str) -> ParseOutcome {
    ParseOutcome::Malformed {
        kind: ToolKind::InsertUser,
        reason: reason.to_string(),
    }
}

/// Collect consecutive `key="value"` pairs from the start of `rest`.
///
/// Keys are lowercased; the first occurrence of a key wins.
fn parse_arguments(rest: &str) -> HashMap<String, String> {
    let mut args = HashMap::new();
    let mut remaining = rest;

    while let Some(caps) = ARGUMENT.captures(remaining) {
        let (Some(whole), Some(key), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };
        args.entry(key.as_str().to_ascii_lowercase())
            .or_insert_with(|| value.as_str().to_string());
        remaining = &remaining[whole.end()..];
    }

    args
}
