//! Sentinel command parsing and construction.
//!
//! A line whose first whitespace-delimited token starts with [`SENTINEL`]
//! is a command; anything else is chat text. [`CommandRef`] borrows from
//! the received line and is what the server dispatches on. [`Command`] is
//! the owned, typed form clients build and serialize with `Display`.
//!
//! # Grammar
//!
//! ```text
//! #login <id> <password>
//! #private <id> <words...>
//! #create <channel>
//! #join <channel>
//! #leave
//! #displayChannels
//! #select <id>
//! #back
//! #retrieve
//! ```

use std::fmt;

use crate::error::CommandParseError;

/// Character that marks a line as a command.
pub const SENTINEL: char = '#';

/// First whitespace-delimited token of a line, if any.
#[inline]
pub fn first_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// Whether a line is a sentinel command.
#[inline]
pub fn is_sentinel(line: &str) -> bool {
    first_token(line).is_some_and(|t| t.starts_with(SENTINEL))
}

/// A command borrowed from a received line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRef<'a> {
    name: &'a str,
    args: Vec<&'a str>,
}

impl<'a> CommandRef<'a> {
    /// Parse a line. Returns `None` when the line is not a sentinel command.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next()?.strip_prefix(SENTINEL)?;
        Some(Self {
            name,
            args: tokens.collect(),
        })
    }

    /// Command name without the sentinel (case preserved).
    #[inline]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Argument at `index`, if present.
    #[inline]
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied()
    }

    /// All arguments.
    #[inline]
    pub fn args(&self) -> &[&'a str] {
        &self.args
    }

    /// Arguments from `index` onward joined with single spaces.
    ///
    /// Returns `None` when there are no arguments at or after `index`.
    pub fn text_from(&self, index: usize) -> Option<String> {
        let rest = self.args.get(index..)?;
        if rest.is_empty() {
            None
        } else {
            Some(rest.join(" "))
        }
    }
}

/// A typed command, as built by a client.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    /// `#login <id> <password>`
    Login {
        /// Login id to authenticate or register.
        login_id: String,
        /// Password, compared case-insensitively by the server.
        password: String,
    },
    /// `#private <id> <words...>`
    Private {
        /// Login id of the recipient.
        target: String,
        /// Message text.
        text: String,
    },
    /// `#create <channel>`
    Create(String),
    /// `#join <channel>`
    Join(String),
    /// `#leave`
    Leave,
    /// `#displayChannels`
    DisplayChannels,
    /// `#select <id>`
    Select(String),
    /// `#back`
    Back,
    /// `#retrieve`
    Retrieve,
}

impl Command {
    /// Wire name of the command without the sentinel.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Private { .. } => "private",
            Command::Create(_) => "create",
            Command::Join(_) => "join",
            Command::Leave => "leave",
            Command::DisplayChannels => "displayChannels",
            Command::Select(_) => "select",
            Command::Back => "back",
            Command::Retrieve => "retrieve",
        }
    }

    /// Parse an owned command from a line.
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let cmd = CommandRef::parse(line).ok_or(CommandParseError::NotACommand)?;
        Self::try_from(&cmd)
    }
}

fn required<'a>(
    cmd: &CommandRef<'a>,
    index: usize,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandParseError> {
    cmd.arg(index)
        .ok_or(CommandParseError::MissingArgument { command, argument })
}

impl TryFrom<&CommandRef<'_>> for Command {
    type Error = CommandParseError;

    fn try_from(cmd: &CommandRef<'_>) -> Result<Self, Self::Error> {
        Ok(match cmd.name() {
            "login" => Command::Login {
                login_id: required(cmd, 0, "login", "login id")?.to_owned(),
                password: required(cmd, 1, "login", "password")?.to_owned(),
            },
            "private" => Command::Private {
                target: required(cmd, 0, "private", "recipient")?.to_owned(),
                text: cmd.text_from(1).ok_or(CommandParseError::MissingArgument {
                    command: "private",
                    argument: "message text",
                })?,
            },
            "create" => Command::Create(required(cmd, 0, "create", "channel name")?.to_owned()),
            "join" => Command::Join(required(cmd, 0, "join", "channel name")?.to_owned()),
            "leave" => Command::Leave,
            "displayChannels" => Command::DisplayChannels,
            "select" => Command::Select(required(cmd, 0, "select", "login id")?.to_owned()),
            "back" => Command::Back,
            "retrieve" => Command::Retrieve,
            other => return Err(CommandParseError::UnknownCommand(other.to_owned())),
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SENTINEL, self.name())?;
        match self {
            Command::Login { login_id, password } => write!(f, " {} {}", login_id, password),
            Command::Private { target, text } => write!(f, " {} {}", target, text),
            Command::Create(channel) | Command::Join(channel) => write!(f, " {}", channel),
            Command::Select(login_id) => write!(f, " {}", login_id),
            Command::Leave | Command::DisplayChannels | Command::Back | Command::Retrieve => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login() {
        let cmd = CommandRef::parse("#login alice secret").unwrap();
        assert_eq!(cmd.name(), "login");
        assert_eq!(cmd.arg(0), Some("alice"));
        assert_eq!(cmd.arg(1), Some("secret"));
        assert_eq!(cmd.arg(2), None);
    }

    #[test]
    fn test_chat_is_not_a_command() {
        assert!(CommandRef::parse("hello there").is_none());
        assert!(CommandRef::parse("").is_none());
        assert!(CommandRef::parse("   ").is_none());
        assert!(!is_sentinel("say #this"));
    }

    #[test]
    fn test_parse_collapses_whitespace() {
        let cmd = CommandRef::parse("  #private   bob   hi    there ").unwrap();
        assert_eq!(cmd.name(), "private");
        assert_eq!(cmd.args(), &["bob", "hi", "there"]);
        assert_eq!(cmd.text_from(1).as_deref(), Some("hi there"));
    }

    #[test]
    fn test_text_from_out_of_range() {
        let cmd = CommandRef::parse("#private bob").unwrap();
        assert_eq!(cmd.text_from(1), None);
        assert_eq!(cmd.text_from(7), None);
    }

    #[test]
    fn test_name_is_case_sensitive() {
        let cmd = CommandRef::parse("#DisplayChannels").unwrap();
        assert_eq!(
            Command::try_from(&cmd),
            Err(CommandParseError::UnknownCommand("DisplayChannels".into()))
        );
        assert_eq!(
            Command::parse("#displayChannels"),
            Ok(Command::DisplayChannels)
        );
    }

    #[test]
    fn test_missing_arguments() {
        assert_eq!(
            Command::parse("#login alice"),
            Err(CommandParseError::MissingArgument {
                command: "login",
                argument: "password"
            })
        );
        assert!(matches!(
            Command::parse("#private bob"),
            Err(CommandParseError::MissingArgument { command: "private", .. })
        ));
        assert!(matches!(
            Command::parse("#join"),
            Err(CommandParseError::MissingArgument { command: "join", .. })
        ));
    }

    #[test]
    fn test_display_builds_wire_lines() {
        let cmd = Command::Private {
            target: "bob".into(),
            text: "lunch at noon?".into(),
        };
        assert_eq!(cmd.to_string(), "#private bob lunch at noon?");
        assert_eq!(Command::Create("lobby".into()).to_string(), "#create lobby");
        assert_eq!(Command::DisplayChannels.to_string(), "#displayChannels");
        assert_eq!(Command::Back.to_string(), "#back");
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("  #leave now"), Some("#leave"));
        assert_eq!(first_token(""), None);
    }
}
