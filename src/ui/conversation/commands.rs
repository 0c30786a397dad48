use std::str::FromStr;

use crate::events::Action;
use crate::model::Category;

use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Start a new conversation (general, code, explanation, creative, analysis)
    New,
    /// Delete the active conversation
    Delete,
    /// Switch to conversation number N
    Switch,
    /// Check the service connection
    Health,
    /// Hide the error banner
    Dismiss,
    /// Show help
    Help,
    /// Exit the application
    Quit,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub keyword: &'static str,
    pub description: &'static str,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// `/new <category> [name...]`; a bare `/new` starts a general conversation.
    pub fn new_target(&self) -> Option<(Category, Option<String>)> {
        if self.command != SlashCommand::New {
            return None;
        }

        let Some(arg) = self.argument() else {
            return Some((Category::General, None));
        };

        let mut parts = arg.trim().splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or_default();
        let category = match head.to_lowercase().as_str() {
            "g" | "chat" => Category::General,
            "c" | "coding" => Category::Code,
            "e" | "explain" => Category::Explanation,
            "w" | "write" | "writing" => Category::Creative,
            "a" | "analyze" | "analyse" => Category::Analysis,
            other => Category::from_str(other).ok()?,
        };
        let name = parts
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Some((category, name))
    }

    /// `/switch N` with N counted from 1, as shown in the sidebar.
    pub fn switch_target(&self) -> Option<usize> {
        if self.command != SlashCommand::Switch {
            return None;
        }

        let number: usize = self.argument()?.trim().parse().ok()?;
        number.checked_sub(1)
    }

    /// The state change this command asks for, if any.
    pub fn to_action(&self) -> Option<Action> {
        match self.command {
            SlashCommand::New => self
                .new_target()
                .map(|(category, name)| Action::CreateConversation { category, name }),
            SlashCommand::Delete => Some(Action::DeleteActive),
            SlashCommand::Switch => self.switch_target().map(Action::SelectIndex),
            SlashCommand::Health => Some(Action::CheckHealth),
            SlashCommand::Dismiss => Some(Action::DismissError),
            SlashCommand::Help => Some(Action::ToggleHelp),
            SlashCommand::Quit => Some(Action::Quit),
        }
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::New => {
                "start a new conversation (general, code, explanation, creative, analysis)"
            }
            SlashCommand::Delete => "delete the active conversation",
            SlashCommand::Switch => "switch to conversation number N",
            SlashCommand::Health => "check the service connection",
            SlashCommand::Dismiss => "hide the error banner",
            SlashCommand::Help => "show available commands",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Return all built-in commands in a Vec paired with their command string.
pub fn built_in_slash_commands() -> Vec<(&'static str, SlashCommand)> {
    SlashCommand::iter()
        .map(|c| (c.command(), c))
        .collect()
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim_start();
    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].split_whitespace();
    let head = parts.next()?;
    let rest: Vec<String> = parts.map(|s| s.to_string()).collect();

    let command = SlashCommand::from_str(head).ok().or_else(|| match head.to_lowercase().as_str() {
        "q" | "bye" | "exit" => Some(SlashCommand::Quit),
        "n" => Some(SlashCommand::New),
        "d" | "rm" => Some(SlashCommand::Delete),
        "s" | "sw" => Some(SlashCommand::Switch),
        "status" => Some(SlashCommand::Health),
        "h" | "?" => Some(SlashCommand::Help),
        _ => None,
    })?;

    let argument = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Available commands:\n\n");
    for (command_str, command) in built_in_slash_commands() {
        help.push_str(&format!("/{} - {}\n", command_str, command.description()));
    }

    help.push_str("\nAliases: /q for /quit, /n for /new, /d for /delete, /s for /switch, ");
    help.push_str("/h for /help");
    help.push_str("\nKeys: Enter send, Shift+Enter newline, Ctrl+N new, Ctrl+D delete, ");
    help.push_str("Alt+Up/Down or Alt+1..9 switch, Ctrl+R health, Esc dismiss, Ctrl+C quit");

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_slash_command("hello /new"), None);
        assert_eq!(parse_slash_command("/unknown thing"), None);
    }

    #[test]
    fn new_with_category_and_name() {
        let parsed = parse_slash_command("/new code Rust help").unwrap();
        assert_eq!(
            parsed.to_action(),
            Some(Action::CreateConversation {
                category: Category::Code,
                name: Some("Rust help".to_string()),
            })
        );
    }

    #[test]
    fn bare_new_starts_general_conversation() {
        let parsed = parse_slash_command("/n").unwrap();
        assert_eq!(parsed.new_target(), Some((Category::General, None)));
    }

    #[test]
    fn new_with_unknown_category_does_nothing() {
        let parsed = parse_slash_command("/new poetry").unwrap();
        assert_eq!(parsed.to_action(), None);
    }

    #[test]
    fn switch_is_one_based() {
        let parsed = parse_slash_command("/switch 2").unwrap();
        assert_eq!(parsed.to_action(), Some(Action::SelectIndex(1)));
        assert_eq!(parse_slash_command("/s 0").unwrap().switch_target(), None);
        assert_eq!(parse_slash_command("/s x").unwrap().switch_target(), None);
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(parse_slash_command("/q").unwrap().command, SlashCommand::Quit);
        assert_eq!(parse_slash_command("/exit").unwrap().command, SlashCommand::Quit);
        assert_eq!(parse_slash_command("/status").unwrap().to_action(), Some(Action::CheckHealth));
    }

    #[test]
    fn help_lists_every_command() {
        let help = get_help_text();
        for entry in command_entries() {
            assert!(help.contains(&format!("/{}", entry.keyword)));
        }
    }
}
