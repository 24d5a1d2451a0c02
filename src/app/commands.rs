//! Slash command system.
//!
//! The composer doubles as a command line: a draft that is a single-line
//! `/command [args]` executes instead of being sent to the backend.
//!
//! - [`SlashCommand`] defines the interface for a command
//! - [`CommandRegistry`] holds the builtins and powers prefix completion
//! - [`CommandOutcome`] tells the app what to do with the result
//!
//! Detection ([`detect_slash_token`]) drives the completion popup while
//! typing; parsing ([`parse_slash_command`]) runs on submission.

use std::path::PathBuf;

use crate::api::ChatMode;

/// Outcome of executing a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Quit the application.
    Exit,
    /// Open the mode selector overlay.
    OpenModeSelect,
    /// Switch the session to the given mode.
    SetMode(ChatMode),
    /// Upload the given file.
    Upload(PathBuf),
    /// Open the n-th citation (1-based) of the latest cited entry.
    OpenCitation(usize),
    /// Show a message in the status bar (usage hints, errors).
    Message(String),
}

/// Interface for a slash command.
pub trait SlashCommand: Send + Sync {
    /// Command name (without the leading slash).
    fn name(&self) -> &'static str;

    /// Short description for the completion popup.
    fn description(&self) -> &'static str;

    /// Executes the command with its argument text, if any.
    fn execute(&self, args: Option<&str>) -> CommandOutcome;
}

/// Registry of available slash commands.
pub struct CommandRegistry {
    commands: Vec<Box<dyn SlashCommand>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Creates a registry with all built-in commands.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ModeCommand));
        registry.register(Box::new(UploadCommand));
        registry.register(Box::new(OpenCommand));
        registry.register(Box::new(ExitCommand));
        registry
    }

    /// Registers a command.
    pub fn register(&mut self, cmd: Box<dyn SlashCommand>) {
        self.commands.push(cmd);
    }

    /// Finds a command by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&dyn SlashCommand> {
        self.commands
            .iter()
            .find(|cmd| cmd.name() == name)
            .map(AsRef::as_ref)
    }

    /// Returns all commands whose names start with the given prefix.
    #[must_use]
    pub fn matching(&self, prefix: &str) -> Vec<&dyn SlashCommand> {
        self.commands
            .iter()
            .filter(|cmd| cmd.name().starts_with(prefix))
            .map(AsRef::as_ref)
            .collect()
    }

    /// Returns all registered commands.
    #[must_use]
    pub fn all(&self) -> &[Box<dyn SlashCommand>] {
        &self.commands
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

// =============================================================================
// Built-in Commands
// =============================================================================

/// `/mode [name]`: open the mode selector, or switch directly.
pub struct ModeCommand;

impl SlashCommand for ModeCommand {
    fn name(&self) -> &'static str {
        "mode"
    }

    fn description(&self) -> &'static str {
        "Choose the chat mode (quiz, flashcards, summary, ...)"
    }

    fn execute(&self, args: Option<&str>) -> CommandOutcome {
        match args {
            None => CommandOutcome::OpenModeSelect,
            Some(name) => ChatMode::parse(name).map_or_else(
                || CommandOutcome::Message(format!("Unknown mode: {name}")),
                CommandOutcome::SetMode,
            ),
        }
    }
}

/// `/upload <path>`: upload a document to the backend.
pub struct UploadCommand;

impl SlashCommand for UploadCommand {
    fn name(&self) -> &'static str {
        "upload"
    }

    fn description(&self) -> &'static str {
        "Upload a document (use @ to pick a file)"
    }

    fn execute(&self, args: Option<&str>) -> CommandOutcome {
        match args {
            None => CommandOutcome::Message("Usage: /upload <path>".to_string()),
            Some(path) => CommandOutcome::Upload(PathBuf::from(unescape_path(path))),
        }
    }
}

/// `/open <n>`: open the n-th citation of the latest cited reply.
pub struct OpenCommand;

impl SlashCommand for OpenCommand {
    fn name(&self) -> &'static str {
        "open"
    }

    fn description(&self) -> &'static str {
        "Open a citation by number"
    }

    fn execute(&self, args: Option<&str>) -> CommandOutcome {
        match args.and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n > 0 => CommandOutcome::OpenCitation(n),
            _ => CommandOutcome::Message("Usage: /open <citation number>".to_string()),
        }
    }
}

/// `/exit`: quit the application.
pub struct ExitCommand;

impl SlashCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn description(&self) -> &'static str {
        "Exit the application"
    }

    fn execute(&self, _args: Option<&str>) -> CommandOutcome {
        CommandOutcome::Exit
    }
}

// =============================================================================
// Parsing and token detection
// =============================================================================

/// Information about a `/` token being typed.
///
/// Tracks a `/`-prefixed token the cursor is within, used to drive the
/// command completion popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashToken {
    /// The partial command name (without the leading slash).
    pub name: String,
}

/// Parses the draft to check whether it is a complete slash command.
///
/// Only a single-line draft starting with `/` qualifies; multi-line drafts
/// are always chat messages.
///
/// # Examples
///
/// ```
/// use lingo::app::commands::parse_slash_command;
///
/// assert_eq!(parse_slash_command("/exit"), Some(("exit", None)));
/// assert_eq!(parse_slash_command("/mode quiz"), Some(("mode", Some("quiz"))));
/// assert_eq!(parse_slash_command("not a command"), None);
/// assert_eq!(parse_slash_command("/"), None);
/// assert_eq!(parse_slash_command("line1\n/exit"), None);
/// ```
#[must_use]
pub fn parse_slash_command(input: &str) -> Option<(&str, Option<&str>)> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    if trimmed.contains('\n') {
        return None;
    }
    let without_slash = &trimmed[1..];
    let mut parts = without_slash.splitn(2, char::is_whitespace);
    let name = parts.next()?;
    if name.is_empty() {
        return None;
    }
    let args = parts.next().map(str::trim).filter(|s| !s.is_empty());
    Some((name, args))
}

/// Detects a slash command token being typed.
///
/// A token is only recognized when the draft is a single line, it starts
/// with `/`, and the cursor sits inside the command name (before any
/// argument); completion stops once arguments begin.
#[must_use]
pub fn detect_slash_token(
    lines: &[String],
    cursor_row: usize,
    cursor_char_col: usize,
) -> Option<SlashToken> {
    if lines.len() != 1 || cursor_row != 0 {
        return None;
    }
    let line = lines.first()?;
    let rest = line.strip_prefix('/')?;

    let name: String = rest.chars().take_while(|c| !c.is_whitespace()).collect();
    // Cursor must be within "/name" (chars 0..=1+name.chars).
    if cursor_char_col > 1 + name.chars().count() {
        return None;
    }

    Some(SlashToken { name })
}

/// Escapes spaces in a path for insertion into the draft.
///
/// The draft splits command arguments on whitespace, so inserted paths
/// escape their spaces with a backslash.
#[must_use]
pub fn escape_path(path: &str) -> String {
    path.replace(' ', "\\ ")
}

/// Reverses [`escape_path`] when consuming a command argument.
#[must_use]
pub fn unescape_path(path: &str) -> String {
    path.replace("\\ ", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parsing {
        use super::*;

        #[test]
        fn parses_bare_command() {
            assert_eq!(parse_slash_command("/exit"), Some(("exit", None)));
        }

        #[test]
        fn parses_command_with_args() {
            assert_eq!(
                parse_slash_command("/upload notes.pdf"),
                Some(("upload", Some("notes.pdf")))
            );
        }

        #[test]
        fn trims_surrounding_whitespace() {
            assert_eq!(
                parse_slash_command("  /mode quiz  "),
                Some(("mode", Some("quiz")))
            );
        }

        #[test]
        fn rejects_plain_text() {
            assert_eq!(parse_slash_command("hello"), None);
        }

        #[test]
        fn rejects_bare_slash() {
            assert_eq!(parse_slash_command("/"), None);
        }

        #[test]
        fn rejects_multiline_input() {
            assert_eq!(parse_slash_command("/exit\nmore"), None);
        }

        #[test]
        fn whitespace_only_args_are_none() {
            assert_eq!(parse_slash_command("/exit   "), Some(("exit", None)));
        }
    }

    mod detection {
        use super::*;

        fn lines(parts: &[&str]) -> Vec<String> {
            parts.iter().map(ToString::to_string).collect()
        }

        #[test]
        fn detects_partial_command() {
            let token = detect_slash_token(&lines(&["/mo"]), 0, 3).expect("token");
            assert_eq!(token.name, "mo");
        }

        #[test]
        fn detects_bare_slash_as_empty_name() {
            let token = detect_slash_token(&lines(&["/"]), 0, 1).expect("token");
            assert_eq!(token.name, "");
        }

        #[test]
        fn no_token_once_cursor_is_in_args() {
            assert!(detect_slash_token(&lines(&["/upload notes"]), 0, 13).is_none());
        }

        #[test]
        fn no_token_without_leading_slash() {
            assert!(detect_slash_token(&lines(&["mode"]), 0, 2).is_none());
        }

        #[test]
        fn no_token_on_multiline_draft() {
            assert!(detect_slash_token(&lines(&["/exit", "second"]), 0, 3).is_none());
        }
    }

    mod registry {
        use super::*;

        #[test]
        fn builtins_are_registered() {
            let registry = CommandRegistry::with_builtins();
            assert!(registry.find("mode").is_some());
            assert!(registry.find("upload").is_some());
            assert!(registry.find("open").is_some());
            assert!(registry.find("exit").is_some());
            assert!(registry.find("clear").is_none());
        }

        #[test]
        fn matching_filters_by_prefix() {
            let registry = CommandRegistry::with_builtins();
            let matches = registry.matching("o");
            assert_eq!(matches.len(), 1);
            assert_eq!(matches[0].name(), "open");

            let all = registry.matching("");
            assert_eq!(all.len(), registry.all().len());
        }
    }

    mod execution {
        use super::*;

        #[test]
        fn mode_without_args_opens_selector() {
            assert_eq!(ModeCommand.execute(None), CommandOutcome::OpenModeSelect);
        }

        #[test]
        fn mode_with_valid_name_sets_mode() {
            assert_eq!(
                ModeCommand.execute(Some("code_review")),
                CommandOutcome::SetMode(ChatMode::CodeReview)
            );
        }

        #[test]
        fn mode_with_unknown_name_is_a_message() {
            assert!(matches!(
                ModeCommand.execute(Some("essay")),
                CommandOutcome::Message(_)
            ));
        }

        #[test]
        fn upload_requires_a_path() {
            assert!(matches!(
                UploadCommand.execute(None),
                CommandOutcome::Message(_)
            ));
            assert_eq!(
                UploadCommand.execute(Some("notes.pdf")),
                CommandOutcome::Upload(PathBuf::from("notes.pdf"))
            );
        }

        #[test]
        fn upload_unescapes_spaces() {
            assert_eq!(
                UploadCommand.execute(Some("my\\ notes.pdf")),
                CommandOutcome::Upload(PathBuf::from("my notes.pdf"))
            );
        }

        #[test]
        fn open_requires_a_positive_number() {
            assert_eq!(OpenCommand.execute(Some("2")), CommandOutcome::OpenCitation(2));
            assert!(matches!(
                OpenCommand.execute(Some("0")),
                CommandOutcome::Message(_)
            ));
            assert!(matches!(
                OpenCommand.execute(Some("two")),
                CommandOutcome::Message(_)
            ));
            assert!(matches!(OpenCommand.execute(None), CommandOutcome::Message(_)));
        }

        #[test]
        fn exit_quits() {
            assert_eq!(ExitCommand.execute(None), CommandOutcome::Exit);
        }
    }

    mod escaping {
        use super::*;

        #[test]
        fn escape_and_unescape_round_trip() {
            let original = "study guide v2.pdf";
            assert_eq!(unescape_path(&escape_path(original)), original);
        }

        #[test]
        fn escape_inserts_backslashes() {
            assert_eq!(escape_path("a b"), "a\\ b");
        }
    }
}
