//! Command parsing: trigger-prefixed text into a structured command.

use chat_client::Event;

/// Broadcast/mention markers stripped before command parsing.
///
/// Processed in this order on every pass; the bare colon is intentionally
/// last so `"@channel :!vote"` unwraps the mention before the colon.
const MARKERS: [&str; 4] = ["@channel", "@here", "@everyone", ":"];

/// Iteratively strip recognized markers from the front of `text`.
///
/// A marker is removed only on a strict prefix match, and each removal
/// drops at least one character, so this terminates. Text with no leading
/// marker comes back unchanged.
pub fn strip_markers(mut text: &str) -> &str {
    'pass: loop {
        for marker in MARKERS {
            if let Some(rest) = text.strip_prefix(marker) {
                text = rest.trim_start();
                continue 'pass;
            }
        }
        return text;
    }
}

/// A parsed command extracted from a message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command name, without the trigger prefix.
    pub name: String,
    /// Trailing argument text, trimmed; `""` when nothing followed the name.
    pub arg: String,
    /// Channel the triggering message was posted in.
    pub channel: String,
    /// User who posted the triggering message.
    pub user: String,
}

impl Command {
    /// Parse a message event's text as a trigger-prefixed command.
    ///
    /// Returns `None` when the event has no text, the stripped text does
    /// not start with `trigger`, or no command name follows the trigger.
    /// Text without the trigger is ordinary chat, not an error.
    pub fn parse(event: &Event, trigger: &str) -> Option<Self> {
        let text = event.text.as_deref()?;
        let body = strip_markers(text).strip_prefix(trigger)?;

        let (name, arg) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body.trim_end(), ""),
        };
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            arg: arg.to_string(),
            channel: event.channel.clone(),
            user: event.user.clone(),
        })
    }

    /// Whether a non-empty argument followed the command name.
    ///
    /// Whitespace-only trailing content counts as no argument; the
    /// distinction between "no argument token" and "empty argument" is
    /// deliberately collapsed here.
    pub fn has_arg(&self) -> bool {
        !self.arg.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> Event {
        Event::message("C042", "U9", text, "1503435956.000111")
    }

    fn parse(text: &str) -> Option<Command> {
        Command::parse(&message(text), "!")
    }

    #[test]
    fn plain_command_with_argument() {
        let cmd = parse("!vote Should we do this?").unwrap();
        assert_eq!(cmd.name, "vote");
        assert_eq!(cmd.arg, "Should we do this?");
        assert_eq!(cmd.channel, "C042");
        assert_eq!(cmd.user, "U9");
        assert!(cmd.has_arg());
    }

    #[test]
    fn command_without_argument_has_no_arg() {
        let cmd = parse("!vote").unwrap();
        assert_eq!(cmd.name, "vote");
        assert_eq!(cmd.arg, "");
        assert!(!cmd.has_arg());
    }

    #[test]
    fn whitespace_only_trailing_content_has_no_arg() {
        let cmd = parse("!vote   ").unwrap();
        assert_eq!(cmd.name, "vote");
        assert!(!cmd.has_arg());
    }

    #[test]
    fn ordinary_chat_is_not_a_command() {
        assert_eq!(parse("just talking about voting"), None);
    }

    #[test]
    fn bare_trigger_is_not_a_command() {
        assert_eq!(parse("!"), None);
        assert_eq!(parse("!   "), None);
    }

    #[test]
    fn stacked_markers_are_fully_unwrapped() {
        let cmd = parse("@channel :!vote yes").unwrap();
        assert_eq!(cmd.name, "vote");
        assert_eq!(cmd.arg, "yes");
    }

    #[test]
    fn markers_strip_in_any_order_and_repetition() {
        for text in [
            "@here @channel !vote yes",
            "@everyone @everyone !vote yes",
            ":@channel !vote yes",
            "@channel @here @everyone : !vote yes",
        ] {
            let cmd = parse(text).unwrap_or_else(|| panic!("failed on {text:?}"));
            assert_eq!(cmd.name, "vote");
            assert_eq!(cmd.arg, "yes");
        }
    }

    #[test]
    fn stripping_marker_free_text_is_identity() {
        for text in ["hello world", "!vote yes", "nothing here", ""] {
            assert_eq!(strip_markers(text), text);
        }
    }

    #[test]
    fn marker_in_the_middle_is_left_alone() {
        assert_eq!(strip_markers("vote @channel now"), "vote @channel now");
    }

    #[test]
    fn event_without_text_is_not_a_command() {
        let event = Event {
            event_type: "member_joined_channel".into(),
            text: None,
            channel: "C042".into(),
            user: "U9".into(),
            ts: "1.0".into(),
        };
        assert_eq!(Command::parse(&event, "!"), None);
    }

    #[test]
    fn custom_trigger_prefix() {
        let event = message("~vote yes");
        let cmd = Command::parse(&event, "~").unwrap();
        assert_eq!(cmd.name, "vote");
        assert_eq!(cmd.arg, "yes");
    }
}
