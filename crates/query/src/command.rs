//! Routing of raw chat text to an entry point.

/// What a message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`: greeting plus usage
    Start,
    /// `/help`
    Help,
    /// `/more`: next page of the stored results
    More,
    /// Everything else, including `/<category> ...` commands.
    /// Holds the text with the command trigger removed.
    Query(String),
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        let Some(rest) = text.strip_prefix('/') else {
            return match text.to_lowercase().as_str() {
                "more" => Command::More,
                "help" => Command::Help,
                _ => Command::Query(text.to_string()),
            };
        };

        let (head, tail) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));
        // Group chats address commands as `/more@SomeBot`.
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "more" => Command::More,
            _ => Command::Query(format!("{name} {}", tail.trim()).trim_end().to_string()),
        }
    }
}
