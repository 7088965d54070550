/// Sent to chats other than the allow-listed one.
pub const REFUSAL_MESSAGE: &str = "⛔ Я работаю только с владельцем.";

const START_REPLY: &str = "Я Клер. Просто напиши задачу.";

/// Commands answered locally, without a completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCommand {
    Start,
    WhoAmI,
}

impl RelayCommand {
    /// Matches `/start`, `start` and `/whoami`, case-insensitively. A `@botname` suffix on a
    /// slash command is ignored (group chats append it).
    pub fn parse(text: &str) -> Option<Self> {
        let lowered = text.trim().to_lowercase();
        let token = match lowered.strip_prefix('/') {
            Some(rest) => rest.split_once('@').map_or(rest, |(name, _)| name),
            None if lowered == "start" => return Some(Self::Start),
            None => return None,
        };
        match token {
            "start" => Some(Self::Start),
            "whoami" => Some(Self::WhoAmI),
            _ => None,
        }
    }

    pub fn reply(self, chat_id: i64) -> String {
        match self {
            Self::Start => START_REPLY.to_string(),
            Self::WhoAmI => format!("Твой chat_id: {chat_id}"),
        }
    }
}
