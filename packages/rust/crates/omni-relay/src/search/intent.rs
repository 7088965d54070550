/// Appended to search queries to keep results on the chat platform.
pub const SEARCH_SCOPE_SUFFIX: &str = " site:t.me";

const SEARCH_TRIGGER_STEMS: &[&str] = &[
    "найд", "найти", "поиск", "ищи", "канал", "find", "search", "channel",
];

/// Whether the message asks to look something up (find / search / channel).
pub fn is_search_intent(text: &str) -> bool {
    let lowered = text.to_lowercase();
    SEARCH_TRIGGER_STEMS
        .iter()
        .any(|stem| lowered.contains(stem))
}

pub fn scoped_query(text: &str) -> String {
    format!("{}{}", text.trim(), SEARCH_SCOPE_SUFFIX)
}
