use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when a conversation is shown to staff.
    pub fn staff_label(self) -> &'static str {
        match self {
            Self::User => "Customer",
            Self::Assistant => "AI",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Renders turns chronologically as `Customer: ...` / `AI: ...` paragraphs.
pub fn transcript(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.staff_label(), turn.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// First standalone run of 10 or 11 digits in any customer turn.
pub fn find_phone_number(history: &[ConversationTurn]) -> Option<String> {
    history
        .iter()
        .filter(|turn| turn.role == Role::User)
        .find_map(|turn| standalone_digit_run(&turn.content, 10..=11))
}

fn standalone_digit_run(text: &str, lengths: std::ops::RangeInclusive<usize>) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut index = 0;

    while index < chars.len() {
        if !chars[index].is_ascii_digit() {
            index += 1;
            continue;
        }

        let start = index;
        while index < chars.len() && chars[index].is_ascii_digit() {
            index += 1;
        }

        let bounded_left = start == 0 || !is_word_char(chars[start - 1]);
        let bounded_right = index == chars.len() || !is_word_char(chars[index]);
        if bounded_left && bounded_right && lengths.contains(&(index - start)) {
            return Some(chars[start..index].iter().collect());
        }
    }

    None
}

fn is_word_char(character: char) -> bool {
    character.is_alphanumeric() || character == '_'
}
