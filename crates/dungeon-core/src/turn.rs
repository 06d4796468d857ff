use serde::{Deserialize, Serialize};

/// Text of the AI turn seeded into an empty log before it is shown.
pub const WELCOME_TEXT: &str = "Welcome, adventurer! What quest shall we embark on today?";

/// The participant that authored a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The player.
    User,
    /// The story generator.
    Ai,
}

impl Sender {
    /// Uppercase label used when a turn is written into a prompt.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Sender::User => "USER",
            Sender::Ai => "AI",
        }
    }
}

/// A single message of the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who wrote it.
    pub sender: Sender,
    /// What was written.
    pub text: String,
}

impl Turn {
    /// Creates a turn authored by `sender`.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }

    /// Creates a turn authored by the player.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// Creates a turn authored by the AI.
    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(Sender::Ai, text)
    }

    /// The seeded welcome turn.
    pub fn welcome() -> Self {
        Self::ai(WELCOME_TEXT)
    }
}

/// Ordered, append-only list of turns. Index order is conversation order.
///
/// Appended turns are never edited in place; the only ways to shrink the log
/// are [`ConversationLog::clear`] or replacing it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn after every existing one.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Removes every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Whether the log holds no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// All turns in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The last `size` turns, or all of them if there are fewer.
    pub fn window(&self, size: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(size);
        &self.turns[start..]
    }

    /// Iterates over the turns in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Seeds the welcome turn if the log is empty. Returns whether it did.
    pub fn ensure_welcome(&mut self) -> bool {
        if self.turns.is_empty() {
            self.turns.push(Turn::welcome());
            true
        } else {
            false
        }
    }
}

impl From<Vec<Turn>> for ConversationLog {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl FromIterator<Turn> for ConversationLog {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ConversationLog {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
