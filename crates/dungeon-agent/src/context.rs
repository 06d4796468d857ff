use dungeon_core::{ConversationLog, Tone};

/// Number of recent turns written into a prompt unless configured otherwise.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Builds the narrator prompt from the tail of the conversation.
///
/// The output is deterministic: preamble, then the last `window` turns as
/// `SENDER: text` lines in log order, then the `AI:` cue.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    window: usize,
}

impl PromptBuilder {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn preamble(tone: Tone) -> String {
        format!(
            "You are an AI Dungeon Master. The story's tone is: {tone}. \
             Generate the next part of the fantasy story based on the following conversation:\n\n"
        )
    }

    pub fn build(&self, history: &ConversationLog, tone: Tone) -> String {
        let mut prompt = Self::preamble(tone);
        for turn in history.window(self.window) {
            prompt.push_str(turn.sender.prompt_label());
            prompt.push_str(": ");
            prompt.push_str(&turn.text);
            prompt.push('\n');
        }
        prompt.push_str("AI:");
        prompt
    }

    /// Rough token estimation (4 chars ≈ 1 token).
    pub fn estimated_tokens(prompt: &str) -> usize {
        prompt.len() / 4
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}
