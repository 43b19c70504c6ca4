//! Suggested questions shown before the conversation starts.

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

/// A canned question the user can pick instead of typing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// 1-based position in the suggestion list
    #[serde(alias = "questionId")]
    pub id: u32,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Terminal; set by the first pick and never undone
    Hidden,
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionDispatcher {
    suggestions: Vec<Suggestion>,
    visibility: Visibility,
}

impl SuggestionDispatcher {
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        Self {
            suggestions,
            visibility: Visibility::Visible,
        }
    }

    pub fn all(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Suggestions are only offered on an empty conversation that never had one picked
    pub fn visible(&self, message_count: usize) -> bool {
        self.visibility == Visibility::Visible && message_count == 0 && !self.suggestions.is_empty()
    }

    /// Look up suggestion `id` and hide the list for good
    pub fn choose(&mut self, id: u32) -> Result<String> {
        let index = usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .ok_or(ChatError::UnknownSuggestion(id))?;
        let text = self
            .suggestions
            .get(index)
            .map(|s| s.text.clone())
            .ok_or(ChatError::UnknownSuggestion(id))?;

        self.visibility = Visibility::Hidden;
        Ok(text)
    }
}
