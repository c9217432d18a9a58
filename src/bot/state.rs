use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Per-chat conversation state. Anything other than `Idle` means the next
/// plain-text message is an answer to a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChatState {
    #[default]
    Idle,
    AwaitingQuestion {
        speech_id: i64,
    },
    AwaitingCompany,
    AwaitingPosition {
        company: String,
    },
    AwaitingExperience {
        company: String,
        position: String,
    },
}

pub type ChatDialogue = Dialogue<ChatState, InMemStorage<ChatState>>;
