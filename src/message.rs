/// Display actions for whatever front-end is attached (terminal for now).
/// The core never renders anything itself; it emits these on the bus.
#[derive(Clone, Debug)]
pub enum MessageAction {
    /// A character speech bubble or status line
    Say { text: String },

    /// The current round's board: question plus candidate answers
    Board {
        question: String,
        choices: Vec<String>,
    },

    /// Updated star count after a correct answer
    Stars { count: u32 },
}

impl MessageAction {
    pub fn say(text: impl Into<String>) -> Self {
        MessageAction::Say { text: text.into() }
    }
}
