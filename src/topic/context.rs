//! Turn context handed to topics on every call

use serde_json::{Map, Value};

/// Capabilities the host exposes to topics for one turn
pub trait TurnContext {
    /// Text of the incoming message
    fn input(&self) -> &str;

    /// Queue an outgoing message. Messages are delivered in call order.
    fn send(&mut self, message: String);

    /// Conversation-scoped data owned by the host
    fn ambient(&self) -> &Map<String, Value>;

    fn ambient_mut(&mut self) -> &mut Map<String, Value>;
}

impl dyn TurnContext + '_ {
    /// Send a message, returning the context for chaining
    pub fn reply(&mut self, text: impl Into<String>) -> &mut Self {
        self.send(text.into());
        self
    }
}

/// In-process turn context: the input, an ordered outbox and the ambient data
#[derive(Debug, Clone, Default)]
pub struct Turn {
    input: String,
    outbox: Vec<String>,
    ambient: Map<String, Value>,
}

impl Turn {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            outbox: Vec::new(),
            ambient: Map::new(),
        }
    }

    pub fn with_ambient(mut self, ambient: Map<String, Value>) -> Self {
        self.ambient = ambient;
        self
    }

    /// Messages sent so far this turn
    pub fn messages(&self) -> &[String] {
        &self.outbox
    }

    /// Take the outbox, leaving the turn ready to send more
    pub fn drain_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }

    pub fn into_parts(self) -> (Vec<String>, Map<String, Value>) {
        (self.outbox, self.ambient)
    }
}

impl TurnContext for Turn {
    fn input(&self) -> &str {
        &self.input
    }

    fn send(&mut self, message: String) {
        self.outbox.push(message);
    }

    fn ambient(&self) -> &Map<String, Value> {
        &self.ambient
    }

    fn ambient_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.ambient
    }
}
