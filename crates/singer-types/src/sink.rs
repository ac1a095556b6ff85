//! Destinations for Singer messages.

use crate::messages::Message;
use std::io::{self, Write};

/// Errors raised while writing messages.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write message: {0}")]
    Io(#[from] io::Error),
}

/// Accepts messages in emission order.
pub trait MessageSink {
    fn write_message(&mut self, message: &Message) -> Result<(), SinkError>;
}

/// Collects messages in memory.
impl MessageSink for Vec<Message> {
    fn write_message(&mut self, message: &Message) -> Result<(), SinkError> {
        self.push(message.clone());
        Ok(())
    }
}

impl<S: MessageSink + ?Sized> MessageSink for &mut S {
    fn write_message(&mut self, message: &Message) -> Result<(), SinkError> {
        (**self).write_message(message)
    }
}

/// Writes one JSON document per line, flushing after each message so that a
/// downstream target sees records as soon as they are produced.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<io::Stdout> {
    /// Sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> MessageSink for JsonLinesSink<W> {
    fn write_message(&mut self, message: &Message) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
