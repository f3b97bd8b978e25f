//! Demo message set.
//!
//! A small set of message types for exercising a link end to end: a
//! tag-only ping, a text command with a sequence number, and single-value
//! messages for each common scalar.

use tagframe_wire::{
    read_string_bounded, BasicType, Message, MessageType, Result, Tag, Transport, TypeRegistry,
    WireError,
};

/// Longest command accepted by [`TextCommand`].
pub const MAX_COMMAND_LEN: usize = 256;

/// Tag-only liveness probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ping;

impl Message for Ping {
    fn tag(&self) -> Tag {
        Self::TAG
    }

    fn write(&self, _transport: &mut Transport) -> Result<()> {
        Ok(())
    }

    fn read(&mut self, _transport: &mut Transport) -> Result<()> {
        Ok(())
    }
}

impl MessageType for Ping {
    const TAG: Tag = 7;
}

/// A text command and the sender's sequence number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextCommand {
    pub command: String,
    pub seq: u32,
}

impl TextCommand {
    pub fn new(command: impl Into<String>, seq: u32) -> Self {
        Self {
            command: command.into(),
            seq,
        }
    }
}

impl Message for TextCommand {
    fn tag(&self) -> Tag {
        Self::TAG
    }

    fn write(&self, transport: &mut Transport) -> Result<()> {
        if self.command.len() > MAX_COMMAND_LEN {
            return Err(WireError::FieldTooLong {
                len: self.command.len(),
                max: MAX_COMMAND_LEN,
            });
        }
        transport.write(&self.command)?;
        transport.write(&self.seq)
    }

    fn read(&mut self, transport: &mut Transport) -> Result<()> {
        self.command = read_string_bounded(transport, MAX_COMMAND_LEN)?;
        self.seq = transport.read()?;
        Ok(())
    }
}

impl MessageType for TextCommand {
    const TAG: Tag = 1;
}

pub type UnsignedValue = BasicType<u32, 6>;
pub type SignedValue = BasicType<i32, 3>;
pub type FloatValue = BasicType<f32, 2>;

/// Registry holding every demo type, all enabled.
pub fn demo_registry() -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry.register_type::<TextCommand>("TextCommand", 1)?;
    registry.register_type::<UnsignedValue>("UnsignedValue", 1)?;
    registry.register_type::<SignedValue>("SignedValue", 1)?;
    registry.register_type::<Ping>("Ping", 1)?;
    registry.register_type::<FloatValue>("FloatValue", 1)?;
    Ok(registry)
}

/// One-line rendering of a message's fields.
///
/// Types outside the demo set fall back to their `Debug` output.
pub fn describe(message: &dyn Message) -> String {
    if message.is::<Ping>() {
        return String::new();
    }
    if let Some(text) = message.downcast_ref::<TextCommand>() {
        return format!("seq={} command={:?}", text.seq, text.command);
    }
    if let Some(value) = message.downcast_ref::<UnsignedValue>() {
        return value.value.to_string();
    }
    if let Some(value) = message.downcast_ref::<SignedValue>() {
        return value.value.to_string();
    }
    if let Some(value) = message.downcast_ref::<FloatValue>() {
        return value.value.to_string();
    }
    format!("{message:?}")
}
