#![allow(dead_code)]

use std::sync::Arc;

use tagframe_wire::{
    BasicType, Message, MessageType, Result, Tag, Transport, TypeRegistry, Wire, WireError,
};

/// Tag-only message.
#[derive(Debug, Default, Clone, PartialEq)]
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

/// A string and a sequence number.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub seq: u32,
}

impl Message for Command {
    fn tag(&self) -> Tag {
        Self::TAG
    }

    fn write(&self, transport: &mut Transport) -> Result<()> {
        transport.write(&self.name)?;
        transport.write(&self.seq)
    }

    fn read(&mut self, transport: &mut Transport) -> Result<()> {
        self.name = transport.read()?;
        self.seq = transport.read()?;
        Ok(())
    }
}

impl MessageType for Command {
    const TAG: Tag = 1;
}

pub type Counter = BasicType<u32, 6>;

/// Composite field, written under its own checksum by [`Envelope`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reading {
    pub channel: u16,
    pub label: String,
}

impl Wire for Reading {
    fn write_to(&self, transport: &mut Transport) -> Result<()> {
        transport.write(&self.channel)?;
        transport.write(&self.label)
    }

    fn read_from(transport: &mut Transport) -> Result<Self> {
        let channel = transport.read()?;
        let label = transport.read()?;
        if channel == u16::MAX {
            return Err(WireError::Invalid("reserved channel".into()));
        }
        Ok(Self { channel, label })
    }
}

/// Nests a checksum-guarded composite that itself holds a guarded length.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Envelope {
    pub reading: Reading,
    pub scale: f64,
}

impl Message for Envelope {
    fn tag(&self) -> Tag {
        Self::TAG
    }

    fn write(&self, transport: &mut Transport) -> Result<()> {
        transport.write_checksumed(&self.reading)?;
        transport.write(&self.scale)
    }

    fn read(&mut self, transport: &mut Transport) -> Result<()> {
        self.reading = transport.read_checksumed()?;
        self.scale = transport.read()?;
        Ok(())
    }
}

impl MessageType for Envelope {
    const TAG: Tag = 9;
}

/// Tags registered by [`registry`].
pub const TEST_TAGS: [Tag; 4] = [Command::TAG, Counter::TAG, Ping::TAG, Envelope::TAG];

pub fn registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry.register_type::<Ping>("Ping", 1).unwrap();
    registry.register_type::<Command>("Command", 1).unwrap();
    registry.register_type::<Counter>("Counter", 1).unwrap();
    registry.register_type::<Envelope>("Envelope", 2).unwrap();
    Arc::new(registry)
}
