use std::any::Any;
use std::fmt;

use crate::error::Result;
use crate::transport::Transport;

/// One-byte type tag identifying a message type on the wire.
pub type Tag = u8;

/// Type-erased access to a message's concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A payload that can be framed by a [`Transport`].
///
/// The message owns none of the framing: it writes and reads its own fields,
/// in a fixed order, through the transport's primitives. Both callbacks must
/// visit the same fields in the same order.
pub trait Message: AsAny + Send + fmt::Debug {
    /// Tag written into the frame header.
    fn tag(&self) -> Tag;

    /// Serialize the fields.
    fn write(&self, transport: &mut Transport) -> Result<()>;

    /// Deserialize the fields into `self`, a blank instance.
    fn read(&mut self, transport: &mut Transport) -> Result<()>;
}

/// A message type with a static tag and a blank constructor, ready to be
/// registered with [`TypeRegistry::register_type`](crate::TypeRegistry::register_type).
pub trait MessageType: Message + Default {
    const TAG: Tag;
}

impl dyn Message {
    /// Whether the message is a `T`.
    pub fn is<T: Message>(&self) -> bool {
        <dyn Message as AsAny>::as_any(self).is::<T>()
    }

    /// Borrow the message as a `T`.
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        <dyn Message as AsAny>::as_any(self).downcast_ref::<T>()
    }

    /// Mutably borrow the message as a `T`.
    pub fn downcast_mut<T: Message>(&mut self) -> Option<&mut T> {
        <dyn Message as AsAny>::as_any_mut(self).downcast_mut::<T>()
    }

    /// Take ownership of the message as a `T`.
    pub fn downcast<T: Message>(self: Box<Self>) -> Option<Box<T>> {
        <dyn Message as AsAny>::into_any(self).downcast::<T>().ok()
    }
}
