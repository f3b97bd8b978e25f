use std::fmt::Debug;

use crate::codec::Wire;
use crate::error::Result;
use crate::message::{Message, MessageType, Tag};
use crate::transport::Transport;

/// A message carrying a single value, tagged `ID`.
///
/// ```
/// use tagframe_wire::{BasicType, MessageType};
///
/// type Speed = BasicType<f32, 2>;
/// assert_eq!(Speed::TAG, 2);
/// assert_eq!(Speed::new(1.5).value, 1.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BasicType<T, const ID: u8> {
    pub value: T,
}

impl<T, const ID: u8> BasicType<T, ID> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, const ID: u8> Message for BasicType<T, ID>
where
    T: Wire + Debug + Send + 'static,
{
    fn tag(&self) -> Tag {
        ID
    }

    fn write(&self, transport: &mut Transport) -> Result<()> {
        transport.write(&self.value)
    }

    fn read(&mut self, transport: &mut Transport) -> Result<()> {
        self.value = transport.read()?;
        Ok(())
    }
}

impl<T, const ID: u8> MessageType for BasicType<T, ID>
where
    T: Wire + Default + Debug + Send + 'static,
{
    const TAG: Tag = ID;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tagframe_device::MemoryDevice;

    use super::*;
    use crate::registry::TypeRegistry;

    #[test]
    fn tag_comes_from_const_parameter() {
        assert_eq!(BasicType::<u32, 6>::default().tag(), 6);
        assert_eq!(<BasicType<i32, 3> as MessageType>::TAG, 3);
    }

    #[test]
    fn string_payload_roundtrip() {
        type Note = BasicType<String, 40>;

        let mut registry = TypeRegistry::new();
        registry.register_type::<Note>("Note", 1).unwrap();
        let mut transport = Transport::new(MemoryDevice::loopback(), Arc::new(registry));
        transport.start();

        transport.write_object(&Note::new("hello".to_string())).unwrap();
        let decoded = transport.read_object().unwrap().downcast::<Note>().unwrap();
        assert_eq!(decoded.into_inner(), "hello");
    }
}
