mod common;

use std::sync::Arc;

use common::{registry, Command, Counter, Envelope, Ping, Reading};
use tagframe_device::{Device, MemoryDevice};
use tagframe_wire::{
    header_checksum, LinkState, Message, Tag, Transport, TransportConfig, TypeRegistry,
    WireError, SYNC_BYTE,
};

fn started(device: impl Device + 'static) -> Transport {
    let mut transport = Transport::new(device, registry());
    assert_eq!(transport.start(), LinkState::WaitingSync);
    transport
}

fn encode(messages: &[&dyn Message]) -> Vec<u8> {
    let mut transport = started(MemoryDevice::loopback());
    for message in messages {
        transport.write_object(*message).unwrap();
    }
    let mut out = Vec::new();
    let mut byte = [0u8; 1];
    while transport.device_mut().read_exact(&mut byte).is_ok() {
        out.push(byte[0]);
    }
    out
}

#[test]
fn ping_decodes_from_literal_bytes() {
    let stream = [SYNC_BYTE, 0x07, 255u8.wrapping_sub(7).wrapping_sub(SYNC_BYTE), 0x00];
    let mut transport = started(MemoryDevice::new(stream));

    let message = transport.read_object().expect("ping");
    assert!(message.is::<Ping>());
    assert_eq!(message.tag(), 7);
    assert_eq!(transport.state(), LinkState::WaitingSync);
}

#[test]
fn corrupted_tag_is_skipped_and_next_frame_recovered() {
    let mut stream = encode(&[&Ping, &Ping]);
    stream[1] = 0xFE;

    let mut transport = started(MemoryDevice::new(stream));
    assert!(transport.read_object().unwrap().is::<Ping>());

    let stats = transport.stats();
    assert_eq!(stats.frames_read, 1);
    assert_eq!(stats.header_rejects, 1);
    // sync, bad tag, header sum, trailer of the broken frame
    assert_eq!(stats.bytes_discarded, 4);

    assert!(transport.read_object().is_none());
    assert_eq!(transport.state(), LinkState::Error);
}

#[test]
fn back_to_back_frames_of_different_types() {
    let command = Command {
        name: "arm".to_string(),
        seq: 17,
    };
    let stream = encode(&[&command, &Counter::new(99), &Ping]);

    let mut transport = started(MemoryDevice::new(stream));
    let first = transport.read_object().unwrap();
    assert_eq!(first.downcast_ref::<Command>(), Some(&command));
    let second = transport.read_object().unwrap();
    assert_eq!(second.downcast_ref::<Counter>().unwrap().value, 99);
    assert!(transport.read_object().unwrap().is::<Ping>());

    assert_eq!(transport.stats().bytes_discarded, 0);
    assert_eq!(transport.stats().header_rejects, 0);
}

#[test]
fn nested_guarded_fields_roundtrip() {
    let envelope = Envelope {
        reading: Reading {
            channel: 3,
            label: "pressure".to_string(),
        },
        scale: 0.125,
    };
    let stream = encode(&[&envelope]);

    let mut transport = started(MemoryDevice::new(stream));
    let decoded = transport.read_object().unwrap().downcast::<Envelope>().unwrap();
    assert_eq!(*decoded, envelope);
}

#[test]
fn corrupt_guarded_field_drops_frame_then_recovers() {
    let envelope = Envelope {
        reading: Reading {
            channel: 0x0102,
            label: "x".to_string(),
        },
        scale: 1.0,
    };
    let mut stream = encode(&[&envelope]);
    // first byte of the channel field
    stream[3] = stream[3].wrapping_add(1);
    stream.extend(encode(&[&Ping]));

    let mut transport = started(MemoryDevice::new(stream));
    let err = transport.try_read_object().unwrap_err();
    assert!(matches!(err, WireError::ChecksumMismatch { .. }));
    assert_eq!(transport.state(), LinkState::WaitingSync);

    let mut recovered = None;
    while recovered.is_none() && transport.is_running() {
        recovered = transport.read_object();
    }
    assert!(recovered.unwrap().is::<Ping>());
}

#[test]
fn field_validation_failure_is_corruption() {
    let envelope = Envelope {
        reading: Reading {
            channel: u16::MAX,
            label: String::new(),
        },
        scale: 2.0,
    };
    let stream = encode(&[&envelope, &Ping]);

    let mut transport = started(MemoryDevice::new(stream));
    let err = transport.try_read_object().unwrap_err();
    assert!(matches!(err, WireError::Invalid(_)));
    assert!(err.is_corruption());
    assert_eq!(transport.stats().decode_failures, 1);

    let mut recovered = None;
    while recovered.is_none() && transport.is_running() {
        recovered = transport.read_object();
    }
    assert!(recovered.unwrap().is::<Ping>());
}

#[test]
fn swapped_peers_agree() {
    let config = TransportConfig::with_endianness(tagframe_wire::Endianness::Swap);
    let mut writer = Transport::with_config(MemoryDevice::loopback(), registry(), config);
    writer.start();
    writer.write_object(&Counter::new(0xA1B2_C3D4)).unwrap();

    let decoded = writer.read_object().unwrap();
    assert_eq!(decoded.downcast_ref::<Counter>().unwrap().value, 0xA1B2_C3D4);
}

#[test]
fn mismatched_byte_order_is_not_silently_accepted_for_strings() {
    let command = Command {
        name: "go".to_string(),
        seq: 1,
    };
    let stream = encode(&[&command]);

    let config = TransportConfig::with_endianness(tagframe_wire::Endianness::Swap);
    let mut reader = Transport::with_config(MemoryDevice::new(stream), registry(), config);
    reader.start();
    // the length prefix sum still checks out, but the swapped length is huge
    let err = reader.try_read_object().unwrap_err();
    assert!(matches!(err, WireError::FieldTooLong { .. }));
}

#[test]
fn oversized_string_write_leaves_stream_clean() {
    let config = TransportConfig {
        max_field_len: 8,
        ..TransportConfig::default()
    };
    let mut transport = Transport::with_config(MemoryDevice::loopback(), registry(), config);
    assert_eq!(transport.start(), LinkState::WaitingSync);

    let long = Command {
        name: "x".repeat(9),
        seq: 1,
    };
    let err = transport.write_object(&long).unwrap_err();
    assert!(matches!(err, WireError::FieldTooLong { len: 9, max: 8 }));
    assert_eq!(transport.state(), LinkState::WaitingSync);

    let short = Command {
        name: "ok".to_string(),
        seq: 2,
    };
    transport.write_object(&short).unwrap();
    transport.write_object(&Ping).unwrap();

    let first = transport.read_object().unwrap();
    assert_eq!(first.downcast_ref::<Command>(), Some(&short));
    assert!(transport.read_object().unwrap().is::<Ping>());

    let stats = transport.stats();
    assert_eq!(stats.frames_written, 2);
    assert_eq!(stats.bytes_discarded, 0);
    assert_eq!(stats.header_rejects, 0);
}

#[test]
fn unregistered_header_never_instantiates() {
    let registry = Arc::new(TypeRegistry::new());
    let mut transport = Transport::new(
        MemoryDevice::new([SYNC_BYTE, 7, header_checksum(7), 0]),
        registry,
    );
    transport.start();
    assert!(transport.read_object().is_none());
    assert_eq!(transport.stats().frames_read, 0);
    assert_eq!(transport.stats().header_rejects, 1);
}

#[test]
fn write_object_accepts_trait_objects() {
    let messages: Vec<Box<dyn Message>> = vec![Box::new(Ping), Box::new(Counter::new(4))];
    let mut transport = started(MemoryDevice::loopback());
    for message in &messages {
        transport.write_object(&**message).unwrap();
    }
    let tags: Vec<Tag> = (0..2)
        .map(|_| transport.read_object().unwrap().tag())
        .collect();
    assert_eq!(tags, vec![7, 6]);
}

#[cfg(unix)]
#[test]
fn duplex_link_over_socket_pair() {
    use std::os::unix::net::UnixStream;
    use std::thread;

    use tagframe_device::StreamDevice;

    let (left, right) = UnixStream::pair().unwrap();
    let config = TransportConfig::default();

    let (mut left_rx, mut left_tx) = Transport::duplex(
        StreamDevice::new(left.try_clone().unwrap()),
        StreamDevice::new(left),
        registry(),
        config,
    );
    let (mut right_rx, mut right_tx) = Transport::duplex(
        StreamDevice::new(right.try_clone().unwrap()),
        StreamDevice::new(right),
        registry(),
        config,
    );
    left_rx.start();
    right_rx.start();

    let echo = thread::spawn(move || {
        for _ in 0..10 {
            let message = right_rx.read_object().unwrap();
            let counter = message.downcast_ref::<Counter>().unwrap();
            right_tx.write_object(&Counter::new(counter.value * 2)).unwrap();
        }
        right_rx.stats()
    });

    let collector = thread::spawn(move || {
        (0..10)
            .map(|_| left_rx.read_object().unwrap().downcast::<Counter>().unwrap().value)
            .collect::<Vec<u32>>()
    });

    for value in 0..10u32 {
        left_tx.write_object(&Counter::new(value)).unwrap();
    }

    let echoed = collector.join().unwrap();
    let stats = echo.join().unwrap();
    assert_eq!(echoed, (0..10).map(|v| v * 2).collect::<Vec<_>>());
    assert_eq!(stats.frames_read, 10);
    assert_eq!(left_tx.state(), LinkState::WaitingSync);
}
