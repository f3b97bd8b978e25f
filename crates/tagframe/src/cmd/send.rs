use std::sync::Arc;

use tagframe::device::DeviceMode;
use tagframe::messages::{
    demo_registry, FloatValue, Ping, SignedValue, TextCommand, UnsignedValue,
};
use tagframe::wire::{LinkState, Message, Transport};

use crate::cmd::{MessageKind, SendArgs};
use crate::exit::{wire_error, CliError, CliResult, SUCCESS, TRANSPORT_ERROR, USAGE};
use crate::output::{print_stats, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    if args.count == 0 {
        return Err(CliError::new(USAGE, "--count must be greater than zero"));
    }
    let messages = (0..args.count)
        .map(|seq| build_message(args.kind, args.value.as_deref(), seq))
        .collect::<CliResult<Vec<_>>>()?;
    let registry = Arc::new(demo_registry().map_err(|err| wire_error("registry", err))?);

    let device = args.link.open(DeviceMode::Out)?;
    let mut transport = Transport::with_config(device, registry, args.link.transport_config());
    if transport.start() != LinkState::WaitingSync {
        return Err(CliError::new(TRANSPORT_ERROR, "device is not ready"));
    }

    for message in &messages {
        transport
            .write_object(&**message)
            .map_err(|err| wire_error("send failed", err))?;
    }

    let stats = transport.stats();
    transport.close();
    print_stats("send", &args.link.device.display().to_string(), &stats, format);
    Ok(SUCCESS)
}

fn build_message(
    kind: MessageKind,
    value: Option<&str>,
    seq: u32,
) -> CliResult<Box<dyn Message>> {
    let message: Box<dyn Message> = match kind {
        MessageKind::Ping => Box::new(Ping),
        MessageKind::Text => Box::new(TextCommand::new(value.unwrap_or_default(), seq)),
        MessageKind::U32 => Box::new(UnsignedValue::new(parse_value(value, "u32")?)),
        MessageKind::I32 => Box::new(SignedValue::new(parse_value(value, "i32")?)),
        MessageKind::F32 => Box::new(FloatValue::new(parse_value(value, "f32")?)),
    };
    Ok(message)
}

fn parse_value<T: std::str::FromStr>(value: Option<&str>, kind: &str) -> CliResult<T> {
    let value =
        value.ok_or_else(|| CliError::new(USAGE, format!("--value is required for {kind}")))?;
    value
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid {kind} value: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_each_kind() {
        assert_eq!(build_message(MessageKind::Ping, None, 0).unwrap().tag(), 7);
        let text = build_message(MessageKind::Text, Some("arm"), 3).unwrap();
        assert_eq!(
            text.downcast_ref::<TextCommand>(),
            Some(&TextCommand::new("arm", 3))
        );
        let signed = build_message(MessageKind::I32, Some(" -4 "), 0).unwrap();
        assert_eq!(signed.downcast_ref::<SignedValue>().unwrap().value, -4);
    }

    #[test]
    fn numeric_kinds_need_a_valid_value() {
        let missing = build_message(MessageKind::U32, None, 0).unwrap_err();
        assert_eq!(missing.code, USAGE);
        let invalid = build_message(MessageKind::U32, Some("-1"), 0).unwrap_err();
        assert_eq!(invalid.code, USAGE);
        assert!(build_message(MessageKind::F32, Some("2.5"), 0).is_ok());
    }
}
