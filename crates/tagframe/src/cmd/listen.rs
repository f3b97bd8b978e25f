use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tagframe::device::{DeviceError, DeviceMode, FileDevice};
use tagframe::messages::demo_registry;
use tagframe::wire::{LinkState, Tag, Transport, TypeRegistry, WireError};
use tracing::{debug, info};

use crate::cmd::ListenArgs;
use crate::exit::{
    device_error, wire_error, CliError, CliResult, INTERNAL, SUCCESS, TRANSPORT_ERROR,
};
use crate::output::{print_object, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = demo_registry().map_err(|err| wire_error("registry", err))?;
    if let Some(tags) = &args.tags {
        restrict_tags(&registry, tags)?;
    }
    let registry = Arc::new(registry);

    let mode = if args.link.baud.is_some() {
        DeviceMode::InOut
    } else {
        DeviceMode::In
    };
    let device = args.link.open(mode)?;
    let config = args.link.transport_config();
    let mut transport = Transport::with_config(device, Arc::clone(&registry), config);
    if transport.start() != LinkState::WaitingSync {
        return Err(CliError::new(TRANSPORT_ERROR, "device is not ready"));
    }

    let mut recorder = match &args.record {
        Some(path) => {
            let file = FileDevice::create(path)
                .map_err(|err| device_error(&format!("open {}", path.display()), err))?;
            let mut recorder = Transport::with_config(file, Arc::clone(&registry), config);
            recorder.start();
            Some(recorder)
        }
        None => None,
    };

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let message = match transport.try_read_object() {
            Ok(message) => message,
            Err(err) if err.is_corruption() => {
                debug!(%err, "skipping corrupt frame");
                continue;
            }
            Err(WireError::Device(DeviceError::Closed)) => break,
            Err(err) => return Err(wire_error("receive failed", err)),
        };

        print_object(&*message, &registry, format);
        if let Some(recorder) = recorder.as_mut() {
            recorder
                .write_object(&*message)
                .map_err(|err| wire_error("record failed", err))?;
        }

        printed = printed.saturating_add(1);
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
    }

    let stats = transport.stats();
    info!(
        frames = stats.frames_read,
        rejected = stats.header_rejects,
        bad_sum = stats.checksum_failures,
        bad_field = stats.decode_failures,
        skipped = stats.bytes_discarded,
        "listen finished"
    );
    if let Some(mut recorder) = recorder {
        recorder.close();
    }
    transport.close();
    Ok(SUCCESS)
}

/// Disable every registered tag not in `tags`.
fn restrict_tags(registry: &TypeRegistry, tags: &[Tag]) -> CliResult<()> {
    if let Some(unknown) = tags.iter().find(|tag| registry.get(**tag).is_none()) {
        return Err(CliError::usage(format!("--tags: no type registered for tag {unknown}")));
    }
    for entry in registry.entries() {
        if !tags.contains(&entry.tag()) {
            registry.disable(entry.tag());
        }
    }
    Ok(())
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restrict_tags_disables_the_rest() {
        let registry = demo_registry().unwrap();
        restrict_tags(&registry, &[7, 6]).unwrap();
        assert_eq!(registry.enabled_tags(), vec![6, 7]);
    }

    #[test]
    fn restrict_tags_rejects_unknown_tag() {
        let registry = demo_registry().unwrap();
        let err = restrict_tags(&registry, &[7, 200]).unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
        assert_eq!(registry.enabled_tags().len(), 5);
    }
}
