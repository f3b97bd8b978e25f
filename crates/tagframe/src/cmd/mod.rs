use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use tagframe::device::{DeviceMode, DeviceParams, FileDevice};
use tagframe::wire::{Endianness, TransportConfig};

use crate::exit::{device_error, CliResult};
use crate::output::OutputFormat;

pub mod listen;
pub mod send;
pub mod types;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write demo objects to a device.
    Send(SendArgs),
    /// Read objects from a device and print them.
    Listen(ListenArgs),
    /// List the registered message types.
    Types(TypesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Types(args) => types::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Link options shared by every command that opens a device.
#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Device path: a regular file or a serial line such as /dev/ttyUSB0.
    pub device: PathBuf,
    /// Byte order of multi-byte fields on the wire.
    #[arg(long, value_enum, default_value = "native", env = "TAGFRAME_ENDIANNESS")]
    pub endianness: WireOrder,
    /// Configure the device as a raw serial line at this baud rate.
    #[arg(long, value_name = "RATE", env = "TAGFRAME_BAUD")]
    pub baud: Option<u32>,
}

impl LinkArgs {
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::with_endianness(self.endianness.into())
    }

    pub fn open(&self, mode: DeviceMode) -> CliResult<FileDevice> {
        let mut params = DeviceParams::new(&self.device, mode);
        if let Some(baud) = self.baud {
            params = params.with_baud_rate(baud);
        }
        FileDevice::open(&params)
            .map_err(|err| device_error(&format!("open {}", self.device.display()), err))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum WireOrder {
    /// Host byte order.
    Native,
    /// Reversed host byte order.
    Swap,
    Little,
    Big,
}

impl From<WireOrder> for Endianness {
    fn from(order: WireOrder) -> Self {
        match order {
            WireOrder::Native => Endianness::Native,
            WireOrder::Swap => Endianness::Swap,
            WireOrder::Little => Endianness::wire_little(),
            WireOrder::Big => Endianness::wire_big(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageKind {
    Ping,
    Text,
    U32,
    I32,
    F32,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Kind of object to send.
    #[arg(long, value_enum, default_value = "ping")]
    pub kind: MessageKind,
    /// Value carried by the object (command text or number).
    #[arg(long)]
    pub value: Option<String>,
    /// Number of objects to send. Text commands are numbered from 0.
    #[arg(long, default_value = "1")]
    pub count: u32,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Exit after printing N objects.
    #[arg(long)]
    pub count: Option<usize>,
    /// Accept only these tags (comma-separated); frames of other types are skipped.
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<u8>>,
    /// Re-encode every decoded object into this file.
    #[arg(long, value_name = "FILE")]
    pub record: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct TypesArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
