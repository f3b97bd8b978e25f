use tagframe::messages::demo_registry;

use crate::cmd::TypesArgs;
use crate::exit::{wire_error, CliResult, SUCCESS};
use crate::output::{print_types, OutputFormat};

pub fn run(_args: TypesArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = demo_registry().map_err(|err| wire_error("registry", err))?;
    print_types(&registry, format);
    Ok(SUCCESS)
}
