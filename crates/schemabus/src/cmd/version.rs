use schemabus_registry::KNOWN_META_SCHEMAS;
use schemabus_wire::{runtime_dir, DEFAULT_ADDRESS};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("schemabus {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    println!(
        "target: {}",
        option_env!("SCHEMABUS_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("os: {}/{}", std::env::consts::OS, std::env::consts::ARCH);
    println!("default address: {DEFAULT_ADDRESS}");
    println!("runtime dir: {}", runtime_dir().display());
    for uri in KNOWN_META_SCHEMAS {
        println!("meta-schema: {uri}");
    }

    Ok(SUCCESS)
}
