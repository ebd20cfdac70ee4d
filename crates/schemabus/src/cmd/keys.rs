use crate::cmd::KeysArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_keys, OutputFormat};

pub fn run(args: KeysArgs, address: &str, format: OutputFormat) -> CliResult<i32> {
    let mut client = args.client.connect(address)?;
    let keys = client
        .schema_keys()
        .map_err(|err| client_error("getSchemaKeys failed", err))?;

    print_keys(&keys, format);
    Ok(SUCCESS)
}
