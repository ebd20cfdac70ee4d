use crate::cmd::{json_input, AddArgs};
use crate::exit::{client_error, reply_code, CliResult};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: AddArgs, address: &str, format: OutputFormat) -> CliResult<i32> {
    let schema = json_input(
        "schema",
        args.schema.as_deref(),
        args.schema_file.as_deref(),
    )?;

    let mut client = args.client.connect(address)?;
    let reply = client
        .add_schema(&args.key, schema, args.overwrite)
        .map_err(|err| client_error("addSchema failed", err))?;

    print_reply(&reply, format);
    Ok(reply_code(&reply))
}
