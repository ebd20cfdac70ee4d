use crate::cmd::{json_input, ValidateArgs};
use crate::exit::{client_error, reply_code, CliResult};
use crate::output::{print_reply, OutputFormat};

/// Exits 0 when the document conforms and 60 when it does not.
pub fn run(args: ValidateArgs, address: &str, format: OutputFormat) -> CliResult<i32> {
    let document = json_input("json", args.json.as_deref(), args.file.as_deref())?;

    let mut client = args.client.connect(address)?;
    let reply = client
        .validate(&args.key, document)
        .map_err(|err| client_error("validate failed", err))?;

    print_reply(&reply, format);
    Ok(reply_code(&reply))
}
