use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use schemabus_registry::{RegistryConfig, SchemaRegistry};
use schemabus_service::{SchemaServer, SchemaService};
use schemabus_wire::resolve_address;

use crate::cmd::ServeArgs;
use crate::exit::{registry_error, wire_error, CliError, CliResult, INTERNAL, SUCCESS};

pub fn run(args: ServeArgs, address: &str) -> CliResult<i32> {
    let config = RegistryConfig {
        max_reported_violations: args.max_violations,
        ..RegistryConfig::default()
    };
    let mut registry = SchemaRegistry::with_config(config);
    if let Some(dir) = &args.schemas {
        let keys = registry
            .load_directory(dir)
            .map_err(|err| registry_error("schema preload failed", err))?;
        tracing::info!(count = keys.len(), dir = %dir.display(), "schemas preloaded");
    }

    let path = resolve_address(address).map_err(|err| wire_error("invalid address", err))?;
    let server = SchemaServer::bind(&path, Arc::new(SchemaService::with_registry(registry)))
        .map_err(|err| wire_error("bind failed", err))?;
    tracing::info!(address, path = %path.display(), "listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(Arc::clone(&running))?;

    server
        .serve(&running)
        .map_err(|err| wire_error("accept failed", err))?;
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
