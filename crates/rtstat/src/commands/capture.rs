//! `rtstat capture`: one snapshot to stdout.

use tracing::{debug, info};

use rtstat_api::TelnetConnector;
use rtstat_core::{Dispatcher, Registry};

use crate::cli::{CaptureArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// The snapshot is printed even with `--quiet`; nothing is printed on
/// failure.
pub fn handle(args: &CaptureArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config()?;
    let format = config::output_format(global, &cfg)?;
    let request = config::resolve_capture(args, global, &cfg)?;
    debug!(
        router = %request.router,
        host = %request.host,
        port = request.port,
        timeout = ?request.options.read_timeout,
        "capture request"
    );

    let connector = TelnetConnector::new(request.options.connect_timeout);
    let dispatcher = Dispatcher::new(Registry::builtin(), connector, request.options.clone());
    let snapshot = dispatcher.capture(
        &request.router,
        &request.host,
        request.port,
        &request.credentials,
    )?;
    info!(router = %snapshot.router, sections = snapshot.data.len(), "captured");

    output::print_output(&output::render_snapshot(format, &snapshot)?, false);
    Ok(())
}
