//! `rtstat routers`: list supported models.

use serde::Serialize;
use tabled::Tabled;

use rtstat_core::{Credentials, Registry};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize, Tabled)]
struct RouterRow {
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Login")]
    login: bool,
}

fn rows(registry: &Registry) -> Result<Vec<RouterRow>, CliError> {
    registry
        .keys()
        .map(|key| {
            let driver = registry.create(key, &Credentials::default())?;
            Ok(RouterRow {
                model: key.to_owned(),
                name: driver.name().to_owned(),
                login: driver.requires_login(),
            })
        })
        .collect()
}

/// Defaults to a table: the configured output format is meant for snapshots.
pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let format = global.output.unwrap_or(OutputFormat::Table);
    let rows = rows(Registry::builtin())?;
    let out = output::render_list(format, &rows, |r| r.model.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_models_are_listed() {
        let rows = rows(Registry::builtin()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].model, "TG585v8");
        assert_eq!(rows[0].name, "Thomson TG585 v8");
        assert!(rows[0].login);
    }
}
