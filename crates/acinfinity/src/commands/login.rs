//! `login`: validate credentials the way account setup does.

use acinfinity_core::setup::{self, EntryIdentity, FIELD_BASE};
use acinfinity_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(identity: &EntryIdentity) -> String {
    format!(
        "Unique ID: {}\nTitle:     {}",
        identity.unique_id, identity.title
    )
}

pub async fn handle(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let bar = util::spinner(global, "Logging in");
    let validated =
        setup::validate_credentials(&config.base_url, &config.email, &config.password, config.timeout)
            .await;
    bar.finish_and_clear();

    let identity = validated.map_err(|key| CliError::Setup {
        field: FIELD_BASE.into(),
        key,
    })?;

    let out = output::render_single(global.output, &identity, detail, |i| i.unique_id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
