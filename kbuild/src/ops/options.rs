//! Options operation - list every configuration option.

use eyre::Result;
use kbuild_schema::{OptionTable, Schema, schema_to_user_options};

use crate::reports::{OptionInfo, OptionsReport};

/// Execute the options operation.
pub fn options() -> Result<OptionsReport> {
    let schema = Schema::builtin();
    let defaults = OptionTable::from_schema(schema)?;

    let options = schema_to_user_options(schema)?
        .into_iter()
        .zip(defaults.iter())
        .map(|(option, (name, slot))| OptionInfo {
            long: option.long,
            flat_name: name.to_string(),
            description: option.description.unwrap_or_default(),
            default: (!slot.value.is_null()).then(|| slot.value.to_string()),
        })
        .collect();

    Ok(OptionsReport { options })
}
