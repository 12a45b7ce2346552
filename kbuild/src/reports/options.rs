//! Options command report data structures.

use super::output::{Output, Report};

/// Every configuration option.
#[derive(Debug)]
pub struct OptionsReport {
    pub options: Vec<OptionInfo>,
}

#[derive(Debug)]
pub struct OptionInfo {
    /// Dash-joined option path, e.g. `repo-localPath`.
    pub long: String,
    /// Name accepted by `-o`, e.g. `repo_localPath`.
    pub flat_name: String,
    pub description: String,
    /// JSON-encoded default, if the option has one.
    pub default: Option<String>,
}

impl Report for OptionsReport {
    fn render(&self, out: &mut dyn Output) {
        for option in &self.options {
            out.preformatted(&format!("--{}  {}", option.long, option.description));
            if let Some(default) = &option.default {
                out.key_value_indented("default", default);
            }
        }
        out.newline();
        out.preformatted("Override any option with `-o NAME=VALUE`, e.g. `-o repo_update=true`.");
    }
}
