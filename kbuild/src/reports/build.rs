//! Build command report rendering.

use kbuild_pipeline::BuildReport;

use super::output::{Output, Report};

impl Report for BuildReport {
    fn render(&self, out: &mut dyn Output) {
        if let Some(repo) = &self.updated_repo {
            out.key_value("Updated", &repo.display().to_string());
        }
        out.key_value("Backend", &self.backend);
        out.key_value("Output", &self.output_dir.display().to_string());
        out.newline();

        for target in &self.targets {
            out.section(&target.source_path.display().to_string());
            for path in &target.written {
                out.added_item(&path.display().to_string());
            }
            for path in &target.unchanged {
                out.list_item(&path.display().to_string());
            }
        }

        if !self.targets.is_empty() {
            out.newline();
        }
        out.preformatted(&format!(
            "✓ {} target{}, {} file{} written, {} unchanged",
            self.targets.len(),
            plural(self.targets.len()),
            self.written_count(),
            plural(self.written_count()),
            self.unchanged_count()
        ));
    }
}

pub(super) fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
