//! Document adapters.

mod docx_summary_renderer;
mod markdown_summary_renderer;

pub use docx_summary_renderer::DocxSummaryRenderer;
pub use markdown_summary_renderer::MarkdownSummaryRenderer;

use std::path::Path;

/// Swaps the extension of the schema's configured file name.
fn file_name_with_extension(file_name: &str, extension: &str) -> String {
    Path::new(file_name)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}
