//! Summary document configuration

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentConfig {
    #[serde(default)]
    pub format: SummaryFormat,
}

/// Format served by the summary download endpoint.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    #[default]
    Docx,
    Markdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_formats() {
        let config: DocumentConfig = serde_json::from_str(r#"{"format":"markdown"}"#).unwrap();
        assert_eq!(config.format, SummaryFormat::Markdown);
        assert_eq!(DocumentConfig::default().format, SummaryFormat::Docx);
    }
}
