//! Description text extraction from the active product panel

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::config::DescriptionSelectors;
use super::{ParsingError, ParsingResult, compile_selectors};
use crate::domain::constants::{CONSIDERATIONS_PREFIX, NO_DESCRIPTION};

/// Extracts the free-text description of a product page
pub struct DescriptionParser {
    first_paragraph: Vec<Selector>,
    panel_blocks: Vec<Selector>,
    considerations_heading: String,
    excluded_phrase: String,
    line_break: Regex,
    tag: Regex,
}

impl DescriptionParser {
    pub fn new(config: &DescriptionSelectors) -> ParsingResult<Self> {
        Ok(Self {
            first_paragraph: compile_selectors("description", &config.first_paragraph)?,
            panel_blocks: compile_selectors("description panel", &config.panel_blocks)?,
            considerations_heading: config.considerations_heading.clone(),
            excluded_phrase: config.excluded_phrase.clone(),
            line_break: compile_regex(r"(?i)<br\s*/?>")?,
            tag: compile_regex(r"</?[^>]+(?:>|$)")?,
        })
    }

    /// First paragraph, else the considerations section, else the sentinel
    pub fn parse(&self, html: &Html) -> String {
        self.first_paragraph_text(html)
            .or_else(|| self.considerations_text(html))
            .unwrap_or_else(|| {
                debug!("No description found, using sentinel");
                NO_DESCRIPTION.to_string()
            })
    }

    fn first_paragraph_text(&self, html: &Html) -> Option<String> {
        self.first_paragraph.iter().find_map(|selector| {
            let paragraph = html.select(selector).next()?;
            let text = self.markup_to_text(&paragraph.inner_html());
            (!text.is_empty()).then_some(text)
        })
    }

    fn considerations_text(&self, html: &Html) -> Option<String> {
        self.panel_blocks.iter().find_map(|selector| {
            let mut in_section = false;
            let mut parts = Vec::new();

            for element in html.select(selector) {
                match element.value().name() {
                    "h2" => {
                        let heading: String = element.text().collect();
                        if heading.contains(&self.considerations_heading) {
                            in_section = true;
                        }
                    }
                    "p" if in_section => {
                        let text: String = element.text().collect();
                        let text = text.trim();
                        if !text.is_empty() && !text.contains(&self.excluded_phrase) {
                            parts.push(text.to_string());
                        }
                    }
                    _ => {}
                }
            }

            (!parts.is_empty()).then(|| format!("{}{}", CONSIDERATIONS_PREFIX, parts.join(". ")))
        })
    }

    /// `<br>` becomes a newline, remaining tags are dropped, entities decoded
    pub fn markup_to_text(&self, markup: &str) -> String {
        let with_breaks = self.line_break.replace_all(markup, "\n");
        let stripped = self.tag.replace_all(&with_breaks, "");
        html_escape::decode_html_entities(&stripped).trim().to_string()
    }
}

fn compile_regex(pattern: &str) -> ParsingResult<Regex> {
    Regex::new(pattern).map_err(|e| ParsingError::ConfigurationError {
        message: e.to_string(),
        field: pattern.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> DescriptionParser {
        DescriptionParser::new(&DescriptionSelectors::default()).unwrap()
    }

    #[test]
    fn test_first_paragraph_with_line_break() {
        let html = Html::parse_document(
            r#"<div id="home"><div><p>Línea economica.<br>Ideal para oficina.</p><p>Otro</p></div></div>"#,
        );
        assert_eq!(parser().parse(&html), "Línea economica.\nIdeal para oficina.");
    }

    #[test]
    fn test_inline_tags_and_entities() {
        let html = Html::parse_document(
            r#"<div id="home"><div><p> <b>Mouse</b> &amp; teclado<br/>USB </p></div></div>"#,
        );
        assert_eq!(parser().parse(&html), "Mouse & teclado\nUSB");
    }

    #[test]
    fn test_considerations_fallback() {
        let html = Html::parse_document(
            r#"<div id="home"><div>
                <p>   </p>
                <h2>Consideraciones</h2>
                <p>Incluye cable</p>
                <p>Foto referencial</p>
                <p></p>
                <p>Garantía de 1 año</p>
            </div></div>"#,
        );
        assert_eq!(
            parser().parse(&html),
            "Información del producto: Incluye cable. Garantía de 1 año"
        );
    }

    #[test]
    fn test_heading_match_is_case_sensitive() {
        let html = Html::parse_document(
            r#"<div id="home"><div><h2>consideraciones</h2><p></p><p>Nada</p></div></div>"#,
        );
        assert_eq!(parser().parse(&html), NO_DESCRIPTION);
    }

    #[test]
    fn test_missing_panel_yields_sentinel() {
        let html = Html::parse_document("<html><body><p>Fuera del panel</p></body></html>");
        assert_eq!(parser().parse(&html), NO_DESCRIPTION);
    }
}
