//! Extended image page (`image_ext.php`) parsing

use scraper::{Html, Selector};
use tracing::debug;

use super::config::ImagePageSelectors;
use super::context::ParseContext;
use super::{ContextualParser, ParsingResult, compile_selector, compile_selectors};

/// Image found on the page, with its absolute URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMatch {
    pub url: String,
    pub alt: Option<String>,
}

pub struct ImagePageParser {
    preferred: Vec<Selector>,
    any_image: Selector,
    path_fragments: Vec<String>,
}

impl ImagePageParser {
    pub fn new(config: &ImagePageSelectors) -> ParsingResult<Self> {
        Ok(Self {
            preferred: compile_selectors("image", &config.preferred)?,
            any_image: compile_selector("img")?,
            path_fragments: config.path_fragments.clone(),
        })
    }

    /// Preferred container first, then any image whose source looks like a product image
    fn find_source<'a>(&self, html: &'a Html, lower_code: &str) -> Option<(&'a str, Option<&'a str>)> {
        let preferred = self.preferred.iter().find_map(|selector| {
            html.select(selector).find_map(|img| {
                let src = img.value().attr("src").map(str::trim).filter(|src| !src.is_empty())?;
                Some((src, img.value().attr("alt")))
            })
        });
        if preferred.is_some() {
            return preferred;
        }

        html.select(&self.any_image).find_map(|img| {
            let src = img.value().attr("src").map(str::trim).filter(|src| !src.is_empty())?;
            let matches = src.contains(lower_code)
                || self.path_fragments.iter().any(|fragment| src.contains(fragment.as_str()));
            matches.then(|| (src, img.value().attr("alt")))
        })
    }
}

impl ContextualParser for ImagePageParser {
    type Output = Option<ImageMatch>;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        let lower_code = context.product_code.to_lowercase();
        let Some((src, alt)) = self.find_source(html, &lower_code) else {
            debug!("No image node on {}", context.page_url);
            return Ok(None);
        };

        let url = match context.resolve_url(src) {
            Ok(url) => url,
            Err(e) => {
                debug!("Keeping unresolved image source '{}': {}", src, e);
                src.to_string()
            }
        };
        let alt = alt.map(str::trim).filter(|alt| !alt.is_empty()).map(str::to_string);

        Ok(Some(ImageMatch { url, alt }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductCode;

    fn parse(body: &str, code: &str) -> Option<ImageMatch> {
        let parser = ImagePageParser::new(&ImagePageSelectors::default()).unwrap();
        let ctx = ParseContext::new(
            ProductCode::new(code),
            format!("https://www.deltron.com.pe/modulos/productos/items/image_ext.php?item={code}"),
        );
        parser
            .parse_with_context(&Html::parse_document(body), &ctx)
            .unwrap()
    }

    #[test]
    fn test_center_image_preferred() {
        let found = parse(
            r#"<img src="/logo.png"><center>&nbsp;<img src="https://imagenes.deltron.com.pe/x/acte70207w.jpg" alt="Teclado"><br></center>"#,
            "ACTE70207W",
        )
        .unwrap();
        assert_eq!(found.url, "https://imagenes.deltron.com.pe/x/acte70207w.jpg");
        assert_eq!(found.alt.as_deref(), Some("Teclado"));
    }

    #[test]
    fn test_fallback_matches_code_and_resolves_relative() {
        let found = parse(
            r#"<img src="/logo.png"><div><img src="fotos/acte70207w_1.jpg" alt=" "></div>"#,
            "ACTE70207W",
        )
        .unwrap();
        assert_eq!(
            found.url,
            "https://www.deltron.com.pe/modulos/productos/items/fotos/acte70207w_1.jpg"
        );
        assert_eq!(found.alt, None);
    }

    #[test]
    fn test_fallback_matches_path_fragment() {
        let found = parse(r#"<img src="/images/productos/otro.jpg">"#, "ZZ1").unwrap();
        assert_eq!(found.url, "https://www.deltron.com.pe/images/productos/otro.jpg");
    }

    #[test]
    fn test_no_matching_image() {
        assert_eq!(parse(r#"<img src="/logo.png"><p>Sin imagen</p>"#, "AB12XYZ"), None);
    }
}
