//! One adapter per marketplace family.

pub mod amazon;
pub mod mercadolibre;

pub use amazon::AmazonAdapter;
pub use mercadolibre::MercadoLibreAdapter;

use scraper::ElementRef;
use url::Url;

/// Absolute form of a listing link; `None` for empty or unparsable hrefs.
pub(crate) fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}

/// Absolute image URL of a listing thumbnail. Lazy-loaded images carry an
/// inline placeholder in `src` and the real address in `data-src`.
pub(crate) fn resolve_image(base: &Url, img: ElementRef<'_>) -> Option<String> {
    let element = img.value();
    let src = element
        .attr("src")
        .filter(|src| !src.trim_start().starts_with("data:"))
        .or_else(|| element.attr("data-src"))?;
    resolve_link(base, src)
}
