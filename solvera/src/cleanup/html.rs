//! Extraction of inline image references from article HTML.

use scraper::{ElementRef, Html};

/// Returns the `src` of every `<img>` in `html` whose value contains `host_marker`.
///
/// Article bodies come from a rich text editor, so the markup is treated as a fragment
/// and malformed tags are tolerated.
pub fn inline_image_urls(html: &str, host_marker: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);

    fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "img")
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty() && src.contains(host_marker))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "public.blob.vercel-storage.com";

    #[test]
    fn test_collects_blob_images_only() {
        let html = r#"
            <p>Intro</p>
            <img src="https://abc.public.blob.vercel-storage.com/one.png" alt="one">
            <p><img src="https://cdn.elsewhere.com/two.png"></p>
            <figure><img class="wide" src="https://abc.public.blob.vercel-storage.com/three.webp"/></figure>
        "#;

        assert_eq!(
            inline_image_urls(html, HOST),
            vec![
                "https://abc.public.blob.vercel-storage.com/one.png".to_string(),
                "https://abc.public.blob.vercel-storage.com/three.webp".to_string(),
            ]
        );
    }

    #[test]
    fn test_tolerates_broken_markup() {
        let html = r#"<div><img src="https://abc.public.blob.vercel-storage.com/x.png"<p>unclosed"#;
        let urls = inline_image_urls(html, HOST);
        assert!(urls.iter().all(|u| u.contains(HOST)));

        assert!(inline_image_urls("", HOST).is_empty());
        assert!(inline_image_urls("<img>", HOST).is_empty());
        assert!(inline_image_urls(r#"<img src="">"#, HOST).is_empty());
    }

    #[test]
    fn test_ignores_mentions_outside_img_tags() {
        let html = r#"<a href="https://abc.public.blob.vercel-storage.com/doc.pdf">doc</a>"#;
        assert!(inline_image_urls(html, HOST).is_empty());
    }
}
