use askama::Template;
use kurteyt_core::OgSettings;

/// The Open-Graph interstitial: social preview tags plus a delayed
/// navigation to the target.
#[derive(Debug, Template)]
#[template(path = "interstitial.html")]
pub struct InterstitialPage<'a> {
    title: &'a str,
    description: &'a str,
    url: &'a str,
    image: &'a str,
    image_alt: &'a str,
    redirect_url: &'a str,
    delay_secs: u32,
}

impl<'a> InterstitialPage<'a> {
    /// Missing settings render as empty strings.
    pub fn new(redirect_url: &'a str, og: Option<&'a OgSettings>, delay_secs: u32) -> Self {
        let field = |pick: fn(&'a OgSettings) -> &'a Option<String>| {
            og.and_then(|og| pick(og).as_deref()).unwrap_or_default()
        };

        Self {
            title: field(|og| &og.og_title),
            description: field(|og| &og.og_description),
            url: field(|og| &og.og_url),
            image: field(|og| &og.og_image),
            image_alt: field(|og| &og.og_image_alt),
            redirect_url,
            delay_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // the html escaper encodes '/' as well
    fn unescape(html: &str) -> String {
        html.replace("&#x2f;", "/").replace("&#x2F;", "/")
    }

    #[test]
    fn renders_settings_and_target() {
        let og = OgSettings {
            og_title: Some("T".to_string()),
            og_image: Some("https://example.com/i.png".to_string()),
            ..Default::default()
        };
        let html = unescape(&InterstitialPage::new("https://example.com", Some(&og), 1).render().unwrap());

        assert!(html.contains(r#"<meta property="og:title" content="T">"#));
        assert!(html.contains(r#"<meta property="og:image" content="https://example.com/i.png">"#));
        assert!(html.contains(r#"<meta property="og:description" content="">"#));
        assert!(html.contains(r#"content="1; url=https://example.com""#));
        assert!(html.contains(r#"<a href="https://example.com">click here</a>"#));
    }

    #[test]
    fn missing_settings_render_empty() {
        let html = InterstitialPage::new("https://example.com", None, 1)
            .render()
            .unwrap();

        assert!(html.contains("<title></title>"));
        assert!(html.contains(r#"<meta name="twitter:image:alt" content="">"#));
    }

    #[test]
    fn settings_are_escaped() {
        let og = OgSettings {
            og_title: Some(r#""><script>alert(1)</script>"#.to_string()),
            ..Default::default()
        };
        let html = InterstitialPage::new("https://example.com", Some(&og), 1)
            .render()
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
