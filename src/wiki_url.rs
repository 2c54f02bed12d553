/// Wiki page addresses: article title, scheme-less origin and edit-form patterns
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::PreviewError;

/// `/wiki/<title>?...`
static PATH_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/wiki/([^?]*?)\?").expect("valid path title regex"));

/// `...?title=<title>` or `...&title=<title>`
static QUERY_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]title=([^?&]*)").expect("valid query title regex"));

/// Article title as found in a page address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiTitle {
    raw: String,
}

impl WikiTitle {
    pub fn new(raw: &str) -> WikiTitle {
        WikiTitle {
            raw: raw.to_string(),
        }
    }

    /// Title exactly as it appears in the address (percent-encoded)
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Percent-decoded title; falls back to the raw form on invalid UTF-8
    pub fn decoded(&self) -> String {
        decode_component(&self.raw)
    }
}

/// Extract the article title from an edit or submit address.
///
/// Two shapes are supported:
/// - `https://host/wiki/Foo?action=edit` → `Foo`
/// - `https://host/w/index.php?title=Foo&action=edit` → `Foo`
///
/// Whichever shape matches earliest in the address wins.
pub fn extract_title(href: &str) -> Option<WikiTitle> {
    let by_path = PATH_TITLE.captures(href).and_then(|c| c.get(1));
    let by_query = QUERY_TITLE.captures(href).and_then(|c| c.get(1));

    let found = match (by_path, by_query) {
        (Some(p), Some(q)) => Some(if p.start() <= q.start() { p } else { q }),
        (p, q) => p.or(q),
    }?;

    Some(WikiTitle::new(found.as_str()))
}

/// Origin with its scheme stripped: `https://en.example.org:8080/x` → `://en.example.org:8080`
pub fn scheme_less_origin(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    let host = url.host_str()?;

    Some(match url.port() {
        Some(port) => format!("://{}:{}", host, port),
        None => format!("://{}", host),
    })
}

/// Origin and title of the page a preview is requested from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAddress {
    pub origin: String,
    pub title: WikiTitle,
}

impl PageAddress {
    pub fn parse(href: &str) -> Result<PageAddress, PreviewError> {
        let unrecognized = || PreviewError::UnrecognizedAddress(href.to_string());

        let origin = scheme_less_origin(href).ok_or_else(unrecognized)?;
        let title = extract_title(href).ok_or_else(unrecognized)?;

        Ok(PageAddress { origin, title })
    }
}

/// Address glob where `*` matches any run of characters
#[derive(Debug, Clone)]
pub struct UrlPattern {
    regex: Regex,
}

impl UrlPattern {
    pub fn new(glob: &str) -> UrlPattern {
        let body = glob
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{}$", body)).expect("escaped glob is a valid regex");

        UrlPattern { regex }
    }

    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

/// Globs for the edit or submit form of `title` at `origin`.
///
/// Covers both address shapes, both actions and both orders of the
/// `title`/`action` query parameters. The globs are loose: `title=Foo*`
/// also matches `title=Foobar`, so callers compare the extracted title too.
pub fn edit_form_patterns(origin: &str, title: &str, edit_path: &str) -> Vec<UrlPattern> {
    [
        format!("*{origin}{edit_path}*title={title}*action=edit*"),
        format!("*{origin}{edit_path}*action=edit*title={title}*"),
        format!("*{origin}{edit_path}*title={title}*action=submit*"),
        format!("*{origin}{edit_path}*action=submit*title={title}*"),
        format!("*{origin}/wiki/{title}*action=submit*"),
        format!("*{origin}/wiki/{title}*action=edit*"),
    ]
    .iter()
    .map(|glob| UrlPattern::new(glob))
    .collect()
}

/// Site-relative link to the edit form of `title`
pub fn edit_link(title: &str, edit_path: &str) -> String {
    format!("{}?title={}&action=edit", edit_path, title)
}

pub fn decode_component(s: &str) -> String {
    urlencoding::decode(s)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_query_style() {
        let title = extract_title("https://en.example.org/w/index.php?title=Foo&action=edit").unwrap();
        assert_eq!(title.raw(), "Foo");

        let title = extract_title("https://en.example.org/w/index.php?action=submit&title=Foo_Bar").unwrap();
        assert_eq!(title.raw(), "Foo_Bar");
    }

    #[test]
    fn test_extract_title_path_style() {
        let title = extract_title("https://en.example.org/wiki/Foo?action=edit").unwrap();
        assert_eq!(title.raw(), "Foo");

        let title = extract_title("https://en.example.org/wiki/Talk:Foo/Archive_1?action=submit").unwrap();
        assert_eq!(title.raw(), "Talk:Foo/Archive_1");
    }

    #[test]
    fn test_extract_title_decodes() {
        let title = extract_title("https://ja.example.org/wiki/%E6%97%A5%E6%9C%AC?action=edit").unwrap();
        assert_eq!(title.raw(), "%E6%97%A5%E6%9C%AC");
        assert_eq!(title.decoded(), "日本");

        let title = extract_title("https://en.example.org/w/index.php?title=C%2B%2B&action=edit&section=2").unwrap();
        assert_eq!(title.decoded(), "C++");
    }

    #[test]
    fn test_extract_title_no_residual_query() {
        for href in [
            "https://en.example.org/w/index.php?title=Foo&action=edit",
            "https://en.example.org/w/index.php?title=Foo",
            "https://en.example.org/wiki/Foo?action=edit&section=1",
            "https://en.example.org/w/index.php?action=edit&title=Foo&oldid=12",
        ] {
            let title = extract_title(href).unwrap();
            assert_eq!(title.decoded(), "Foo", "{}", href);
        }
    }

    #[test]
    fn test_extract_title_unmatched() {
        assert_eq!(extract_title("https://en.example.org/wiki/Foo"), None);
        assert_eq!(extract_title("https://en.example.org/w/index.php?action=edit"), None);
        assert_eq!(extract_title(""), None);
    }

    #[test]
    fn test_scheme_less_origin() {
        assert_eq!(
            scheme_less_origin("https://en.example.org/w/index.php?title=Foo").as_deref(),
            Some("://en.example.org")
        );
        assert_eq!(
            scheme_less_origin("http://localhost:8080/wiki/Foo?action=edit").as_deref(),
            Some("://localhost:8080")
        );
        assert_eq!(scheme_less_origin("not a url"), None);
    }

    #[test]
    fn test_page_address_rejects_unmatched() {
        let err = PageAddress::parse("https://en.example.org/wiki/Foo").unwrap_err();
        assert_eq!(
            err,
            PreviewError::UnrecognizedAddress("https://en.example.org/wiki/Foo".to_string())
        );
    }

    #[test]
    fn test_url_pattern() {
        let pattern = UrlPattern::new("*://en.example.org/wiki/Foo*action=edit*");

        assert!(pattern.matches("https://en.example.org/wiki/Foo?action=edit"));
        assert!(pattern.matches("http://en.example.org/wiki/Foo?section=2&action=edit"));
        assert!(!pattern.matches("https://de.example.org/wiki/Foo?action=edit"));
        assert!(!pattern.matches("https://en.example.org/wiki/Foo"));
    }

    #[test]
    fn test_url_pattern_literal_characters() {
        let pattern = UrlPattern::new("*://en.example.org/w/index.php*title=Foo*");

        assert!(pattern.matches("https://en.example.org/w/index.php?title=Foo"));
        assert!(!pattern.matches("https://en.example.org/w/indexXphp?title=Foo"));
    }

    #[test]
    fn test_edit_form_patterns() {
        let patterns = edit_form_patterns("://en.example.org", "Foo", "/w/index.php");
        let matches = |url: &str| patterns.iter().any(|p| p.matches(url));

        assert_eq!(patterns.len(), 6);
        assert!(matches("https://en.example.org/w/index.php?title=Foo&action=edit"));
        assert!(matches("https://en.example.org/w/index.php?action=edit&title=Foo"));
        assert!(matches("https://en.example.org/w/index.php?title=Foo&action=submit"));
        assert!(matches("https://en.example.org/w/index.php?action=submit&title=Foo"));
        assert!(matches("https://en.example.org/wiki/Foo?action=submit"));
        assert!(matches("https://en.example.org/wiki/Foo?action=edit"));

        assert!(!matches("https://en.example.org/wiki/Foo"));
        assert!(!matches("https://en.example.org/w/index.php?title=Foo&action=history"));
        assert!(!matches("https://en.example.org/wiki/Bar?action=edit"));
    }

    #[test]
    fn test_edit_link() {
        assert_eq!(edit_link("Foo", "/w/index.php"), "/w/index.php?title=Foo&action=edit");
    }
}
