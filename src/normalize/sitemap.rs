//! XML sitemaps (`<urlset>` and `<sitemapindex>`).

use quick_xml::events::Event;

use super::{ParseError, xml};
use crate::aggregate::is_http_url;

/// Candidate page URLs kept per sitemap.
pub const MAX_SITEMAP_URLS: usize = 50;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SitemapEntries {
    /// Page URLs from `<url><loc>`, capped at [`MAX_SITEMAP_URLS`].
    pub pages: Vec<String>,
    /// Child sitemaps from a `<sitemapindex>`.
    pub sitemaps: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Parent {
    Url,
    Sitemap,
}

pub fn parse_sitemap(xml_body: &str) -> Result<SitemapEntries, ParseError> {
    let mut reader = xml::reader(xml_body);
    let mut entries = SitemapEntries::default();
    let mut parent: Option<Parent> = None;
    let mut in_loc = false;
    let mut loc = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"url" => parent = Some(Parent::Url),
                b"sitemap" => parent = Some(Parent::Sitemap),
                b"loc" if parent.is_some() => {
                    in_loc = true;
                    loc.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_loc => loc.push_str(&xml::text(&e)),
            Ok(Event::CData(e)) if in_loc => loc.push_str(&xml::cdata(&e)),
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"loc" if in_loc => {
                    in_loc = false;
                    let url = loc.trim().to_string();
                    if !is_http_url(&url) {
                        continue;
                    }
                    match parent {
                        Some(Parent::Url) if entries.pages.len() < MAX_SITEMAP_URLS => {
                            entries.pages.push(url)
                        }
                        Some(Parent::Sitemap) => entries.sitemaps.push(url),
                        _ => {}
                    }
                }
                b"url" | b"sitemap" => parent = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(xml::error(&reader, err)),
            _ => {}
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://shop.example.com/p/kettle</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc> https://shop.example.com/p/toaster </loc></url>
  <url><loc>/relative/ignored</loc></url>
</urlset>"#;
        let entries = parse_sitemap(xml).unwrap();
        assert_eq!(
            entries.pages,
            vec![
                "https://shop.example.com/p/kettle",
                "https://shop.example.com/p/toaster"
            ]
        );
        assert!(entries.sitemaps.is_empty());
    }

    #[test]
    fn test_parse_sitemap_index() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://shop.example.com/sitemap-products-1.xml</loc></sitemap>
  <sitemap><loc>https://shop.example.com/sitemap-products-2.xml</loc></sitemap>
</sitemapindex>"#;
        let entries = parse_sitemap(xml).unwrap();
        assert!(entries.pages.is_empty());
        assert_eq!(entries.sitemaps.len(), 2);
    }

    #[test]
    fn test_caps_page_urls() {
        let urls: String = (0..80)
            .map(|i| format!("<url><loc>https://shop.example.com/p/{i}</loc></url>"))
            .collect();
        let xml = format!("<urlset>{urls}</urlset>");
        let entries = parse_sitemap(&xml).unwrap();
        assert_eq!(entries.pages.len(), MAX_SITEMAP_URLS);
        assert_eq!(entries.pages[0], "https://shop.example.com/p/0");
    }
}
