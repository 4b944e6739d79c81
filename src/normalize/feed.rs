//! RSS 2.0 / RSS 1.0 / Atom news feeds.

use quick_xml::events::{BytesStart, Event};

use super::{ParseError, html, hostname, xml};
use crate::aggregate::is_presentable;
use crate::news::model::NewsItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    Content,
    Published,
    Updated,
    Guid,
}

impl Field {
    fn from_qname(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "link" => Some(Self::Link),
            "description" | "summary" => Some(Self::Description),
            "content:encoded" | "content" => Some(Self::Content),
            "pubDate" | "published" | "dc:date" => Some(Self::Published),
            "updated" => Some(Self::Updated),
            "guid" | "id" => Some(Self::Guid),
            _ => None,
        }
    }

    /// Fields whose value is an HTML fragment; nested elements are kept as
    /// markup instead of flattened to text.
    fn is_markup(self) -> bool {
        matches!(self, Self::Description | Self::Content)
    }
}

/// Field being collected and the depth of the element that opened it.
#[derive(Debug, Clone, Copy)]
struct Capture {
    field: Field,
    depth: usize,
}

#[derive(Debug, Default)]
struct RawEntry {
    title: String,
    link: String,
    description: String,
    content: String,
    published: String,
    updated: String,
    guid: String,
    image: Option<String>,
}

impl RawEntry {
    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
            Field::Content => &mut self.content,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
            Field::Guid => &mut self.guid,
        }
    }

    fn push(&mut self, field: Field, text: &str) {
        self.slot(field).push_str(text);
    }

    /// Pick up media references and, for direct children, Atom `<link href>`.
    fn inspect(&mut self, e: &BytesStart, name: &str, direct_child: bool) {
        match name {
            "link" if direct_child => {
                let rel = xml::attr(e, "rel");
                if self.link.is_empty()
                    && matches!(rel.as_deref(), None | Some("alternate"))
                    && let Some(href) = xml::attr(e, "href")
                {
                    self.link = href;
                }
            }
            "media:content" => {
                let is_image = xml::attr(e, "medium").is_none_or(|m| m == "image")
                    && xml::attr(e, "type").is_none_or(|t| t.starts_with("image/"));
                if is_image {
                    self.offer_image(xml::attr(e, "url"));
                }
            }
            "media:thumbnail" => self.offer_image(xml::attr(e, "url")),
            "enclosure" => {
                if xml::attr(e, "type").is_some_and(|t| t.starts_with("image/")) {
                    self.offer_image(xml::attr(e, "url"));
                }
            }
            _ => {}
        }
    }

    fn offer_image(&mut self, url: Option<String>) {
        if self.image.is_none() {
            self.image = url;
        }
    }

    fn into_item(self, domain: &str) -> Option<NewsItem> {
        // Already unescaped by the XML reader
        let title = html::strip_markup(&self.title);
        let link = self.link.trim().to_string();
        if !is_presentable(&title, &link) {
            return None;
        }

        let description = if self.content.trim().is_empty() {
            self.description.trim().to_string()
        } else {
            self.content.trim().to_string()
        };
        let image = self
            .image
            .or_else(|| html::first_img_src(&description))
            .and_then(|src| html::absolutize(&src, &link));
        let pub_date = if self.published.trim().is_empty() {
            self.updated.trim().to_string()
        } else {
            self.published.trim().to_string()
        };
        let guid = match self.guid.trim() {
            "" => link.clone(),
            guid => guid.to_string(),
        };

        Some(NewsItem {
            title,
            link,
            description,
            pub_date,
            guid,
            needs_image: image.is_none(),
            image,
            domain: domain.to_string(),
        })
    }
}

/// Parse a feed document fetched from `feed_url` into news items.
///
/// Only direct children of an `<item>`/`<entry>` populate its fields, and
/// the first occurrence of a field wins, so nested blocks such as Atom
/// `<source>` never leak into the entry. Items without a title or an
/// absolute link are dropped.
pub fn parse_feed(xml_body: &str, feed_url: &str) -> Result<Vec<NewsItem>, ParseError> {
    let domain = hostname(feed_url)?;
    let mut reader = xml::markup_reader(xml_body);

    let mut items = Vec::new();
    let mut depth = 0usize;
    // Open entry and the depth of its element
    let mut entry: Option<(RawEntry, usize)> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = xml::qname(&e);
                if entry.is_none() && (name == "item" || name == "entry") {
                    entry = Some((RawEntry::default(), depth));
                    capture = None;
                    continue;
                }
                let Some((current, entry_depth)) = entry.as_mut() else {
                    continue;
                };
                match capture {
                    Some(open) => {
                        if open.field.is_markup() {
                            current.push(open.field, &xml::open_tag(&e));
                        }
                    }
                    None => {
                        let direct_child = depth == *entry_depth + 1;
                        current.inspect(&e, &name, direct_child);
                        if direct_child
                            && let Some(field) = Field::from_qname(&name)
                            && current.slot(field).is_empty()
                        {
                            capture = Some(Capture { field, depth });
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let Some((current, entry_depth)) = entry.as_mut() else {
                    continue;
                };
                match capture {
                    Some(open) => {
                        if open.field.is_markup() {
                            current.push(open.field, &xml::empty_tag(&e));
                        }
                    }
                    None => {
                        let name = xml::qname(&e);
                        current.inspect(&e, &name, depth == *entry_depth);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let closing = depth;
                depth = depth.saturating_sub(1);
                if let Some(open) = capture {
                    if closing == open.depth {
                        capture = None;
                    } else if open.field.is_markup()
                        && let Some((current, _)) = entry.as_mut()
                    {
                        current.push(open.field, &xml::close_tag(&e));
                    }
                    continue;
                }
                if entry.as_ref().is_some_and(|(_, entry_depth)| *entry_depth == closing)
                    && let Some((raw, _)) = entry.take()
                    && let Some(item) = raw.into_item(&domain)
                {
                    items.push(item);
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some((current, _)), Some(open)) = (entry.as_mut(), capture) {
                    // Text inside inline markup stays escaped so the
                    // fragment remains valid HTML
                    let text = if open.field.is_markup() && depth > open.depth {
                        xml::raw_text(&e)
                    } else {
                        xml::text(&e)
                    };
                    current.push(open.field, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some((current, _)), Some(open)) = (entry.as_mut(), capture) {
                    current.push(open.field, &xml::cdata(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(xml::error(&reader, err)),
            _ => {}
        }
    }

    Ok(items)
}
