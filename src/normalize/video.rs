//! Channel video feeds (Atom with `yt:` and `media:` extensions).

use quick_xml::events::Event;

use super::{ParseError, xml};
use crate::aggregate::is_presentable;
use crate::videos::model::VideoItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    VideoId,
    Title,
    AuthorName,
    Published,
}

#[derive(Debug, Default)]
struct RawVideo {
    id: String,
    video_id: String,
    title: String,
    author: String,
    published: String,
    views: Option<String>,
}

impl RawVideo {
    fn push(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Id => &mut self.id,
            Field::VideoId => &mut self.video_id,
            Field::Title => &mut self.title,
            Field::AuthorName => &mut self.author,
            Field::Published => &mut self.published,
        };
        slot.push_str(text);
    }

    fn into_item(self, fallback_channel: &str) -> Option<VideoItem> {
        let video_id = self.video_id.trim().to_string();
        if video_id.is_empty() {
            return None;
        }
        let item = VideoItem {
            id: match self.id.trim() {
                "" => video_id.clone(),
                id => id.to_string(),
            },
            thumbnail: VideoItem::thumbnail_for(&video_id),
            title: self.title.trim().to_string(),
            channel_name: match self.author.trim() {
                "" => fallback_channel.to_string(),
                author => author.to_string(),
            },
            published: self.published.trim().to_string(),
            views: self
                .views
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "0".to_string()),
            video_id,
        };
        is_presentable(&item.title, &item.watch_url()).then_some(item)
    }
}

/// Parse a channel feed. `channel_name` labels entries that carry no author.
pub fn parse_video_feed(xml_body: &str, channel_name: &str) -> Result<Vec<VideoItem>, ParseError> {
    let mut reader = xml::reader(xml_body);
    let mut videos = Vec::new();
    let mut entry: Option<RawVideo> = None;
    let mut in_author = false;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = xml::qname(&e);
                match name.as_str() {
                    "entry" => entry = Some(RawVideo::default()),
                    "author" => in_author = true,
                    "media:statistics" => {
                        if let Some(current) = entry.as_mut() {
                            current.views = xml::attr(&e, "views");
                        }
                        field = None;
                    }
                    _ if entry.is_some() => {
                        field = match name.as_str() {
                            "id" => Some(Field::Id),
                            "yt:videoId" => Some(Field::VideoId),
                            "title" | "media:title" if !entry_has_title(&entry) => {
                                Some(Field::Title)
                            }
                            "name" if in_author => Some(Field::AuthorName),
                            "published" => Some(Field::Published),
                            _ => None,
                        };
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(current) = entry.as_mut()
                    && e.name().as_ref() == b"media:statistics"
                {
                    current.views = xml::attr(&e, "views");
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    current.push(f, &xml::text(&e));
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    current.push(f, &xml::cdata(&e));
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"entry" => {
                    if let Some(video) = entry.take().and_then(|raw| raw.into_item(channel_name)) {
                        videos.push(video);
                    }
                    field = None;
                }
                b"author" => in_author = false,
                _ => field = None,
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(xml::error(&reader, err)),
            _ => {}
        }
    }

    Ok(videos)
}

fn entry_has_title(entry: &Option<RawVideo>) -> bool {
    entry.as_ref().is_some_and(|e| !e.title.is_empty())
}
