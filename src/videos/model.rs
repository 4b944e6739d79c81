use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    /// Platform id used to build embed and thumbnail URLs.
    pub video_id: String,
    pub title: String,
    pub thumbnail: String,
    pub channel_name: String,
    pub published: String,
    /// View count as published; "0" when the feed has no statistics.
    pub views: String,
}

impl VideoItem {
    pub fn thumbnail_for(video_id: &str) -> String {
        format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg")
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}
