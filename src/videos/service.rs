use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::{
    aggregate::{Paged, Window, flatten, paginate, sort_by_recency},
    app_state::AppState,
    fetcher::{FetchKind, Fetcher},
    normalize::video::parse_video_feed,
    sources::{ChannelSource, SourceRegistry},
    videos::model::VideoItem,
};

async fn fetch_channel(
    fetcher: &Fetcher,
    registry: &SourceRegistry,
    channel: &ChannelSource,
) -> Vec<VideoItem> {
    let url = match registry.channel_feed_url(channel) {
        Ok(url) => url,
        Err(err) => {
            warn!(channel = %channel.id, "Cannot build channel feed url: {}", err);
            return Vec::new();
        }
    };
    let Some(page) = fetcher.fetch_or_none(url.as_str(), FetchKind::Feed).await else {
        return Vec::new();
    };

    let label = channel.name.as_deref().unwrap_or(&channel.id);
    match parse_video_feed(&page.body_utf8, label) {
        Ok(videos) => {
            debug!(channel = %channel.id, count = videos.len(), "Parsed channel feed");
            videos
        }
        Err(err) => {
            warn!(channel = %channel.id, "Failed to parse channel feed, skipping: {}", err);
            Vec::new()
        }
    }
}

/// Every configured channel's videos, newest first.
#[instrument(skip_all, fields(channels = registry.channels.len()))]
pub async fn collect_videos(fetcher: &Fetcher, registry: &SourceRegistry) -> Vec<VideoItem> {
    let per_channel = join_all(
        registry
            .channels
            .iter()
            .map(|channel| fetch_channel(fetcher, registry, channel)),
    )
    .await;
    let mut videos = flatten(per_channel);
    sort_by_recency(&mut videos, |video| video.published.as_str());
    videos
}

pub async fn videos_page(state: &AppState, window: Window) -> Paged<VideoItem> {
    let videos = collect_videos(&state.fetcher, &state.sources).await;
    let page = paginate(videos, window);
    info!(
        offset = window.offset,
        limit = window.limit,
        returned = page.items.len(),
        total = page.total,
        "Served video page"
    );
    page
}
