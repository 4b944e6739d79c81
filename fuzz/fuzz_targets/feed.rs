#![no_main]

use libfuzzer_sys::fuzz_target;

use newsstand::normalize::{feed::parse_feed, sitemap::parse_sitemap, video::parse_video_feed};

fuzz_target!(|data: &[u8]| {
    let xml = String::from_utf8_lossy(data);

    // Parsers report malformed input as errors, never panic
    let _ = parse_feed(&xml, "https://example.com/rss.xml");
    let _ = parse_sitemap(&xml);
    let _ = parse_video_feed(&xml, "Example");
});
