use serde::{Deserialize, Serialize};

use super::FeedPage;
use crate::engine::MediaResolver;

/// One entry of the video feed as served by the feed API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFeedItem {
    pub store_id: i64,
    pub place_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Video object name inside the media bucket.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Poster object name inside the media bucket.
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub video_duration: Option<f64>,
    #[serde(default)]
    pub comment_count: Option<u32>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub like_count: Option<u32>,
    #[serde(default)]
    pub liked_by_me: Option<bool>,
}

impl VideoFeedItem {
    pub fn new(store_id: i64, place_id: &str) -> Self {
        Self {
            store_id,
            place_id: place_id.to_string(),
            title: None,
            store_name: None,
            address: None,
            file_name: None,
            thumbnail: None,
            video_duration: None,
            comment_count: None,
            profile_image_url: None,
            username: None,
            like_count: None,
            liked_by_me: None,
        }
    }
}

impl FeedPage for VideoFeedItem {
    fn dedupe_key(&self) -> String {
        format!("{}_{}", self.store_id, self.place_id)
    }

    fn page_cursor(&self) -> Option<&str> {
        Some(self.place_id.as_str()).filter(|p| !p.is_empty())
    }

    fn anchor_id(&self) -> String {
        self.store_id.to_string()
    }
}

/// Join a bucket base URL and an object path with exactly one `/` between them.
pub fn join_url(base: Option<&str>, path: Option<&str>) -> Option<String> {
    let base = base.filter(|b| !b.is_empty())?;
    let path = path.filter(|p| !p.is_empty())?;
    let base = base.strip_suffix('/').unwrap_or(base);
    let path = path.strip_prefix('/').unwrap_or(path);
    Some(format!("{base}/{path}"))
}

/// Resolves media and posters against a single bucket URL.
#[derive(Debug, Clone, Default)]
pub struct BucketResolver {
    pub base_url: Option<String>,
}

impl BucketResolver {
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }
}

impl MediaResolver for BucketResolver {
    type Item = VideoFeedItem;

    fn media_uri(&self, item: &VideoFeedItem) -> Option<String> {
        join_url(self.base_url.as_deref(), item.file_name.as_deref())
    }

    /// Falls back to the video itself when there is no dedicated thumbnail.
    fn poster_uri(&self, item: &VideoFeedItem) -> Option<String> {
        let path = item.thumbnail.as_deref().or(item.file_name.as_deref());
        join_url(self.base_url.as_deref(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        let j = |b, p| join_url(Some(b), Some(p));
        assert_eq!(j("https://cdn/x", "a.mp4").as_deref(), Some("https://cdn/x/a.mp4"));
        assert_eq!(j("https://cdn/x/", "a.mp4").as_deref(), Some("https://cdn/x/a.mp4"));
        assert_eq!(j("https://cdn/x/", "/a.mp4").as_deref(), Some("https://cdn/x/a.mp4"));
    }

    #[test]
    fn join_url_needs_both_parts() {
        assert!(join_url(None, Some("a.mp4")).is_none());
        assert!(join_url(Some("https://cdn"), None).is_none());
        assert!(join_url(Some(""), Some("a.mp4")).is_none());
    }

    #[test]
    fn poster_falls_back_to_video() {
        let r = BucketResolver::new(Some("https://cdn".into()));
        let mut item = VideoFeedItem::new(7, "place-7");
        item.file_name = Some("v7.mp4".into());
        assert_eq!(r.media_uri(&item).as_deref(), Some("https://cdn/v7.mp4"));
        assert_eq!(r.poster_uri(&item).as_deref(), Some("https://cdn/v7.mp4"));

        item.thumbnail = Some("t7.jpg".into());
        assert_eq!(r.poster_uri(&item).as_deref(), Some("https://cdn/t7.jpg"));
    }

    #[test]
    fn item_without_file_has_no_media() {
        let r = BucketResolver::new(Some("https://cdn".into()));
        let item = VideoFeedItem::new(1, "p1");
        assert!(r.media_uri(&item).is_none());
        assert!(r.poster_uri(&item).is_none());
    }

    #[test]
    fn feed_keys_and_cursor() {
        let item = VideoFeedItem::new(12, "abc");
        assert_eq!(item.dedupe_key(), "12_abc");
        assert_eq!(item.page_cursor(), Some("abc"));
        assert_eq!(item.anchor_id(), "12");
        assert_eq!(VideoFeedItem::new(1, "").page_cursor(), None);
    }

    #[test]
    fn parses_api_json() {
        let json = r#"[{
            "storeId": 3,
            "placeId": "ChIJ3",
            "title": "Late night ramen",
            "fileName": "videos/3.mp4",
            "thumbnail": null,
            "likeCount": 12,
            "likedByMe": true
        }]"#;
        let items: Vec<VideoFeedItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].store_id, 3);
        assert_eq!(items[0].file_name.as_deref(), Some("videos/3.mp4"));
        assert!(items[0].thumbnail.is_none());
        assert_eq!(items[0].liked_by_me, Some(true));
        assert!(items[0].comment_count.is_none());
    }
}
