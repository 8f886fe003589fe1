//! Image, video and tweet search.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use wren_agent::adapters::{ImageSearch, TweetSearch, VideoSearch};
use wren_core::domain::results::{ImageItem, TweetItem, VideoItem};
use wren_core::errors::ProviderError;

use crate::http::send_json;

const FLICKR: &str = "flickr";
const FLICKR_ENDPOINT: &str = "https://api.flickr.com/services/rest/";
const FLICKR_MAX_PER_PAGE: u32 = 500;

const YOUTUBE: &str = "youtube";
const YOUTUBE_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const YOUTUBE_VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";
const YOUTUBE_MAX_RESULTS: u32 = 50;

const TWITTER: &str = "twitter";
const TWITTER_SEARCH_ENDPOINT: &str = "https://api.twitter.com/2/tweets/search/recent";
const TWITTER_MIN_RESULTS: u32 = 10;
const TWITTER_MAX_RESULTS: u32 = 100;

pub struct FlickrImages {
    client: Client,
    api_key: SecretString,
}

impl FlickrImages {
    pub fn new(client: Client, api_key: SecretString) -> Self {
        Self { client, api_key }
    }
}

#[derive(Debug, Deserialize)]
struct FlickrResponse {
    #[serde(default)]
    stat: String,
    #[serde(default)]
    message: Option<String>,
    photos: Option<FlickrPhotos>,
}

#[derive(Debug, Deserialize)]
struct FlickrPhotos {
    #[serde(default)]
    photo: Vec<FlickrPhoto>,
}

#[derive(Debug, Deserialize)]
struct FlickrPhoto {
    id: String,
    owner: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    ownername: Option<String>,
    #[serde(default)]
    url_s: Option<String>,
}

fn flickr_items(response: FlickrResponse) -> Result<Vec<ImageItem>, ProviderError> {
    if response.stat != "ok" {
        return Err(ProviderError::Status {
            provider: FLICKR.to_string(),
            status: 200,
            message: response.message.unwrap_or_else(|| format!("stat `{}`", response.stat)),
        });
    }
    let photos = response.photos.map(|photos| photos.photo).unwrap_or_default();
    Ok(photos
        .into_iter()
        .filter_map(|photo| {
            let thumbnail_url = photo.url_s.filter(|url| !url.is_empty())?;
            Some(ImageItem {
                page_url: format!("https://www.flickr.com/photos/{}/{}", photo.owner, photo.id),
                owner: photo.ownername.unwrap_or(photo.owner),
                id: photo.id,
                title: photo.title,
                thumbnail_url,
            })
        })
        .collect())
}

#[async_trait]
impl ImageSearch for FlickrImages {
    async fn search(&self, subject: &str, limit: u32) -> Result<Vec<ImageItem>, ProviderError> {
        let per_page = limit.clamp(1, FLICKR_MAX_PER_PAGE).to_string();
        let request = self.client.get(FLICKR_ENDPOINT).query(&[
            ("method", "flickr.photos.search"),
            ("api_key", self.api_key.expose_secret()),
            ("text", subject),
            ("media", "photos"),
            ("extras", "url_s,owner_name"),
            ("per_page", per_page.as_str()),
            ("format", "json"),
            ("nojsoncallback", "1"),
        ]);
        let response: FlickrResponse = send_json(FLICKR, request).await?;
        flickr_items(response)
    }
}

pub struct YoutubeVideos {
    client: Client,
    api_key: SecretString,
}

impl YoutubeVideos {
    pub fn new(client: Client, api_key: SecretString) -> Self {
        Self { client, api_key }
    }
}

#[derive(Debug, Deserialize)]
struct YoutubeSearchResponse {
    #[serde(default)]
    items: Vec<YoutubeSearchItem>,
}

#[derive(Debug, Deserialize)]
struct YoutubeSearchItem {
    id: YoutubeSearchId,
}

#[derive(Debug, Deserialize)]
struct YoutubeSearchId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YoutubeVideosResponse {
    #[serde(default)]
    items: Vec<YoutubeVideo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YoutubeVideo {
    id: String,
    snippet: YoutubeSnippet,
    content_details: Option<YoutubeContentDetails>,
    statistics: Option<YoutubeStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YoutubeSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    published_at: Option<String>,
    #[serde(default)]
    thumbnails: HashMap<String, YoutubeThumbnail>,
}

#[derive(Debug, Deserialize)]
struct YoutubeThumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct YoutubeContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YoutubeStatistics {
    /// Counts arrive as decimal strings.
    view_count: Option<String>,
}

fn youtube_items(response: YoutubeVideosResponse) -> Vec<VideoItem> {
    response
        .items
        .into_iter()
        .map(|video| {
            let thumbnail_url = ["medium", "default", "high"]
                .iter()
                .find_map(|size| video.snippet.thumbnails.get(*size))
                .map(|thumbnail| thumbnail.url.clone())
                .unwrap_or_default();
            VideoItem {
                id: video.id,
                title: video.snippet.title,
                channel_title: video.snippet.channel_title,
                thumbnail_url,
                published_at: video.snippet.published_at,
                duration: video.content_details.and_then(|details| details.duration),
                view_count: video.statistics.and_then(|stats| stats.view_count).and_then(|count| count.parse().ok()),
            }
        })
        .collect()
}

#[async_trait]
impl VideoSearch for YoutubeVideos {
    async fn search_ids(&self, subject: &str, limit: u32) -> Result<Vec<String>, ProviderError> {
        let max_results = limit.clamp(1, YOUTUBE_MAX_RESULTS).to_string();
        let request = self.client.get(YOUTUBE_SEARCH_ENDPOINT).query(&[
            ("part", "id"),
            ("type", "video"),
            ("videoEmbeddable", "true"),
            ("q", subject),
            ("maxResults", max_results.as_str()),
            ("key", self.api_key.expose_secret()),
        ]);
        let response: YoutubeSearchResponse = send_json(YOUTUBE, request).await?;
        Ok(response.items.into_iter().filter_map(|item| item.id.video_id).collect())
    }

    async fn details(&self, ids: &[String]) -> Result<Vec<VideoItem>, ProviderError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join(",");
        let request = self.client.get(YOUTUBE_VIDEOS_ENDPOINT).query(&[
            ("part", "id,snippet,contentDetails,statistics"),
            ("id", joined.as_str()),
            ("key", self.api_key.expose_secret()),
        ]);
        let response: YoutubeVideosResponse = send_json(YOUTUBE, request).await?;
        Ok(youtube_items(response))
    }
}

pub struct TwitterSearch {
    client: Client,
    bearer_token: SecretString,
}

impl TwitterSearch {
    pub fn new(client: Client, bearer_token: SecretString) -> Self {
        Self { client, bearer_token }
    }
}

#[derive(Debug, Deserialize)]
struct TwitterResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    includes: Option<TwitterIncludes>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    author_id: Option<String>,
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwitterIncludes {
    #[serde(default)]
    users: Vec<TwitterUser>,
}

#[derive(Debug, Deserialize)]
struct TwitterUser {
    id: String,
    username: String,
}

fn twitter_items(response: TwitterResponse, limit: u32) -> Vec<TweetItem> {
    let usernames: HashMap<String, String> = response
        .includes
        .map(|includes| includes.users.into_iter().map(|user| (user.id, user.username)).collect())
        .unwrap_or_default();

    response
        .data
        .into_iter()
        .take(limit as usize)
        .map(|tweet| {
            let author = tweet
                .author_id
                .as_ref()
                .and_then(|id| usernames.get(id).cloned())
                .or(tweet.author_id)
                .unwrap_or_default();
            TweetItem { id: tweet.id, author, text: tweet.text, created_at: tweet.created_at }
        })
        .collect()
}

#[async_trait]
impl TweetSearch for TwitterSearch {
    async fn search(&self, subject: &str, limit: u32) -> Result<Vec<TweetItem>, ProviderError> {
        // The API rejects page sizes outside 10..=100; smaller limits are cut locally.
        let max_results = limit.clamp(TWITTER_MIN_RESULTS, TWITTER_MAX_RESULTS).to_string();
        let request = self
            .client
            .get(TWITTER_SEARCH_ENDPOINT)
            .bearer_auth(self.bearer_token.expose_secret())
            .query(&[
                ("query", subject),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "created_at,author_id"),
                ("expansions", "author_id"),
                ("user.fields", "username"),
            ]);
        let response: TwitterResponse = send_json(TWITTER, request).await?;
        Ok(twitter_items(response, limit.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wren_core::errors::ProviderError;

    use super::{flickr_items, twitter_items, youtube_items, FlickrResponse, TwitterResponse, YoutubeVideosResponse};

    fn parse<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(error) => panic!("fixture should parse: {error}"),
        }
    }

    #[test]
    fn flickr_photos_without_thumbnails_are_skipped() {
        let response: FlickrResponse = parse(json!({
            "stat": "ok",
            "photos": {"photo": [
                {"id": "1", "owner": "99@N01", "title": "Tabby", "ownername": "catlover", "url_s": "https://live.staticflickr.com/1_s.jpg"},
                {"id": "2", "owner": "99@N01", "title": "No thumb"}
            ]}
        }));
        let items = flickr_items(response).unwrap_or_default();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].owner, "catlover");
        assert_eq!(items[0].page_url, "https://www.flickr.com/photos/99@N01/1");
    }

    #[test]
    fn flickr_failures_surface_their_message() {
        let response: FlickrResponse = parse(json!({"stat": "fail", "code": 100, "message": "Invalid API Key"}));
        assert!(matches!(
            flickr_items(response),
            Err(ProviderError::Status { ref message, .. }) if message == "Invalid API Key"
        ));
    }

    #[test]
    fn youtube_details_pick_a_thumbnail_and_parse_views() {
        let response: YoutubeVideosResponse = parse(json!({
            "items": [{
                "id": "abc",
                "snippet": {
                    "title": "Quadrocopter ballet",
                    "channelTitle": "Drone Lab",
                    "publishedAt": "2023-04-01T10:00:00Z",
                    "thumbnails": {"default": {"url": "https://i.ytimg.com/d.jpg"}, "medium": {"url": "https://i.ytimg.com/m.jpg"}}
                },
                "contentDetails": {"duration": "PT4M13S"},
                "statistics": {"viewCount": "1024"}
            }]
        }));
        let items = youtube_items(response);
        assert_eq!(items[0].thumbnail_url, "https://i.ytimg.com/m.jpg");
        assert_eq!(items[0].view_count, Some(1024));
        assert_eq!(items[0].duration.as_deref(), Some("PT4M13S"));
    }

    #[test]
    fn tweets_resolve_usernames_and_respect_small_limits() {
        let response: TwitterResponse = parse(json!({
            "data": [
                {"id": "1", "text": "first", "author_id": "u1"},
                {"id": "2", "text": "second", "author_id": "u2"},
                {"id": "3", "text": "third", "author_id": "u1"}
            ],
            "includes": {"users": [{"id": "u1", "username": "rustlang"}]}
        }));
        let items = twitter_items(response, 2);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].author, "rustlang");
        assert_eq!(items[1].author, "u2");
    }
}
