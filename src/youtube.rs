use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::transcript::{TranscriptFetcher, same_language};
use crate::{CaptionFragment, CaptionTrack, Error, Result, UnavailableReason};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrackInfo>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrackInfo {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// Caption tracks from YouTube's InnerTube player API
pub struct YouTubeCaptions {
    http: reqwest::Client,
}

impl YouTubeCaptions {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| request_failed("", e))?;
        Ok(Self { http })
    }

    async fn player_response(&self, video_id: &str, lang: &str) -> std::result::Result<InnerTubePlayerResponse, String> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = crate::watch_url(video_id);
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .http
            .get(&watch_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?
            .text()
            .await
            .map_err(|e| e.to_string())?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": lang,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        self.http
            .post(&player_url)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl TranscriptFetcher for YouTubeCaptions {
    async fn fetch(&self, video_id: &str, language_hint: &str) -> Result<CaptionTrack> {
        let unavailable = |reason: UnavailableReason| Error::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason,
        };

        let resp = self
            .player_response(video_id, language_hint)
            .await
            .map_err(|cause| unavailable(UnavailableReason::Request(cause)))?;

        let tracks = select_tracks(resp).map_err(unavailable)?;

        let track = pick_track(&tracks, language_hint).ok_or_else(|| unavailable(UnavailableReason::NoCaptions))?;
        debug!("Using caption track: lang={}", track.language_code);

        // Step 3: Fetch the caption XML
        let caption_xml = self
            .http
            .get(&track.base_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(UnavailableReason::Request(e.to_string())))?
            .text()
            .await
            .map_err(|e| unavailable(UnavailableReason::Request(e.to_string())))?;

        let fragments = parse_caption_xml(&caption_xml).map_err(|e| unavailable(UnavailableReason::Request(e)))?;

        Ok(CaptionTrack {
            language: track.language_code.clone(),
            fragments,
        })
    }
}

fn request_failed(video_id: &str, e: reqwest::Error) -> Error {
    Error::TranscriptUnavailable {
        video_id: video_id.to_string(),
        reason: UnavailableReason::Request(e.to_string()),
    }
}

/// Classify the player response into caption tracks or the reason there are none
fn select_tracks(resp: InnerTubePlayerResponse) -> std::result::Result<Vec<CaptionTrackInfo>, UnavailableReason> {
    if let Some(status) = resp.playability_status {
        match status.status.as_deref() {
            Some("OK") | None => {}
            Some("ERROR") => return Err(UnavailableReason::VideoNotFound),
            Some(other) => {
                return Err(UnavailableReason::Unplayable(
                    status.reason.unwrap_or_else(|| other.to_string()),
                ));
            }
        }
    }

    let renderer = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .ok_or(UnavailableReason::CaptionsDisabled)?;

    let tracks = renderer.caption_tracks.unwrap_or_default();
    if tracks.is_empty() {
        return Err(UnavailableReason::NoCaptions);
    }
    Ok(tracks)
}

/// Find the requested language track: exact code first, then a regional variant
/// of the same language, then the first available
fn pick_track<'a>(tracks: &'a [CaptionTrackInfo], lang: &str) -> Option<&'a CaptionTrackInfo> {
    tracks
        .iter()
        .find(|t| t.language_code.eq_ignore_ascii_case(lang))
        .or_else(|| tracks.iter().find(|t| same_language(&t.language_code, lang)))
        .or_else(|| tracks.first())
}

fn extract_api_key(html: &str) -> std::result::Result<String, String> {
    let patterns = [r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#, r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#];

    for pattern in patterns {
        let re = Regex::new(pattern).map_err(|e| e.to_string())?;
        if let Some(caps) = re.captures(html) {
            return Ok(caps[1].to_string());
        }
    }

    Err("could not extract InnerTube API key from watch page".to_string())
}

fn parse_caption_xml(xml: &str) -> std::result::Result<Vec<CaptionFragment>, String> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut fragments = Vec::new();
    let mut current: Option<(f64, f64)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok(),
                        b"dur" => dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok(),
                        _ => {}
                    }
                }
                // Some tracks omit dur on the last cue
                current = start.map(|s| (s, dur.unwrap_or(0.0)));
            }
            Ok(Event::Text(ref e)) => {
                if let Some((start, duration)) = current.take() {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.is_empty() {
                        fragments.push(CaptionFragment { text, start, duration });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("error parsing caption XML: {e}")),
            _ => {}
        }
    }

    Ok(fragments)
}
