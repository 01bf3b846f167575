use std::path::{Path, PathBuf};

use eyre::Result;
use log::debug;

use crate::Error;
use crate::pipeline::SummaryResult;

/// File name used when exporting without an explicit path
pub const DEFAULT_EXPORT_FILE: &str = "video_summary.txt";

/// Render a result as Markdown: a heading, then the generated text
pub fn render_markdown(result: &SummaryResult) -> String {
    format!("## {}\n\n{}", result.heading, result.text.trim_end())
}

/// Render verbose request details for stderr
pub fn render_details(result: &SummaryResult) -> String {
    let translated = if result.translated { " (translated)" } else { "" };
    format!(
        "Video: {id}\nWatch: {watch}\nThumbnail: {thumb}\nTranscript language: {lang}{translated}",
        id = result.video_id,
        watch = crate::watch_url(&result.video_id),
        thumb = crate::thumbnail_url(&result.video_id),
        lang = result.transcript_language,
    )
}

/// Render a per-request failure: what went wrong, then what to do about it
pub fn render_error(input: &str, err: &Error) -> String {
    format!("Error for {input}: {err}\n{}", err.user_message())
}

/// Write the generated text as a plain-text file
pub fn export(result: &SummaryResult, path: &Path) -> Result<()> {
    std::fs::write(path, &result.text)?;
    debug!("Exported summary for {} to {}", result.video_id, path.display());
    Ok(())
}

/// Export path for one of several results: `notes.txt` becomes `notes-<id>.txt`
pub fn export_path_for(base: &Path, video_id: &str) -> PathBuf {
    let stem = base.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{stem}-{video_id}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{video_id}"),
    };
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnavailableReason;

    fn sample_result() -> SummaryResult {
        SummaryResult {
            video_id: "abc123".to_string(),
            heading: "Key Points".to_string(),
            text: "- first\n- second\n".to_string(),
            transcript_language: "es".to_string(),
            translated: true,
        }
    }

    #[test]
    fn test_render_markdown() {
        assert_eq!(render_markdown(&sample_result()), "## Key Points\n\n- first\n- second");
    }

    #[test]
    fn test_render_details() {
        let details = render_details(&sample_result());
        assert!(details.contains("Video: abc123"));
        assert!(details.contains("https://www.youtube.com/watch?v=abc123"));
        assert!(details.contains("http://img.youtube.com/vi/abc123/0.jpg"));
        assert!(details.contains("Transcript language: es (translated)"));
    }

    #[test]
    fn test_render_error() {
        let err = Error::TranscriptUnavailable {
            video_id: "abc123".to_string(),
            reason: UnavailableReason::VideoNotFound,
        };
        let rendered = render_error("https://youtu.be/abc123", &err);
        assert!(rendered.starts_with("Error for https://youtu.be/abc123: transcript unavailable for abc123"));
        assert!(rendered.contains("Try a different video."));
    }

    #[test]
    fn test_export_path_for() {
        assert_eq!(
            export_path_for(Path::new(DEFAULT_EXPORT_FILE), "abc123"),
            PathBuf::from("video_summary-abc123.txt")
        );
        assert_eq!(
            export_path_for(Path::new("out/notes"), "xyz"),
            PathBuf::from("out/notes-xyz")
        );
    }

    #[test]
    fn test_export_writes_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        export(&sample_result(), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "- first\n- second\n");
    }
}
