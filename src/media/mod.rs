//! Per-word media download
//!
//! Words can carry a pronunciation sound and a picture, referenced by CDN
//! links in the word record. Assets are stored under one destination
//! directory as `<word id>.<extension>`, the extension taken from the link
//! path with mp3/jpg as fallbacks, so repeated imports overwrite instead of
//! accumulating copies.
//!
//! A failing asset never aborts an import. The first failure for a word
//! surfaces as [`Error::Download`] naming that word; the pipeline collects
//! those and reports one aggregated message at the end of the run.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::Settings;
use crate::error::types::describe_chain;
use crate::error::{Error, Result};
use crate::types::WordRecord;

/// Downloads word media into a destination directory.
#[derive(Debug, Clone)]
pub struct MediaDownloader {
    client: Client,
    dest: PathBuf,
}

/// Paths of the assets fetched for one word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordMedia {
    pub audio: Option<PathBuf>,
    pub picture: Option<PathBuf>,
}

impl MediaDownloader {
    /// Create a downloader writing into `dest`.
    ///
    /// The directory is created here so that an unusable destination fails
    /// the import up front instead of marking every word as a problem.
    pub fn create(settings: &Settings, dest: impl Into<PathBuf>) -> Result<Self> {
        let dest = dest.into();
        std::fs::create_dir_all(&dest)?;

        let client = Client::builder()
            .user_agent(settings.api.user_agent.clone())
            .timeout(settings.api.request_timeout())
            .build()?;

        Ok(Self { client, dest })
    }

    /// Destination directory of this downloader.
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Fetch the pronunciation sound and picture of one word, whichever are
    /// present. Words without media links succeed with empty [`WordMedia`].
    ///
    /// The first failing asset stops the word and returns
    /// [`Error::Download`]; anything already written stays on disk.
    pub async fn download_word_media(&self, word: &WordRecord) -> Result<WordMedia> {
        let mut media = WordMedia::default();

        if let Some(url) = present(word.pronunciation.as_deref()) {
            let filename = audio_filename(word.id, url);
            media.audio = Some(self.fetch_asset(url, &filename).await.map_err(|reason| {
                Error::download(&word.word_value, reason)
            })?);
        }

        if let Some(url) = present(word.picture.as_deref()) {
            let filename = picture_filename(word.id, url);
            media.picture = Some(self.fetch_asset(url, &filename).await.map_err(|reason| {
                Error::download(&word.word_value, reason)
            })?);
        }

        Ok(media)
    }

    async fn fetch_asset(
        &self,
        raw_url: &str,
        filename: &str,
    ) -> std::result::Result<PathBuf, String> {
        let url = normalize_url(raw_url)?;
        debug!("Fetching {} -> {}", url, filename);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| describe_chain(&e))?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let bytes = response.bytes().await.map_err(|e| describe_chain(&e))?;

        let path = self.dest.join(filename);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
        Ok(path)
    }
}

fn present(url: Option<&str>) -> Option<&str> {
    url.filter(|u| !u.trim().is_empty())
}

/// Target filename for a word's pronunciation sound.
pub fn audio_filename(word_id: u64, url: &str) -> String {
    format!("{}.{}", word_id, media_extension(url, "mp3"))
}

/// Target filename for a word's picture.
pub fn picture_filename(word_id: u64, url: &str) -> String {
    format!("{}.{}", word_id, media_extension(url, "jpg"))
}

/// Resolve a media link into an absolute URL. The service hands out
/// scheme-relative links ("//cdn...."), which default to https.
fn normalize_url(raw: &str) -> std::result::Result<Url, String> {
    let absolute = match raw.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => raw.to_string(),
    };
    Url::parse(&absolute).map_err(|e| format!("invalid media link '{raw}': {e}"))
}

fn media_extension(raw_url: &str, default_ext: &str) -> String {
    let from_path = normalize_url(raw_url).ok().and_then(|url| {
        let last = url.path_segments()?.next_back()?.to_string();
        last.rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    });

    match from_path {
        Some(ext)
            if !ext.is_empty()
                && ext.len() <= 4
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext
        }
        _ => default_ext.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn media_word(id: u64, value: &str, audio: Option<String>, picture: Option<String>) -> WordRecord {
        let mut word = WordRecord::new(id, value);
        word.pronunciation = audio;
        word.picture = picture;
        word
    }

    #[test]
    fn test_filenames_take_extension_from_link() {
        assert_eq!(audio_filename(42, "https://cdn.example.com/s/42.ogg"), "42.ogg");
        assert_eq!(
            picture_filename(42, "//cdn.example.com/pics/42.png"),
            "42.png"
        );
        assert_eq!(
            picture_filename(7, "https://cdn.example.com/pics/photo.JPEG"),
            "7.jpeg"
        );
    }

    #[test]
    fn test_filenames_fall_back_to_defaults() {
        assert_eq!(audio_filename(1, "https://cdn.example.com/sound"), "1.mp3");
        assert_eq!(picture_filename(1, "https://cdn.example.com/pic/"), "1.jpg");
        assert_eq!(audio_filename(1, "not a url at all"), "1.mp3");
        // An over-long or non-alphanumeric suffix is not an extension
        assert_eq!(
            picture_filename(1, "https://cdn.example.com/x.backup1024"),
            "1.jpg"
        );
    }

    #[test]
    fn test_scheme_relative_links_become_https() {
        let url = normalize_url("//cdn.example.com/s/1.mp3").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/s/1.mp3");
    }

    #[tokio::test]
    async fn test_downloads_audio_and_picture() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s/11.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"audio-bytes"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p/11.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"picture-bytes"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = MediaDownloader::create(&Settings::default(), dir.path()).unwrap();
        let word = media_word(
            11,
            "cat",
            Some(format!("{}/s/11.mp3", server.uri())),
            Some(format!("{}/p/11.png", server.uri())),
        );

        let media = downloader.download_word_media(&word).await.unwrap();

        let audio = media.audio.unwrap();
        assert_eq!(audio.file_name().unwrap().to_str().unwrap(), "11.mp3");
        assert_eq!(std::fs::read(&audio).unwrap(), b"audio-bytes");

        let picture = media.picture.unwrap();
        assert_eq!(picture.file_name().unwrap().to_str().unwrap(), "11.png");
        assert_eq!(std::fs::read(&picture).unwrap(), b"picture-bytes");
    }

    #[tokio::test]
    async fn test_word_without_links_downloads_nothing() {
        let dir = TempDir::new().unwrap();
        let downloader = MediaDownloader::create(&Settings::default(), dir.path()).unwrap();

        let word = media_word(5, "silent", None, Some("  ".to_string()));
        let media = downloader.download_word_media(&word).await.unwrap();

        assert_eq!(media, WordMedia::default());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_failing_audio_marks_word_and_skips_picture() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s/9.mp3"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p/9.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"unused"))
            .expect(0)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = MediaDownloader::create(&Settings::default(), dir.path()).unwrap();
        let word = media_word(
            9,
            "dog",
            Some(format!("{}/s/9.mp3", server.uri())),
            Some(format!("{}/p/9.jpg", server.uri())),
        );

        let err = downloader.download_word_media(&word).await.unwrap_err();
        match err {
            Error::Download { word, reason } => {
                assert_eq!(word, "dog");
                assert!(reason.contains("404"), "unexpected reason: {reason}");
            }
            other => panic!("expected Download error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_broken_link_marks_word() {
        let dir = TempDir::new().unwrap();
        let downloader = MediaDownloader::create(&Settings::default(), dir.path()).unwrap();
        let word = media_word(3, "bird", Some("ht!tp://broken".to_string()), None);

        let err = downloader.download_word_media(&word).await.unwrap_err();
        assert!(matches!(err, Error::Download { .. }));
    }
}
