//! PDF downloads.
//!
//! Documents are stored under `{pdf_dir}/{source_tag}/` with a file name
//! derived from the article title. Every failure is returned to the caller,
//! which counts it and moves on; nothing here aborts a run.

use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::utils::{run_timestamp, safe_file_stem, truncate_for_log};
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// Downloads documents into a per-source directory tree.
pub struct PdfFetcher {
    client: reqwest::Client,
    base_dir: PathBuf,
}

impl PdfFetcher {
    pub fn new(client: reqwest::Client, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            base_dir: base_dir.into(),
        }
    }

    /// HTTP client for downloads, with the longer download timeout.
    pub fn client_for(config: &ScraperConfig) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.download_timeout())
            .build()
    }

    /// Directory holding the documents of one source.
    pub fn source_dir(&self, source_tag: &str) -> PathBuf {
        self.base_dir
            .join(source_tag.to_lowercase().replace(' ', "_"))
    }

    /// Download `url` and return where it was stored.
    ///
    /// # Arguments
    ///
    /// * `url` - Address of the document
    /// * `title` - Article title, used for the file name
    /// * `source_tag` - Source tag, used for the subdirectory
    /// * `external_id` - Source identifier prefixed to the file name; a
    ///   timestamp is used when absent
    ///
    /// # Returns
    ///
    /// The path of the written file: `{base_dir}/{source_tag}/{file_name}`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Http`] on a transport failure or non-2xx status
    /// - [`FetchError::ContentMismatch`] when the server does not answer
    ///   with a document content type
    /// - [`FetchError::Io`] when the file cannot be written; the partial
    ///   file is removed
    #[instrument(level = "info", skip(self, title), fields(source = source_tag))]
    pub async fn fetch(
        &self,
        url: &str,
        title: &str,
        source_tag: &str,
        external_id: Option<&str>,
    ) -> Result<PathBuf, FetchError> {
        let dir = self.source_dir(source_tag);
        fs::create_dir_all(&dir).await?;
        let path = dir.join(file_name(title, external_id));

        let response = self.client.get(url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        if !content_type.contains("pdf") && !content_type.contains("application") {
            return Err(FetchError::ContentMismatch(content_type));
        }

        if let Err(e) = write_stream(response, &path).await {
            if let Err(cleanup) = fs::remove_file(&path).await {
                debug!(path = %path.display(), error = %cleanup, "Could not remove partial download");
            }
            warn!(path = %path.display(), error = %e, "Download interrupted");
            return Err(e);
        }

        info!(path = %path.display(), title = %truncate_for_log(title, 60), "Downloaded PDF");
        Ok(path)
    }
}

async fn write_stream(response: reqwest::Response, path: &Path) -> Result<(), FetchError> {
    let mut file = fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}

/// File name for a downloaded document.
///
/// The title is made file-system safe and prefixed with the external id, or
/// with a run timestamp when the source has no id.
pub fn file_name(title: &str, external_id: Option<&str>) -> String {
    let prefix = match external_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id.replace(['/', '\\'], "_"),
        None => run_timestamp(),
    };
    format!("{prefix}_{}.pdf", safe_file_stem(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_file_name_with_external_id() {
        assert_eq!(
            file_name("Deep Hedging: A Survey!", Some("1802.03042v1")),
            "1802.03042v1_Deep_Hedging_A_Survey.pdf"
        );
    }

    #[test]
    fn test_file_name_sanitizes_id_and_falls_back_to_timestamp() {
        assert_eq!(file_name("Paper", Some("q-fin/0101001")), "q-fin_0101001_Paper.pdf");
        let name = file_name("Paper", None);
        assert!(name.ends_with("_Paper.pdf"));
        assert_eq!(name.len(), "20250101_000000_Paper.pdf".len());
    }

    #[test]
    fn test_source_dir_is_lowercase_snake() {
        let fetcher = PdfFetcher::new(reqwest::Client::new(), "/tmp/pdfs");
        assert_eq!(fetcher.source_dir("Google Scholar"), PathBuf::from("/tmp/pdfs/google_scholar"));
    }

    #[tokio::test]
    async fn test_fetch_writes_document() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/pdf/1802.03042v1")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body(b"%PDF-1.4 test body")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = PdfFetcher::new(reqwest::Client::new(), dir.path());
        let url = format!("{}/pdf/1802.03042v1", server.url());
        let path = fetcher
            .fetch(&url, "Deep Hedging", "arxiv", Some("1802.03042v1"))
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("arxiv/1802.03042v1_Deep_Hedging.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 test body");
    }

    #[tokio::test]
    async fn test_fetch_rejects_html_login_page() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/delivery")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html>Please sign in</html>")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = PdfFetcher::new(reqwest::Client::new(), dir.path());
        let url = format!("{}/delivery", server.url());
        let err = fetcher.fetch(&url, "Paper", "ssrn", Some("1")).await.unwrap_err();

        assert!(matches!(err, FetchError::ContentMismatch(ref ct) if ct.starts_with("text/html")));
        assert!(!dir.path().join("ssrn/1_Paper.pdf").exists());
    }

    #[tokio::test]
    async fn test_fetch_reports_missing_document() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing.pdf")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = PdfFetcher::new(reqwest::Client::new(), dir.path());
        let url = format!("{}/missing.pdf", server.url());
        let err = fetcher.fetch(&url, "Paper", "jmlr", None).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }
}
