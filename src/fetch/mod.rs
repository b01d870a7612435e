// src/fetch/mod.rs

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// One successfully retrieved HTTP response.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl Page {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// The HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. } | FetchError::Transport { url, .. } => url,
        }
    }
}

/// GET `url` with the client's defaults. Anything but a 200 is a failure.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_page(client: &Client, url: &str) -> Result<Page, FetchError> {
    debug!("requesting");
    let transport = |source| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let resp = client.get(url).send().await.map_err(transport)?;
    let status = resp.status();
    if status != StatusCode::OK {
        warn!(status = status.as_u16(), "non-200 response");
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = resp.bytes().await.map_err(transport)?.to_vec();
    debug!(bytes = body.len(), "fetched");
    Ok(Page {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_body_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wiki/Ontario"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Ontario</p>"))
            .mount(&server)
            .await;

        let url = format!("{}/wiki/Ontario", server.uri());
        let page = fetch_page(&Client::new(), &url).await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.url, url);
        assert_eq!(page.text(), "<p>Ontario</p>");
    }

    #[tokio::test]
    async fn non_200_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/missing", server.uri());
        let err = fetch_page(&Client::new(), &url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.url(), url);
    }

    #[tokio::test]
    async fn no_content_is_still_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = fetch_page(&Client::new(), &format!("{}/empty", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(204));
    }

    #[tokio::test]
    async fn unparseable_url_is_transport_error() {
        let err = fetch_page(&Client::new(), "not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(err.status(), None);
    }
}
