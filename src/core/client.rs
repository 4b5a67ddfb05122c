use crate::core::config::{self, get_env_var};
use crate::core::errors::{Error, Result};
use crate::core::json::{self, JsonServiceTags};
use crate::core::service_tag::ServiceTag;
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

/*-------------------------------------------------------------------------------------------------
  Simple Interface
-------------------------------------------------------------------------------------------------*/

/// _**Simple library interface**_ retrieves and parses the current Azure service tags using the
/// default client configuration.
///
/// ```no_run
/// # async fn demo() -> webapp_ip_restriction::Result<()> {
/// let service_tags = webapp_ip_restriction::get_service_tags().await?;
/// let eastasia = service_tags.iter().find(|tag| tag.id == "AzureCloud.eastasia");
/// # Ok(())
/// # }
/// ```
pub async fn get_service_tags() -> Result<Vec<ServiceTag>> {
    CatalogClient::new().get_service_tags().await
}

/*-------------------------------------------------------------------------------------------------
  Catalog Source
-------------------------------------------------------------------------------------------------*/

/// Anything that can produce the current list of service tags.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn service_tags(&self) -> Result<Vec<ServiceTag>>;
}

/*-------------------------------------------------------------------------------------------------
  Client Builder
-------------------------------------------------------------------------------------------------*/

/// A builder for the [CatalogClient] struct.
///
/// ```
/// let client = webapp_ip_restriction::CatalogClientBuilder::new()
///     .url("https://www.microsoft.com/en-us/download/confirmation.aspx?id=56519")
///     .build();
/// ```
///
/// The [CatalogClientBuilder::new] method sources the URL from the
/// `WEBAPP_IP_RESTRICTION_CATALOG_URL` environment variable when it is set. Use
/// [CatalogClientBuilder::default] to ignore the environment.
#[derive(Debug, Clone)]
pub struct CatalogClientBuilder {
    url: String,
}

/*--------------------------------------------------------------------------------------
  Client Builder Implementation
--------------------------------------------------------------------------------------*/

impl Default for CatalogClientBuilder {
    /// Create a new [CatalogClientBuilder] with the default download page URL.
    ///
    /// ```
    /// let client = webapp_ip_restriction::CatalogClientBuilder::default().build();
    ///
    /// assert_eq!(
    ///     client.url(),
    ///     "https://www.microsoft.com/en-us/download/confirmation.aspx?id=56519"
    /// );
    /// ```
    fn default() -> Self {
        Self {
            url: config::DEFAULT_CATALOG_URL.to_string(),
        }
    }
}

impl CatalogClientBuilder {
    pub fn new() -> Self {
        let default = CatalogClientBuilder::default();

        Self {
            url: get_env_var(&config::env_var_name("CATALOG_URL"), default.url),
        }
    }

    /// Set the URL of the download page that links to the service tag JSON document.
    pub fn url(&mut self, url: &str) -> &mut Self {
        self.url = url.to_string();
        self
    }

    pub fn build(&self) -> CatalogClient {
        CatalogClient {
            url: self.url.clone(),
            http: reqwest::Client::new(),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Client
-------------------------------------------------------------------------------------------------*/

/// A client that retrieves the service tag catalog. The published JSON document changes name
/// every week, so the client first loads the download page and extracts the link to the
/// current document from it.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    url: String,
    http: reqwest::Client,
}

impl Default for CatalogClient {
    fn default() -> Self {
        CatalogClientBuilder::default().build()
    }
}

impl CatalogClient {
    pub fn new() -> Self {
        CatalogClientBuilder::new().build()
    }

    /// Get the URL of the download page.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Retrieves the download page, follows its link to the JSON document, and returns the
    /// service tags it contains.
    pub async fn get_service_tags(&self) -> Result<Vec<ServiceTag>> {
        let json_url = self.get_download_link().await?;
        let document = self.get_document(&json_url).await?;
        Ok(document.values)
    }

    /// Retrieves the download page and extracts the link to the current JSON document.
    pub async fn get_download_link(&self) -> Result<String> {
        info!("Get service tag download page: GET {}", self.url);
        let page = self.get_text(&self.url).await?;
        extract_download_link(&page, &self.url)
    }

    /// Retrieves and parses the JSON document at `json_url`.
    pub async fn get_document(&self, json_url: &str) -> Result<JsonServiceTags> {
        info!("Get service tags: GET {json_url}");
        let json = self.get_text(json_url).await?;

        let document = json::parse(&json)?;
        info!(
            "Retrieved {} service tags (change number {}, cloud {:?})",
            document.values.len(),
            document.change_number,
            document.cloud
        );
        Ok(document)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let text = response.text().await?;
        debug!("GET {url}: {} bytes", text.len());
        Ok(text)
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn service_tags(&self) -> Result<Vec<ServiceTag>> {
        self.get_service_tags().await
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

lazy_static! {
    // Last "click here" anchor on the confirmation page.
    static ref CLICK_HERE_LINK: Regex =
        Regex::new(r#"(?s)^.*click here[^\n]+ href="([^"]+)""#).unwrap();
    static ref DIRECT_DOWNLOAD_LINK: Regex =
        Regex::new(r#"href="(https://download\.microsoft\.com/[^"]+\.json)""#).unwrap();
    static ref JSON_URL: Regex = Regex::new(r"^https://.*\.json").unwrap();
}

/// Extract the link to the JSON document from the download page body. The "click here" anchor
/// is preferred; a direct download link is the fallback. The first candidate that is an HTTPS
/// link to a `.json` document wins.
pub fn extract_download_link(page: &str, page_url: &str) -> Result<String> {
    [&*CLICK_HERE_LINK, &*DIRECT_DOWNLOAD_LINK]
        .iter()
        .filter_map(|pattern| pattern.captures(page))
        .filter_map(|captures| captures.get(1))
        .map(|link| link.as_str().replace("&amp;", "&"))
        .find(|link| JSON_URL.is_match(link))
        .ok_or_else(|| Error::CatalogLinkNotFound {
            page_url: page_url.to_string(),
        })
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::json::tests::TEST_CATALOG_JSON;
    use crate::core::test_server::TestServer;
    use axum::{http::StatusCode, routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use test_log::test;

    /// In-memory [CatalogSource].
    pub(crate) enum FakeCatalog {
        Tags(Vec<ServiceTag>),
        MissingLink,
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn service_tags(&self) -> Result<Vec<ServiceTag>> {
            match self {
                FakeCatalog::Tags(service_tags) => Ok(service_tags.clone()),
                FakeCatalog::MissingLink => Err(Error::CatalogLinkNotFound {
                    page_url: "https://example.com/download".to_string(),
                }),
            }
        }
    }

    const PAGE_URL: &str = config::DEFAULT_CATALOG_URL;

    #[test]
    fn test_extract_click_here_link() {
        let page = r#"<html><body>
<p>Your download should start automatically.</p>
<p>If it doesn't, <a class="mscom-link" href="https://example.com/other">help</a></p>
<p>Please click here to <a class="mscom-link failoverLink" href="https://download.microsoft.com/download/7/1/D/71D86715/ServiceTags_Public_20261012.json">download manually</a></p>
</body></html>"#;

        assert_eq!(
            extract_download_link(page, PAGE_URL).unwrap(),
            "https://download.microsoft.com/download/7/1/D/71D86715/ServiceTags_Public_20261012.json"
        );
    }

    #[test]
    fn test_extract_direct_download_link() {
        let page = r#"<a href="https://www.microsoft.com/en-us/">Home</a>
<a href="https://download.microsoft.com/download/7/1/D/ServiceTags_Public_20261012.json" class="dlcdetail__download-btn">Download</a>"#;

        assert_eq!(
            extract_download_link(page, PAGE_URL).unwrap(),
            "https://download.microsoft.com/download/7/1/D/ServiceTags_Public_20261012.json"
        );
    }

    #[test]
    fn test_missing_link_is_catalog_link_not_found() {
        let page = "<html><body>Nothing to see here</body></html>";

        let error = extract_download_link(page, PAGE_URL).unwrap_err();
        assert!(
            matches!(error, Error::CatalogLinkNotFound { ref page_url } if page_url == PAGE_URL)
        );
    }

    #[test]
    fn test_link_with_wrong_shape_is_rejected() {
        let plain_http = r#"Please click here to <a href="http://download.microsoft.com/ServiceTags.json">download</a>"#;
        let not_json = r#"Please click here to <a href="https://download.microsoft.com/ServiceTags.zip">download</a>"#;

        assert!(matches!(
            extract_download_link(plain_http, PAGE_URL),
            Err(Error::CatalogLinkNotFound { .. })
        ));
        assert!(matches!(
            extract_download_link(not_json, PAGE_URL),
            Err(Error::CatalogLinkNotFound { .. })
        ));
    }

    #[test]
    fn test_default_client_url() {
        let client = CatalogClient::default();
        assert_eq!(client.url(), config::DEFAULT_CATALOG_URL);

        let client = CatalogClientBuilder::default()
            .url("https://example.com/download")
            .build();
        assert_eq!(client.url(), "https://example.com/download");
    }

    #[test]
    fn test_direct_link_used_when_click_here_link_is_not_json() {
        let page = r#"<p>Please click here to read the <a href="https://www.microsoft.com/legal">terms</a></p>
<a href="https://download.microsoft.com/download/7/1/D/ServiceTags_Public_20261012.json">Download</a>"#;

        assert_eq!(
            extract_download_link(page, PAGE_URL).unwrap(),
            "https://download.microsoft.com/download/7/1/D/ServiceTags_Public_20261012.json"
        );
    }

    #[test]
    fn test_html_entities_in_link_are_decoded() {
        let page = r#"Please click here to <a href="https://download.microsoft.com/ServiceTags.json?a=1&amp;b=2.json">download</a>"#;

        assert_eq!(
            extract_download_link(page, PAGE_URL).unwrap(),
            "https://download.microsoft.com/ServiceTags.json?a=1&b=2.json"
        );
    }

    /*-------------------------------------------------------------------------
      Client Against a Local Server
    -------------------------------------------------------------------------*/

    const CLICK_HERE_PAGE: &str = r#"<p>Please click here to <a href="https://download.microsoft.com/download/ServiceTags_Public_20261012.json">download manually</a></p>"#;

    /// Serves `page` at `/download` and the test catalog at `/ServiceTags.json`, counting
    /// the catalog requests.
    async fn catalog_server(page: &'static str, status: StatusCode) -> (String, Arc<AtomicUsize>) {
        let document_requests = Arc::new(AtomicUsize::new(0));
        let counter = document_requests.clone();

        let router = Router::new()
            .route("/download", get(move || async move { (status, page) }))
            .route(
                "/ServiceTags.json",
                get(move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    TEST_CATALOG_JSON
                }),
            );

        let url = TestServer::bind().await.serve(router);
        (url, document_requests)
    }

    #[test(tokio::test)]
    async fn test_get_download_link_from_page() {
        let (url, _) = catalog_server(CLICK_HERE_PAGE, StatusCode::OK).await;
        let client = CatalogClientBuilder::default()
            .url(&format!("{url}/download"))
            .build();

        assert_eq!(
            client.get_download_link().await.unwrap(),
            "https://download.microsoft.com/download/ServiceTags_Public_20261012.json"
        );
    }

    #[test(tokio::test)]
    async fn test_get_document_from_server() {
        let (url, document_requests) = catalog_server(CLICK_HERE_PAGE, StatusCode::OK).await;
        let client = CatalogClientBuilder::default()
            .url(&format!("{url}/download"))
            .build();

        let document = client
            .get_document(&format!("{url}/ServiceTags.json"))
            .await
            .unwrap();

        assert_eq!(document.values.len(), 3);
        assert_eq!(document.values[0].id, "AzureCloud.eastasia");
        assert_eq!(document_requests.load(Ordering::SeqCst), 1);
    }

    #[test(tokio::test)]
    async fn test_page_without_link_stops_before_the_document() {
        let (url, document_requests) =
            catalog_server("<html>maintenance</html>", StatusCode::OK).await;
        let page_url = format!("{url}/download");
        let client = CatalogClientBuilder::default().url(&page_url).build();

        let error = client.get_service_tags().await.unwrap_err();

        assert!(matches!(
            error,
            Error::CatalogLinkNotFound { page_url: ref failed } if *failed == page_url
        ));
        assert_eq!(document_requests.load(Ordering::SeqCst), 0);
    }

    #[test(tokio::test)]
    async fn test_page_error_status_is_http_error() {
        let (url, document_requests) =
            catalog_server(CLICK_HERE_PAGE, StatusCode::SERVICE_UNAVAILABLE).await;
        let client = CatalogClientBuilder::default()
            .url(&format!("{url}/download"))
            .build();

        let error = client.get_service_tags().await.unwrap_err();

        assert!(matches!(error, Error::Http(_)));
        assert_eq!(document_requests.load(Ordering::SeqCst), 0);
    }
}
