//! # Session Management Module
//!
//! Authenticated access to the LinguaLeo API. The [`Session`] owns the HTTP
//! client, the persistent cookie jar and the credentials, and exposes the
//! remote operations the import pipeline is built from:
//!
//! - session establishment: replay saved cookies, fall back to a form login
//! - collection listing (`GetWordSets`)
//! - word listing (`GetWords`), both the date-group revision and the legacy
//!   flat revision, driven by [`DateGroupCursor`]
//!
//! ## TLS fallback
//!
//! Desktop hosts do not always have usable CA roots (Anki bundles its own
//! Python and OpenSSL). The first certificate validation failure therefore
//! rebuilds the client with verification disabled for the rest of the
//! session and retries the request once. The cookie jar is shared through
//! an [`Arc`], so the rebuilt client keeps the session cookies.
//!
//! ## Examples
//!
//! ```rust
//! use lingualeo_importer::config::Settings;
//! use lingualeo_importer::session::Session;
//!
//! let mut settings = Settings::default();
//! settings.account.stay_logged_in = false;
//! let session = Session::new(settings)?;
//! assert!(!session.is_authenticated());
//! # Ok::<(), lingualeo_importer::Error>(())
//! ```

use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::types::{describe_chain, is_certificate_error};
use crate::error::{Error, Result};
use crate::types::request::{legacy_words_body, wordsets_body};
use crate::types::{
    AuthCheckResponse, AuthResponse, LegacyWordsResponse, WordRecord, Wordset, WordsResponse,
    WordsetsResponse, remote_error_message,
};
use crate::vocab::DateGroupCursor;

use super::{CancelFlag, PersistentCookieJar};

/// Authenticated LinguaLeo API session.
pub struct Session {
    settings: Arc<Settings>,
    cookies: Arc<PersistentCookieJar>,
    client: Client,
    authenticated: bool,
    tls_fallback_engaged: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.authenticated)
            .field("tls_fallback_engaged", &self.tls_fallback_engaged)
            .field("cookies", &self.cookies)
            .finish()
    }
}

impl Session {
    /// Create a session from settings.
    ///
    /// Opens the cookie jar at the configured path (creating the file if
    /// missing, so permission problems surface immediately) and builds the
    /// HTTP client around it. No network traffic happens here.
    pub fn new(settings: Settings) -> Result<Self> {
        let cookies = Arc::new(PersistentCookieJar::open(settings.cookie_path())?);
        let client = build_client(&settings, Arc::clone(&cookies), false)?;

        Ok(Self {
            settings: Arc::new(settings),
            cookies,
            client,
            authenticated: false,
            tls_fallback_engaged: false,
        })
    }

    /// The settings this session was built from.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether a session has been established during this run.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Make sure the service will accept API calls: replayed cookies first,
    /// form login as the fallback.
    pub async fn ensure_session(&mut self) -> Result<()> {
        if self.authenticated {
            return Ok(());
        }

        if self.is_authorized().await? {
            debug!("Saved session cookies are still valid");
            self.authenticated = true;
            return Ok(());
        }

        self.login().await
    }

    /// Log in with the configured email and password.
    ///
    /// Cookies from the exchange are persisted before the body is inspected;
    /// a rejection (non-empty `error_msg`) surfaces as [`Error::Remote`]
    /// carrying the service's own message.
    pub async fn login(&mut self) -> Result<()> {
        let email = self.settings.account.email.clone();
        if email.is_empty() {
            return Err(Error::config(
                "account email is not set; pass --email or set LINGUALEO_EMAIL",
            ));
        }
        let Some(password) = self.settings.account.password.clone() else {
            return Err(Error::config(
                "account password is not set; pass --password or set LINGUALEO_PASSWORD",
            ));
        };

        info!("Logging in to LinguaLeo as {}", email);
        let auth_url = self.settings.api.auth_url.clone();
        let response = self
            .post_form(
                &auth_url,
                &[("email", email.as_str()), ("password", password.as_str())],
            )
            .await?;

        let body = response.text().await?;
        let auth: AuthResponse = decode_json(&body)?;
        self.cookies.save()?;

        if let Some(message) = auth.rejection() {
            warn!("Login rejected: {}", message);
            return Err(Error::remote(message));
        }

        self.authenticated = true;
        info!("Login successful");
        Ok(())
    }

    /// Ask the service whether the current cookies identify a user.
    pub async fn is_authorized(&mut self) -> Result<bool> {
        let url = self.api_url("api/isauthorized");
        let response = self
            .send_with_fallback(|client| client.get(&url))
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let check: AuthCheckResponse = decode_json(&body)?;
        Ok(check.authorized())
    }

    /// Drop the session: forget all cookies and delete the cookie file.
    pub fn logout(&mut self) -> Result<()> {
        self.cookies.clear()?;
        self.authenticated = false;
        info!("Session cleared");
        Ok(())
    }

    /// List the user's non-empty collections.
    pub async fn fetch_wordsets(&mut self) -> Result<Vec<Wordset>> {
        self.ensure_session().await?;

        debug!("Requesting collection list");
        let response: WordsetsResponse = self.post_api_json("GetWordSets", &wordsets_body()).await?;

        if let Some(message) = remote_error_message(response.error.as_ref()) {
            return Err(Error::remote(message));
        }
        let mut pages = match response.data {
            Some(pages) if !pages.is_empty() => pages,
            _ => return Err(Error::protocol("GetWordSets response carried no data")),
        };

        let wordsets: Vec<Wordset> = pages
            .swap_remove(0)
            .items
            .into_iter()
            .filter(|wordset| wordset.has_words())
            .collect();

        self.cookies.save()?;
        debug!("Found {} non-empty collection(s)", wordsets.len());
        Ok(wordsets)
    }

    /// Download every word of one collection through the date-group listing.
    ///
    /// The cancel flag is checked between page requests; cancellation
    /// surfaces as [`Error::Cancelled`].
    pub async fn fetch_words(
        &mut self,
        wordset_id: u64,
        cancel: &CancelFlag,
    ) -> Result<Vec<WordRecord>> {
        self.ensure_session().await?;

        let mut cursor = DateGroupCursor::new(wordset_id, self.settings.api.words_per_request);
        let mut words = Vec::new();

        while let Some(query) = cursor.next_query() {
            cancel.check()?;
            debug!(
                "Requesting words of collection {}: bucket '{}', offset {:?}",
                wordset_id, query.date_group, query.offset_word_id
            );

            let response: WordsResponse = self.post_api_json("GetWords", &query.body()).await?;
            if let Some(message) = remote_error_message(response.error.as_ref()) {
                return Err(Error::remote(message));
            }
            let groups = match response.data {
                Some(groups) if !groups.is_empty() => groups,
                _ => return Err(Error::protocol("GetWords response carried no data")),
            };

            words.extend(cursor.absorb(groups)?);
        }

        self.cookies.save()?;
        debug!("Collection {} holds {} word(s)", wordset_id, words.len());
        Ok(words)
    }

    /// Download every word of one collection through the legacy flat
    /// listing (apiVersion 1.0.0).
    ///
    /// Kept because the date-group revision of the service has been observed
    /// to omit words that the old revision still returns.
    pub async fn fetch_words_legacy(
        &mut self,
        wordset_id: u64,
        cancel: &CancelFlag,
    ) -> Result<Vec<WordRecord>> {
        self.ensure_session().await?;

        let per_page = self.settings.api.words_per_request;
        let mut words: Vec<WordRecord> = Vec::new();
        let mut offset_word_id = None;

        loop {
            cancel.check()?;
            debug!(
                "Requesting legacy words of collection {}: offset {:?}",
                wordset_id, offset_word_id
            );

            let body = legacy_words_body("all", wordset_id, per_page, offset_word_id);
            let response: LegacyWordsResponse = self.post_api_json("GetWords", &body).await?;
            if let Some(message) = remote_error_message(response.error.as_ref()) {
                return Err(Error::remote(message));
            }
            let batch = response
                .data
                .ok_or_else(|| Error::protocol("GetWords response carried no data"))?;

            if batch.is_empty() {
                break;
            }
            offset_word_id = batch.last().map(|word| word.id);
            words.extend(batch);
        }

        self.cookies.save()?;
        debug!(
            "Collection {} holds {} word(s) (legacy listing)",
            wordset_id,
            words.len()
        );
        Ok(words)
    }

    /// POST a JSON body to an API path and decode the JSON response.
    async fn post_api_json<T: DeserializeOwned>(&mut self, path: &str, body: &Value) -> Result<T> {
        let url = self.api_url(path);
        let response = self
            .send_with_fallback(|client| client.post(&url).json(body))
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        decode_json(&text)
    }

    /// POST url-encoded form fields to an absolute URL.
    async fn post_form(&mut self, url: &str, fields: &[(&str, &str)]) -> Result<reqwest::Response> {
        self.send_with_fallback(|client| client.post(url).form(fields))
            .await
    }

    /// Send a request, retrying once without certificate verification if the
    /// first attempt failed TLS validation and the fallback has not been
    /// used yet.
    async fn send_with_fallback<F>(&mut self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&Client) -> reqwest::RequestBuilder,
    {
        match build(&self.client).send().await {
            Ok(response) => Ok(response),
            Err(e) if !self.tls_fallback_engaged && is_certificate_error(&e) => {
                warn!(
                    "Certificate verification failed ({}); retrying once with verification disabled",
                    describe_chain(&e)
                );
                self.tls_fallback_engaged = true;
                self.client = build_client(&self.settings, Arc::clone(&self.cookies), true)?;
                Ok(build(&self.client).send().await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.api.base_url.trim_end_matches('/'), path)
    }
}

fn build_client(
    settings: &Settings,
    cookies: Arc<PersistentCookieJar>,
    accept_invalid_certs: bool,
) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(settings.api.user_agent.clone())
        .timeout(settings.api.request_timeout())
        .cookie_provider(cookies);
    if accept_invalid_certs {
        builder = builder.danger_accept_invalid_certs(true);
    }
    Ok(builder.build()?)
}

/// Decode a JSON body, reporting the path of the offending field on
/// structurally unexpected responses.
fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        Error::protocol(format!(
            "unexpected response shape at {}: {}",
            e.path(),
            e.inner()
        ))
    })
}
