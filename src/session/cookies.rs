//! Persistent cookie store
//!
//! Keeps session cookies across runs in the Netscape cookie file format
//! (seven TAB-separated fields per line) and plugs into reqwest as a cookie
//! provider. The store is shared behind an `Arc`, so cookies survive the
//! client rebuild performed by the one-shot TLS fallback.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use reqwest::header::HeaderValue;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};

const FILE_HEADER: &str = "# Netscape HTTP Cookie File\n# Generated by lingualeo-importer. Edits may be overwritten.\n\n";

/// One stored cookie.
///
/// `expires` is unix seconds; 0 marks a session cookie. Session cookies are
/// persisted here, unlike the classic Mozilla jar, because dropping them
/// silently breaks stay-logged-in for services that issue them.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct CookieRecord {
    /// Cookie domain without the leading dot
    pub domain: String,
    /// Whether subdomains of `domain` also match
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    pub expires: u64,
    pub name: String,
    pub value: String,
}

impl fmt::Debug for CookieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieRecord")
            .field("domain", &self.domain)
            .field("include_subdomains", &self.include_subdomains)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("expires", &self.expires)
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

impl CookieRecord {
    fn is_expired(&self, now: u64) -> bool {
        self.expires > 0 && self.expires <= now
    }

    fn matches_host(&self, host: &str) -> bool {
        if host == self.domain {
            return true;
        }
        self.include_subdomains && host.ends_with(&format!(".{}", self.domain))
    }

    fn matches_path(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        if let Some(rest) = request_path.strip_prefix(&self.path) {
            return self.path.ends_with('/') || rest.starts_with('/');
        }
        false
    }

    fn to_netscape_line(&self) -> String {
        let domain = if self.include_subdomains {
            format!(".{}", self.domain)
        } else {
            self.domain.clone()
        };
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            domain,
            if self.include_subdomains { "TRUE" } else { "FALSE" },
            self.path,
            if self.secure { "TRUE" } else { "FALSE" },
            self.expires,
            self.name,
            self.value
        )
    }
}

/// Parse one Netscape cookie line. Comment and blank lines must be filtered
/// by the caller.
fn parse_netscape_line(line: &str) -> std::result::Result<CookieRecord, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 7 {
        return Err(format!("expected 7 TAB-separated fields, got {}", fields.len()));
    }

    let expires = fields[4]
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid expiry timestamp '{}'", fields[4]))?;

    let raw_domain = fields[0].trim();
    if raw_domain.is_empty() {
        return Err("empty domain".to_string());
    }

    Ok(CookieRecord {
        domain: raw_domain.trim_start_matches('.').to_lowercase(),
        include_subdomains: fields[1].trim().eq_ignore_ascii_case("TRUE"),
        path: if fields[2].trim().is_empty() {
            "/".to_string()
        } else {
            fields[2].trim().to_string()
        },
        secure: fields[3].trim().eq_ignore_ascii_case("TRUE"),
        expires,
        name: fields[5].trim().to_string(),
        value: fields[6].to_string(),
    })
}

/// Parse a whole cookie file body. Malformed lines are collected as
/// warnings instead of failing the load.
fn parse_netscape_file(content: &str) -> (Vec<CookieRecord>, Vec<String>) {
    let mut records = Vec::new();
    let mut warnings = Vec::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        // curl marks HttpOnly cookies with a prefix on the comment marker
        let line = if let Some(rest) = line.strip_prefix("#HttpOnly_") {
            rest
        } else if line.starts_with('#') {
            continue;
        } else {
            line
        };

        match parse_netscape_line(line) {
            Ok(record) => records.push(record),
            Err(reason) => warnings.push(format!("line {}: {}", index + 1, reason)),
        }
    }

    (records, warnings)
}

/// Parse one Set-Cookie header value against the request URL.
fn parse_set_cookie(header: &str, url: &Url) -> Option<CookieRecord> {
    let mut parts = header.split(';');

    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut record = CookieRecord {
        domain: url.host_str()?.to_lowercase(),
        include_subdomains: false,
        path: "/".to_string(),
        secure: false,
        expires: 0,
        name: name.to_string(),
        value: value.trim().to_string(),
    };

    let mut expires_attr: Option<u64> = None;
    let mut max_age_attr: Option<u64> = None;

    for part in parts {
        let part = part.trim();
        let (key, attr_value) = match part.split_once('=') {
            Some((k, v)) => (k.trim().to_lowercase(), v.trim()),
            None => (part.to_lowercase(), ""),
        };

        match key.as_str() {
            "domain" => {
                let domain = attr_value.trim_start_matches('.').to_lowercase();
                if !domain.is_empty() {
                    record.domain = domain;
                    record.include_subdomains = true;
                }
            }
            "path" => {
                if attr_value.starts_with('/') {
                    record.path = attr_value.to_string();
                }
            }
            "expires" => {
                if let Some(ts) = parse_http_date(attr_value) {
                    expires_attr = Some(ts);
                } else {
                    debug!("Ignoring unparseable cookie expiry: {}", attr_value);
                }
            }
            "max-age" => {
                max_age_attr = Some(match attr_value.parse::<i64>() {
                    // Non-positive Max-Age means delete now; 1 is safely in
                    // the past for any real clock
                    Ok(secs) if secs <= 0 => 1,
                    Ok(secs) => now_unix().saturating_add(secs as u64),
                    Err(_) => return Some(record),
                });
            }
            "secure" => record.secure = true,
            // HttpOnly and SameSite do not affect a non-browser client
            _ => {}
        }
    }

    // Max-Age takes precedence over Expires
    record.expires = max_age_attr.or(expires_attr).unwrap_or(0);
    Some(record)
}

fn parse_http_date(s: &str) -> Option<u64> {
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.timestamp().max(0) as u64)
}

fn now_unix() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Cookie store with optional Netscape-file persistence.
pub struct PersistentCookieJar {
    path: Option<PathBuf>,
    store: Mutex<Vec<CookieRecord>>,
}

impl fmt::Debug for PersistentCookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentCookieJar")
            .field("path", &self.path)
            .field("cookies", &self.len())
            .finish()
    }
}

impl PersistentCookieJar {
    /// Open a jar backed by `path`, or a memory-only jar when `path` is
    /// `None`.
    ///
    /// A missing file is created immediately so permission problems surface
    /// at startup; an unreadable or corrupt file falls back to an empty jar
    /// with a warning, never a failure.
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let jar = Self {
            path,
            store: Mutex::new(Vec::new()),
        };

        let Some(file) = jar.path.clone() else {
            return Ok(jar);
        };

        if !file.exists() {
            jar.save()?;
            return Ok(jar);
        }

        match std::fs::read_to_string(&file) {
            Ok(content) => {
                let (records, warnings) = parse_netscape_file(&content);
                for warning in &warnings {
                    warn!("Cookie file {}: {}", file.display(), warning);
                }
                debug!(
                    "Loaded {} cookie(s) from {}",
                    records.len(),
                    file.display()
                );
                *jar.lock() = records;
            }
            Err(e) => {
                warn!(
                    "Could not read cookie file {}: {}. Starting with an empty jar.",
                    file.display(),
                    e
                );
            }
        }

        Ok(jar)
    }

    /// Write the current cookies to the backing file. A no-op for
    /// memory-only jars. Expired cookies are pruned on the way out.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::cookie(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let now = now_unix();
        let mut body = String::from(FILE_HEADER);
        {
            let mut store = self.lock();
            store.retain(|record| !record.is_expired(now));
            for record in store.iter() {
                body.push_str(&record.to_netscape_line());
                body.push('\n');
            }
        }

        std::fs::write(path, body)
            .map_err(|e| Error::cookie(format!("cannot write {}: {}", path.display(), e)))?;
        debug!("Saved cookies to {}", path.display());
        Ok(())
    }

    /// Forget every cookie and delete the backing file, if any.
    pub fn clear(&self) -> Result<()> {
        self.lock().clear();
        if let Some(path) = &self.path
            && path.exists()
        {
            std::fs::remove_file(path)
                .map_err(|e| Error::cookie(format!("cannot remove {}: {}", path.display(), e)))?;
        }
        Ok(())
    }

    /// Number of stored cookies.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the jar holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CookieRecord>> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn upsert(&self, record: CookieRecord) {
        let mut store = self.lock();
        store.retain(|existing| {
            existing.name != record.name
                || existing.domain != record.domain
                || existing.path != record.path
        });
        if !record.is_expired(now_unix()) {
            store.push(record);
        }
    }

    fn header_for(&self, url: &Url) -> Option<HeaderValue> {
        let host = url.host_str()?.to_lowercase();
        let request_path = if url.path().is_empty() { "/" } else { url.path() };
        let https = url.scheme() == "https";
        let now = now_unix();

        let store = self.lock();
        let pairs: Vec<String> = store
            .iter()
            .filter(|record| {
                !record.is_expired(now)
                    && record.matches_host(&host)
                    && record.matches_path(request_path)
                    && (!record.secure || https)
            })
            .map(|record| format!("{}={}", record.name, record.value))
            .collect();

        if pairs.is_empty() {
            return None;
        }
        HeaderValue::from_str(&pairs.join("; ")).ok()
    }
}

impl reqwest::cookie::CookieStore for PersistentCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            if let Some(record) = parse_set_cookie(raw, url) {
                self.upsert(record);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.header_for(url)
    }
}
