//! Update controller implementation
//!
//! Performs the manifest fetch on a worker thread using the blocking HTTP
//! client. The transport sits behind the small [`VersionFetch`] trait so the
//! retry, redirect, and coalescing logic is testable without a server.

use crate::config::SettingsController;
use crate::error::{PausaError, Result};
use parking_lot::Mutex;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Maximum number of retries after a failed fetch
const RETRY_MAX_COUNT: u32 = 3;

/// Delay between retries
const RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// How far a postponed update reminder is pushed out
const POSTPONE_INTERVAL_DAYS: u64 = 7;

/// HTTP request timeout
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Version manifest served at the version URL
///
/// All fields are optional: a manifest missing keys yields empty defaults
/// rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
struct VersionManifest {
    /// Newest released version, dotted decimal
    #[serde(default)]
    version: String,
    /// Release notes for the newest version
    #[serde(default, rename = "releaseNotes")]
    release_notes: String,
    /// Download URLs keyed by platform then word size
    #[serde(default)]
    urls: HashMap<String, HashMap<String, String>>,
}

/// Outcome of a completed update check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCheckResult {
    /// Newest version from the manifest
    pub newest_version: String,
    /// Release notes, empty when no update is available
    pub release_notes: String,
    /// Download URL for this platform and word size, empty when unknown
    pub platform_download_url: String,
    /// Whether the manifest version is newer than the running version
    pub update_available: bool,
}

/// Events emitted by the update controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    /// A check completed and parsed successfully
    CheckFinished(UpdateCheckResult),
    /// The retry budget was exhausted
    CheckError,
}

/// Minimal HTTP response surface the controller needs
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// `Location` header, when present
    pub location: Option<String>,
    /// Response body
    pub body: String,
}

/// Transport seam for the version manifest fetch
pub trait VersionFetch: Send + Sync {
    /// Perform one GET of the given URL without following redirects
    fn get(&self, url: &str) -> Result<FetchResponse>;
}

/// Production transport using the blocking reqwest client
struct HttpVersionFetch {
    client: reqwest::blocking::Client,
}

impl HttpVersionFetch {
    fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("Pausa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                warn!("Failed to create HTTP client: {}", e);
                // Preserve error chain by wrapping the source error
                PausaError::UpdateNetworkError(Box::new(e))
            })?;
        Ok(Self { client })
    }
}

impl VersionFetch for HttpVersionFetch {
    fn get(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).send().map_err(|e| {
            warn!("Failed to fetch version manifest: {}", e);
            // Preserve error chain by wrapping the source error
            PausaError::UpdateNetworkError(Box::new(e))
        })?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let body = response.text().map_err(|e| {
            warn!("Failed to read version manifest body: {}", e);
            PausaError::UpdateNetworkError(Box::new(e))
        })?;

        Ok(FetchResponse {
            status,
            location,
            body,
        })
    }
}

/// Compare two dotted version strings
///
/// Fields are compared numerically left to right; non-numeric fields count
/// as zero. When the field counts differ, the count difference decides the
/// ordering regardless of the field values (no implicit zero padding).
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_fields: Vec<i64> = a.split('.').map(|f| f.parse().unwrap_or(0)).collect();
    let b_fields: Vec<i64> = b.split('.').map(|f| f.parse().unwrap_or(0)).collect();

    if a_fields.len() != b_fields.len() {
        return a_fields.len().cmp(&b_fields.len());
    }
    a_fields.cmp(&b_fields)
}

/// Manifest key for the running platform
fn platform_key() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        ""
    }
}

/// Manifest key for the pointer width of this build
fn wordsize_key() -> &'static str {
    if size_of::<usize>() == 4 { "32bit" } else { "64bit" }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Update check controller
///
/// Holds the manifest URL (updated in place on permanent redirects), the
/// single-flight flag, and the retry budget. The result of the most recent
/// successful check backs the `download`/`postpone`/`skip` actions.
pub struct UpdateController {
    /// Version of the running application
    current_version: String,
    /// Manifest URL, replaced when the server answers 301
    version_url: Mutex<String>,
    /// Transport used for the fetch
    fetch: Box<dyn VersionFetch>,
    /// Event channel
    event_sender: mpsc::Sender<UpdateEvent>,
    /// Settings store for postpone/skip bookkeeping
    settings: Arc<SettingsController>,
    /// At most one outstanding check
    in_flight: Arc<AtomicBool>,
    /// Retries consumed by the current check
    retry_counter: AtomicU32,
    /// Delay between retries, shortened in tests
    retry_interval: Duration,
    /// Most recent successful check
    latest_result: Mutex<Option<UpdateCheckResult>>,
}

impl UpdateController {
    /// Create a controller using the blocking HTTP transport
    pub fn new(
        version_url: impl Into<String>,
        settings: Arc<SettingsController>,
        event_sender: mpsc::Sender<UpdateEvent>,
    ) -> Result<Self> {
        Ok(Self::with_fetch(
            version_url,
            settings,
            event_sender,
            Box::new(HttpVersionFetch::new()?),
            RETRY_INTERVAL,
        ))
    }

    /// Create a controller with an injected transport (tests)
    pub fn with_fetch(
        version_url: impl Into<String>,
        settings: Arc<SettingsController>,
        event_sender: mpsc::Sender<UpdateEvent>,
        fetch: Box<dyn VersionFetch>,
        retry_interval: Duration,
    ) -> Self {
        Self {
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            version_url: Mutex::new(version_url.into()),
            fetch,
            event_sender,
            settings,
            in_flight: Arc::new(AtomicBool::new(false)),
            retry_counter: AtomicU32::new(0),
            retry_interval,
            latest_result: Mutex::new(None),
        }
    }

    /// Override the version the controller considers "running" (tests)
    pub fn set_current_version(&mut self, version: impl Into<String>) {
        self.current_version = version.into();
    }

    /// Whether the last completed check found a newer version
    pub fn update_available(&self) -> bool {
        self.latest_result
            .lock()
            .as_ref()
            .is_some_and(|r| r.update_available)
    }

    /// Newest version reported by the last completed check
    pub fn newest_version(&self) -> String {
        self.latest_result
            .lock()
            .as_ref()
            .map(|r| r.newest_version.clone())
            .unwrap_or_default()
    }

    /// Release notes from the last completed check
    pub fn release_notes(&self) -> String {
        self.latest_result
            .lock()
            .as_ref()
            .map(|r| r.release_notes.clone())
            .unwrap_or_default()
    }

    /// Download URL for this platform from the last completed check
    pub fn platform_download_url(&self) -> String {
        self.latest_result
            .lock()
            .as_ref()
            .map(|r| r.platform_download_url.clone())
            .unwrap_or_default()
    }

    /// Whether the startup check should run now
    ///
    /// A check is due when none is scheduled or the scheduled time has
    /// passed.
    pub fn check_due(&self) -> bool {
        let next = self.settings.next_update_check();
        next == 0 || unix_now() >= next
    }

    /// Request an update check
    ///
    /// If a check is already in flight, the retry budget is reset and no
    /// additional network call is made. Otherwise the check runs on a worker
    /// thread and reports through the event channel.
    pub fn check_update_available(self: &Arc<Self>) {
        if self.in_flight.swap(true, AtomicOrdering::SeqCst) {
            // Coalesce with the outstanding request
            debug!("Update check already in flight, resetting retry budget");
            self.retry_counter.store(0, AtomicOrdering::SeqCst);
            return;
        }

        self.retry_counter.store(0, AtomicOrdering::SeqCst);
        let this = Arc::clone(self);
        thread::spawn(move || {
            this.run_check();
            this.in_flight.store(false, AtomicOrdering::SeqCst);
        });
    }

    /// Open the platform download URL in the default browser
    pub fn download(&self) {
        let url = self.platform_download_url();
        if url.is_empty() {
            warn!("No download URL available for this platform");
            return;
        }
        if let Err(e) = open::that(&url) {
            warn!("Failed to open download URL {}: {}", url, e);
        }
    }

    /// Remember the newest version and re-ask in a few days
    pub fn postpone(&self) -> Result<()> {
        let newest = self.newest_version();
        self.settings.set_update_version(newest)?;
        self.settings
            .set_next_update_check(unix_now() + POSTPONE_INTERVAL_DAYS * 24 * 60 * 60)
    }

    /// Remember the newest version and stop asking about it
    pub fn skip(&self) -> Result<()> {
        let newest = self.newest_version();
        self.settings.set_update_version(newest)?;
        self.settings.set_next_update_check(0)
    }

    /// Run one check to completion, including redirects and retries
    ///
    /// Blocking; called from the worker thread. Public so integration tests
    /// can drive the state machine synchronously.
    pub fn run_check(&self) {
        loop {
            let url = self.version_url.lock().clone();
            match self.fetch.get(&url) {
                Ok(response) if response.status == 200 => {
                    let result = self.parse_manifest(&response.body);
                    info!(
                        "Update check finished: newest {} (available: {})",
                        result.newest_version, result.update_available
                    );
                    *self.latest_result.lock() = Some(result.clone());
                    let _ = self.event_sender.send(UpdateEvent::CheckFinished(result));
                    return;
                }
                Ok(response) if response.status == 301 => {
                    // Permanent redirect, re-issue at the new location
                    // without consuming the retry budget
                    let Some(location) = response.location else {
                        warn!("Redirect response without Location header");
                        if self.consume_retry() {
                            continue;
                        }
                        return;
                    };
                    info!("Version manifest moved to {}", location);
                    *self.version_url.lock() = location;
                }
                Ok(response) => {
                    warn!("Update check failed with HTTP status {}", response.status);
                    if !self.consume_retry() {
                        return;
                    }
                }
                Err(e) => {
                    warn!("Update check transport error: {}", e);
                    if !self.consume_retry() {
                        return;
                    }
                }
            }
        }
    }

    /// Consume one retry; returns false when the budget is exhausted
    fn consume_retry(&self) -> bool {
        let used = self.retry_counter.fetch_add(1, AtomicOrdering::SeqCst);
        if used < RETRY_MAX_COUNT {
            thread::sleep(self.retry_interval);
            true
        } else {
            warn!("Update check retry budget exhausted");
            let _ = self.event_sender.send(UpdateEvent::CheckError);
            false
        }
    }

    fn parse_manifest(&self, body: &str) -> UpdateCheckResult {
        // Permissive: a malformed manifest degrades to empty defaults
        let manifest: VersionManifest = serde_json::from_str(body).unwrap_or_else(|e| {
            warn!("Malformed version manifest, using empty defaults: {}", e);
            VersionManifest::default()
        });

        let update_available =
            compare_versions(&self.current_version, &manifest.version) == Ordering::Less;

        let (release_notes, platform_download_url) = if update_available {
            let url = manifest
                .urls
                .get(platform_key())
                .and_then(|by_size| by_size.get(wordsize_key()))
                .cloned()
                .unwrap_or_default();
            (manifest.release_notes, url)
        } else {
            (String::new(), String::new())
        };

        UpdateCheckResult {
            newest_version: manifest.version,
            release_notes,
            platform_download_url,
            update_available,
        }
    }
}
