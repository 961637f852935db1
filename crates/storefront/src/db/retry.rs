//! Retry transient database failures with exponential back-off and jitter.
//!
//! [`with_retry`] wraps any fallible async database operation. Errors are
//! first reduced to a closed [`ErrorClass`] at the driver boundary (see
//! [`Classify`]); only [`ErrorClass::Transient`] failures are retried.
//!
//! **Retriable:**
//! - Duplicate or missing prepared statements (pooler reuse after a reset).
//! - Connection failures, resets, timeouts and DNS resolution failures.
//! - Serialization failures and deadlocks.
//!
//! **Not retriable:** constraint violations, syntax errors, missing rows and
//! every SQLSTATE code not listed in [`RetryableCodes`].
//!
//! Back-off schedule with the default policy (`base = 200 ms`):
//!
//! | Failed attempt | Sleep before next attempt   |
//! |----------------|-----------------------------|
//! | 1              | 200 ms + 0-100 ms jitter    |
//! | 2              | 400 ms + 0-100 ms jitter    |
//! | 3              | (no retry, error returned)  |
//!
//! Delays are capped at 5 s.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

/// Longest error message excerpt written to the retry log.
const LOG_MESSAGE_LIMIT: usize = 200;

/// Why a failure is expected to go away on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientKind {
    /// A prepared statement already exists or has vanished on the server.
    PreparedStatement,
    /// The connection could not be opened or was dropped.
    Connection,
    /// The connection or statement timed out.
    Timeout,
    /// The database host name could not be resolved.
    Dns,
    /// The transaction lost a serialization race or deadlocked.
    TransactionConflict,
}

impl TransientKind {
    /// Stable snake-case name used in configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreparedStatement => "prepared_statement",
            Self::Connection => "connection",
            Self::Timeout => "timeout",
            Self::Dns => "dns",
            Self::TransactionConflict => "transaction_conflict",
        }
    }
}

impl fmt::Display for TransientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransientKind {
    type Err = RetryCodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prepared_statement" => Ok(Self::PreparedStatement),
            "connection" => Ok(Self::Connection),
            "timeout" => Ok(Self::Timeout),
            "dns" => Ok(Self::Dns),
            "transaction_conflict" => Ok(Self::TransactionConflict),
            other => Err(RetryCodeParseError::UnknownKind(other.to_owned())),
        }
    }
}

/// Retry decision for a single failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Worth retrying after a back-off delay.
    Transient(TransientKind),
    /// Will fail the same way again; surface immediately.
    Fatal,
}

/// Error parsing a retryable-code override list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryCodeParseError {
    /// An entry was not of the form `CODE=kind`.
    #[error("expected CODE=kind, got {0:?}")]
    MalformedEntry(String),
    /// The kind name is not a known [`TransientKind`].
    #[error("unknown transient kind {0:?}")]
    UnknownKind(String),
}

/// SQLSTATE codes treated as transient, keyed to their kind.
const DEFAULT_RETRYABLE_CODES: &[(&str, TransientKind)] = &[
    // duplicate_prepared_statement / invalid_sql_statement_name
    ("42P05", TransientKind::PreparedStatement),
    ("26000", TransientKind::PreparedStatement),
    // Class 08: connection exception
    ("08000", TransientKind::Connection),
    ("08001", TransientKind::Connection),
    ("08003", TransientKind::Connection),
    ("08004", TransientKind::Connection),
    ("08006", TransientKind::Connection),
    // admin_shutdown / cannot_connect_now
    ("57P01", TransientKind::Connection),
    ("57P03", TransientKind::Connection),
    // query_canceled (statement_timeout)
    ("57014", TransientKind::Timeout),
    // serialization_failure / deadlock_detected
    ("40001", TransientKind::TransactionConflict),
    ("40P01", TransientKind::TransactionConflict),
];

/// Table of database error codes that should be retried.
///
/// Defaults to the Postgres SQLSTATEs for prepared-statement conflicts,
/// connection exceptions, statement timeouts and transaction conflicts.
/// Deployments can extend it through `STOREFRONT_DB_RETRYABLE_CODES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryableCodes {
    codes: HashMap<String, TransientKind>,
}

impl Default for RetryableCodes {
    fn default() -> Self {
        Self {
            codes: DEFAULT_RETRYABLE_CODES
                .iter()
                .map(|(code, kind)| ((*code).to_owned(), *kind))
                .collect(),
        }
    }
}

impl RetryableCodes {
    /// An empty table; nothing identified by code is retried.
    #[cfg(test)]
    fn empty() -> Self {
        Self {
            codes: HashMap::new(),
        }
    }

    /// Look up the transient kind for an error code.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<TransientKind> {
        self.codes.get(code).copied()
    }


    /// Parse an override list such as `"55P03=timeout, XX000=connection"`.
    ///
    /// Blank entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RetryCodeParseError`] if an entry has no `=` or names an
    /// unknown kind.
    pub fn parse_overrides(
        input: &str,
    ) -> Result<Vec<(String, TransientKind)>, RetryCodeParseError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (code, kind) = entry
                    .split_once('=')
                    .ok_or_else(|| RetryCodeParseError::MalformedEntry(entry.to_owned()))?;
                let code = code.trim();
                if code.is_empty() {
                    return Err(RetryCodeParseError::MalformedEntry(entry.to_owned()));
                }
                Ok((code.to_owned(), kind.trim().parse()?))
            })
            .collect()
    }

    /// Return the table with `overrides` applied on top.
    #[must_use]
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = (String, TransientKind)>) -> Self {
        self.codes.extend(overrides);
        self
    }
}

/// Reduce a driver error to an [`ErrorClass`].
pub trait Classify {
    /// Decide whether this failure is worth retrying.
    fn classify(&self, codes: &RetryableCodes) -> ErrorClass;

    /// Driver-specific error code, if any, for logging.
    fn error_code(&self) -> Option<String> {
        None
    }
}

impl Classify for sqlx::Error {
    fn classify(&self, codes: &RetryableCodes) -> ErrorClass {
        match self {
            Self::Io(err) => ErrorClass::Transient(classify_io(err)),
            Self::PoolTimedOut => ErrorClass::Transient(TransientKind::Timeout),
            Self::PoolClosed | Self::WorkerCrashed | Self::Tls(_) => {
                ErrorClass::Transient(TransientKind::Connection)
            }
            Self::Protocol(msg) if msg.contains("prepared statement") => {
                ErrorClass::Transient(TransientKind::PreparedStatement)
            }
            Self::Database(db) => db
                .code()
                .and_then(|code| codes.lookup(&code))
                .map_or(ErrorClass::Fatal, ErrorClass::Transient),
            _ => ErrorClass::Fatal,
        }
    }

    fn error_code(&self) -> Option<String> {
        match self {
            Self::Database(db) => db.code().map(std::borrow::Cow::into_owned),
            _ => None,
        }
    }
}

/// Name-resolution failures surface as plain I/O errors; the resolver
/// message is the only signal.
fn classify_io(err: &std::io::Error) -> TransientKind {
    const DNS_MARKERS: &[&str] = &[
        "failed to lookup address",
        "Name or service not known",
        "nodename nor servname",
        "No such host",
        "ENOTFOUND",
    ];

    if err.kind() == std::io::ErrorKind::TimedOut {
        return TransientKind::Timeout;
    }

    let message = err.to_string();
    if DNS_MARKERS.iter().any(|marker| message.contains(marker)) {
        TransientKind::Dns
    } else {
        TransientKind::Connection
    }
}

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    max_jitter: Duration,
    codes: Arc<RetryableCodes>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            base_delay: Self::DEFAULT_BASE_DELAY,
            max_delay: Self::MAX_DELAY,
            max_jitter: Self::DEFAULT_MAX_JITTER,
            codes: Arc::new(RetryableCodes::default()),
        }
    }
}

impl RetryPolicy {
    /// Total attempts, including the first one.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Delay before the second attempt, doubled for each further one.
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);
    /// Upper bound for random jitter added to each delay.
    pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(100);
    /// Upper bound for any single delay, jitter included.
    pub const MAX_DELAY: Duration = Duration::from_millis(5_000);

    /// Set the total number of attempts. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the base delay.
    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the maximum jitter added to each delay.
    #[must_use]
    pub const fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Replace the retryable code table.
    #[must_use]
    pub fn with_codes(mut self, codes: RetryableCodes) -> Self {
        self.codes = Arc::new(codes);
        self
    }

    /// Total attempts, including the first one.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The configured base delay.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// The retryable code table.
    #[must_use]
    pub fn codes(&self) -> &RetryableCodes {
        &self.codes
    }

    /// Delay to wait after failed attempt `attempt` (1-indexed):
    /// `min(base * 2^(attempt - 1) + jitter, 5 s)`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .saturating_add(jitter)
            .min(self.max_delay)
    }

    fn random_jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}

/// Runs `operation` until it succeeds, fails fatally, or `max_attempts`
/// attempts have been made.
///
/// Fatal errors are returned after the first invocation. When every attempt
/// fails transiently the error from the last attempt is returned. The wait
/// between attempts is a `tokio` timer and never blocks the worker thread.
///
/// # Errors
///
/// Returns the operation's error as described above.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: Classify + fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let ErrorClass::Transient(kind) = err.classify(policy.codes()) else {
            tracing::debug!(attempt, error = %err, "Database error is not retriable");
            return Err(err);
        };

        let code = err.error_code();
        let message = truncate(&err.to_string(), LOG_MESSAGE_LIMIT);

        if attempt >= policy.max_attempts {
            tracing::error!(
                attempt,
                max_attempts = policy.max_attempts,
                kind = %kind,
                code = code.as_deref().unwrap_or("-"),
                error = %message,
                "Database operation failed after final attempt"
            );
            return Err(err);
        }

        let delay = policy.backoff_delay(attempt, policy.random_jitter());
        tracing::warn!(
            attempt,
            max_attempts = policy.max_attempts,
            kind = %kind,
            code = code.as_deref().unwrap_or("-"),
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %message,
            "Transient database error, retrying after back-off"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

fn truncate(message: &str, limit: usize) -> String {
    match message.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", message.get(..idx).unwrap_or(message)),
        None => message.to_owned(),
    }
}
