//! Carries the outcome of a post across to the next request in a short-lived cookie.
//!
//! The cookie jar percent-encodes values on the way out and decodes them on
//! the way in, so `message=Le%20coup%20de%20gueule...` is what travels.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::{Duration, OffsetDateTime};
use tracing::debug;

/// Name of the status cookie.
pub const STATUS_COOKIE: &str = "message";

/// Lifetime of the status cookie.
pub const STATUS_LIFETIME: Duration = Duration::seconds(3);

/// Outcome of the most recent publish attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusToken {
    /// The post was handed to the bus.
    Published,

    /// The post could not be handed to the bus.
    Failed,
}

impl StatusToken {
    /// The user-facing message for this outcome.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Published => "Le coup de gueule a été envoyé !...",
            Self::Failed => "Quelque chose de terrible s'est produit...",
        }
    }
}

/// The status read back from the cookie. Empty when there is none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Status {
    /// The decoded message.
    pub message: String,
}

impl Status {
    /// Whether no status was delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }
}

/// Stores `token` in the status cookie.
#[must_use]
pub fn write(jar: CookieJar, token: StatusToken) -> CookieJar {
    let cookie = Cookie::build((STATUS_COOKIE, token.message()))
        .http_only(true)
        .expires(OffsetDateTime::now_utc() + STATUS_LIFETIME)
        .max_age(STATUS_LIFETIME);

    jar.add(cookie)
}

/// Reads the status cookie.
///
/// The browser stops sending the cookie once it expires. A missing cookie,
/// like one whose value cannot be decoded, degrades to the empty status.
#[must_use]
pub fn read(jar: &CookieJar) -> Status {
    jar.get(STATUS_COOKIE).map_or_else(
        || {
            debug!("no status cookie present");
            Status::default()
        },
        |cookie| Status {
            message: cookie.value().to_string(),
        },
    )
}
