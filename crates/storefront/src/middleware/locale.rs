//! Request locale resolution.
//!
//! Precedence: `?lang=` (remembered in the session), the session, the
//! `Accept-Language` header, then `STORE_DEFAULT_LOCALE`.

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use laptop_shop_core::Locale;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::warn;

use crate::models::session_keys;
use crate::state::AppState;

/// The locale to answer this request in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

#[derive(Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().cloned();

        let requested = Query::<LangQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.lang)
            .and_then(|lang| lang.parse::<Locale>().ok());

        if let Some(locale) = requested {
            if let Some(session) = &session
                && let Err(e) = session.insert(session_keys::LOCALE, locale).await
            {
                warn!(error = %e, "Failed to remember locale");
            }
            return Ok(Self(locale));
        }

        if let Some(session) = &session
            && let Ok(Some(locale)) = session.get::<Locale>(session_keys::LOCALE).await
        {
            return Ok(Self(locale));
        }

        let from_header = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(Locale::from_accept_language);

        Ok(Self(
            from_header.unwrap_or(state.config().store.default_locale),
        ))
    }
}
