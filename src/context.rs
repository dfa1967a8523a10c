// ABOUTME: Injected API session context for backend calls
// ABOUTME: Carries the base URL and bearer-token source instead of an ambient auth store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # API Context
//!
//! The capture pipeline never reads authentication state from a global
//! store. Every component that talks to the backend receives an explicit
//! [`ApiContext`] carrying the base URL and a [`TokenProvider`]. A 401 from
//! the backend is surfaced to the embedding app, which owns the login
//! redirect; this crate neither mints nor refreshes tokens.

use anyhow::{Context, Result};
use reqwest::RequestBuilder;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Source of the bearer token attached to every backend request
pub trait TokenProvider: Send + Sync {
    /// Current bearer token, if the session has one
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, for sessions whose token does not rotate mid-capture
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap an already-issued bearer token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Where to call the nutrition backend and how to authenticate
#[derive(Clone)]
pub struct ApiContext {
    base_url: String,
    token: Arc<dyn TokenProvider>,
}

impl ApiContext {
    /// Build a context from a base URL and a token source
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL does not parse as an absolute URL.
    pub fn new(base_url: &str, token: Arc<dyn TokenProvider>) -> Result<Self> {
        Url::parse(base_url).with_context(|| format!("invalid API base URL: {base_url}"))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
        })
    }

    /// Convenience constructor for a non-rotating token
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL does not parse as an absolute URL.
    pub fn with_static_token(base_url: &str, token: impl Into<String>) -> Result<Self> {
        Self::new(base_url, Arc::new(StaticToken::new(token)))
    }

    /// Absolute URL for a backend endpoint path
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer token to a request, when one is available
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiContext")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
