//! # Shared Constants
//!
//! This module provides a centralized location for constants that are shared across
//! the `brandsight` workspace. Using these constants helps to avoid "magic strings"
//! and ensures consistency between the library, the server and the tests.

/// The default path for the main application SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/brandsight.db";

/// The identifier used for callers that do not present an identity.
pub const GUEST_USER_IDENTIFIER: &str = "::guest::";

/// How many results are requested from the search provider for each prompt.
pub const DEFAULT_NUM_RESULTS: usize = 5;

/// The maximum number of characters extracted per page.
pub const DEFAULT_MAX_CHARACTERS: usize = 5000;

/// The generative model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TOP_P: f32 = 0.8;
pub const DEFAULT_TOP_K: u32 = 40;

/// Base URLs of the hosted providers.
pub const EXA_API_URL: &str = "https://api.exa.ai";
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Per-call timeout applied to every remote provider request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
