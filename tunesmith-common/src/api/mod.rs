//! Shared HTTP API types
//!
//! Request/response payloads exchanged with the presentation layer. The
//! wire form is camelCase JSON; these types are the single source of
//! truth for field names on both sides of the API.

pub mod types;

pub use types::{
    AuthCheckResponse, ChatRequest, ChatResponse, CreatePlaylistRequest, CreatePlaylistResponse,
    ErrorBody, LogoutResponse, PlaylistSuggestion,
};
