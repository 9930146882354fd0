//! External service clients
//!
//! Stateless facades over the three external collaborators: the Spotify
//! accounts service (OAuth exchange), the Spotify Web API (catalog), and
//! Gemini (suggestion generation). Credentials are parameters, never
//! client state.

pub mod gemini_client;
pub mod spotify_auth;
pub mod spotify_client;

pub use gemini_client::{GeminiClient, GeneratedPlaylist};
pub use spotify_auth::SpotifyAuth;
pub use spotify_client::{AuthedCatalog, SpotifyClient, UserProfile};
