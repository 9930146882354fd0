//! Session guard: per-request authentication decisions
//!
//! Decides, for the credentials found in one request's cookie jar, whether
//! the caller is authenticated, needs a silent refresh, or must log in
//! again. The guard is re-entrant and side-effect-free: it never touches a
//! credential store itself, it hands the outcome (including any new tokens)
//! back for the caller to persist as cookies.
//!
//! Known limitation: two concurrent requests holding the same refresh
//! credential may both attempt the refresh grant. If the provider rotates
//! the refresh token on first use, the loser's grant fails definitively and
//! its session clears, forcing a re-login. Single-flight de-duplication is
//! deliberately not implemented; the race is rare (two tabs refreshing in
//! the same second) and the failure mode is a clean re-authentication.

use std::future::Future;
use tunesmith_common::model::{RequestCredentials, TokenRefresh};
use tunesmith_common::{Error, Result};

/// Identity-provider operations the guard needs.
///
/// `probe` is a lightweight authenticated call whose only job is to
/// distinguish "this access token works" from "this access token is
/// definitively rejected" from "the provider is unreachable". `refresh`
/// is the refresh-grant exchange.
pub trait IdentityProvider: Send + Sync {
    /// Validate an access token. `Ok(())` means usable; `Err(Auth)` means
    /// definitively rejected; `Err(TransientProvider)` means the probe
    /// itself failed and nothing can be concluded.
    fn probe(&self, access_token: &str) -> impl Future<Output = Result<()>> + Send;

    /// Mint a new access credential from a refresh credential.
    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<TokenRefresh>> + Send;
}

/// Outcome of the per-request authentication decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The presented access token is valid; keep using it.
    Authenticated { access_token: String },
    /// A new access credential was minted; the caller must persist it
    /// (and the rotated refresh token, when present) before responding.
    Refreshed {
        access_token: String,
        expires_in: u64,
        refresh_token: Option<String>,
    },
    /// No usable credentials; the caller should clear any remnants and
    /// send the user through login.
    Unauthenticated,
}

/// Run the authentication decision for one request.
///
/// The access credential, when present, is always tried before the
/// refresh credential: refresh grants are rate-limited far more strictly
/// by providers than ordinary authenticated calls.
///
/// Transient provider failures surface as `Err(TransientProvider)` so the
/// caller can return a retryable error; only a definitive authorization
/// rejection moves the state machine toward refresh or logout.
pub async fn authenticate<P: IdentityProvider>(
    provider: &P,
    credentials: &RequestCredentials,
) -> Result<AuthOutcome> {
    if credentials.is_empty() {
        return Ok(AuthOutcome::Unauthenticated);
    }

    if let Some(access_token) = &credentials.access_token {
        match provider.probe(access_token).await {
            Ok(()) => {
                return Ok(AuthOutcome::Authenticated {
                    access_token: access_token.clone(),
                });
            }
            Err(Error::Auth(reason)) => {
                tracing::debug!(%reason, "Access token rejected by provider");
                match &credentials.refresh_token {
                    Some(refresh_token) => return try_refresh(provider, refresh_token).await,
                    None => return Ok(AuthOutcome::Unauthenticated),
                }
            }
            // Rate limit, 5xx, timeout: nothing is known about the token.
            // Surface retryable instead of forcing a logout.
            Err(other) => return Err(other),
        }
    }

    match &credentials.refresh_token {
        Some(refresh_token) => try_refresh(provider, refresh_token).await,
        None => Ok(AuthOutcome::Unauthenticated),
    }
}

async fn try_refresh<P: IdentityProvider>(
    provider: &P,
    refresh_token: &str,
) -> Result<AuthOutcome> {
    match provider.refresh(refresh_token).await {
        Ok(tokens) => {
            tracing::info!("Access credential refreshed");
            Ok(AuthOutcome::Refreshed {
                access_token: tokens.access_token,
                expires_in: tokens.expires_in,
                refresh_token: tokens.refresh_token,
            })
        }
        Err(Error::TransientProvider(detail)) => Err(Error::TransientProvider(detail)),
        Err(e) => {
            tracing::info!(error = %e, "Refresh grant rejected; session expires");
            Ok(AuthOutcome::Unauthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed,
        RejectAuth,
        FailTransient,
    }

    struct StubProvider {
        probe: Behavior,
        refresh: Behavior,
        rotate_refresh: bool,
        probe_calls: AtomicUsize,
        refresh_calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(probe: Behavior, refresh: Behavior) -> Self {
            Self {
                probe,
                refresh,
                rotate_refresh: false,
                probe_calls: AtomicUsize::new(0),
                refresh_calls: AtomicUsize::new(0),
            }
        }
    }

    impl IdentityProvider for StubProvider {
        fn probe(&self, _access_token: &str) -> impl Future<Output = Result<()>> + Send {
            self.probe_calls.fetch_add(1, Ordering::SeqCst);
            let behavior = self.probe;
            async move {
                match behavior {
                    Behavior::Succeed => Ok(()),
                    Behavior::RejectAuth => Err(Error::Auth("401".into())),
                    Behavior::FailTransient => Err(Error::TransientProvider("503".into())),
                }
            }
        }

        fn refresh(&self, _refresh_token: &str) -> impl Future<Output = Result<TokenRefresh>> + Send {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            let behavior = self.refresh;
            let rotate = self.rotate_refresh;
            async move {
                match behavior {
                    Behavior::Succeed => Ok(TokenRefresh {
                        access_token: "new-access".into(),
                        expires_in: 3600,
                        refresh_token: rotate.then(|| "rotated-refresh".to_string()),
                    }),
                    Behavior::RejectAuth => Err(Error::Auth("invalid_grant".into())),
                    Behavior::FailTransient => Err(Error::TransientProvider("503".into())),
                }
            }
        }
    }

    fn creds(access: Option<&str>, refresh: Option<&str>) -> RequestCredentials {
        RequestCredentials {
            access_token: access.map(String::from),
            refresh_token: refresh.map(String::from),
        }
    }

    #[tokio::test]
    async fn no_credentials_short_circuits_without_network() {
        let provider = StubProvider::new(Behavior::Succeed, Behavior::Succeed);
        let outcome = authenticate(&provider, &creds(None, None)).await.unwrap();

        assert_eq!(outcome, AuthOutcome::Unauthenticated);
        assert_eq!(provider.probe_calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_access_token_never_touches_the_refresh_grant() {
        let provider = StubProvider::new(Behavior::Succeed, Behavior::Succeed);
        let outcome = authenticate(&provider, &creds(Some("tok"), Some("ref")))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            AuthOutcome::Authenticated {
                access_token: "tok".into()
            }
        );
        assert_eq!(provider.probe_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_access_with_refresh_produces_refreshed() {
        let provider = StubProvider::new(Behavior::RejectAuth, Behavior::Succeed);
        let outcome = authenticate(&provider, &creds(Some("stale"), Some("ref")))
            .await
            .unwrap();

        match outcome {
            AuthOutcome::Refreshed {
                access_token,
                expires_in,
                refresh_token,
            } => {
                assert_eq!(access_token, "new-access");
                assert_eq!(expires_in, 3600);
                assert!(refresh_token.is_none());
            }
            other => panic!("expected Refreshed, got {other:?}"),
        }
        assert_eq!(provider.probe_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_access_without_refresh_is_unauthenticated() {
        let provider = StubProvider::new(Behavior::RejectAuth, Behavior::Succeed);
        let outcome = authenticate(&provider, &creds(Some("stale"), None))
            .await
            .unwrap();

        assert_eq!(outcome, AuthOutcome::Unauthenticated);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_access_with_refresh_goes_straight_to_refresh() {
        let provider = StubProvider::new(Behavior::Succeed, Behavior::Succeed);
        let outcome = authenticate(&provider, &creds(None, Some("ref")))
            .await
            .unwrap();

        assert!(matches!(outcome, AuthOutcome::Refreshed { .. }));
        assert_eq!(provider.probe_calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn definitive_refresh_rejection_expires_the_session() {
        let provider = StubProvider::new(Behavior::Succeed, Behavior::RejectAuth);
        let outcome = authenticate(&provider, &creds(None, Some("revoked")))
            .await
            .unwrap();

        assert_eq!(outcome, AuthOutcome::Unauthenticated);
    }

    #[tokio::test]
    async fn transient_probe_failure_is_retryable_not_logout() {
        let provider = StubProvider::new(Behavior::FailTransient, Behavior::Succeed);
        let err = authenticate(&provider, &creds(Some("tok"), Some("ref")))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transient_refresh_failure_is_retryable_not_logout() {
        let provider = StubProvider::new(Behavior::Succeed, Behavior::FailTransient);
        let err = authenticate(&provider, &creds(None, Some("ref")))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn rotated_refresh_token_is_passed_back_to_the_caller() {
        let mut provider = StubProvider::new(Behavior::RejectAuth, Behavior::Succeed);
        provider.rotate_refresh = true;

        let outcome = authenticate(&provider, &creds(Some("stale"), Some("ref")))
            .await
            .unwrap();

        match outcome {
            AuthOutcome::Refreshed { refresh_token, .. } => {
                assert_eq!(refresh_token.as_deref(), Some("rotated-refresh"));
            }
            other => panic!("expected Refreshed, got {other:?}"),
        }
    }
}
