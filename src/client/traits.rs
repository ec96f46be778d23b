// ABOUTME: Trait seam between the session pool's repair task and the sessions it repairs
// ABOUTME: Futures are required to be Send so repairs can run on a spawned task

use crate::client::error::S2aResult;
use crate::client::types::Credentials;
use std::future::Future;

/// A session that can be torn down and re-established in place.
///
/// The repair task calls `reconnect` once per retry, so an implementation
/// should make at most one authentication attempt per call.
pub trait Reconnect: Send + 'static {
    /// Close whatever is left of the old connection, dial and authenticate.
    fn reconnect(
        &mut self,
        credentials: &Credentials,
    ) -> impl Future<Output = S2aResult<()>> + Send;

    /// Release the connection for good. Used when the session is dropped
    /// from service.
    fn shut_down(&mut self) -> impl Future<Output = ()> + Send;
}
