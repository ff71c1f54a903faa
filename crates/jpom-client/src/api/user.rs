// ABOUTME: User/session endpoints
// ABOUTME: Explicit token renewal for callers that manage their own retry

use crate::dispatch::{Dispatcher, RENEWAL_PATH};
use crate::error::ApiError;
use crate::request::ApiRequest;
use crate::session::LoginData;

/// Renew the current session token and store the result in the session store.
///
/// Unlike the automatic path taken on an 801 response this goes through the
/// full classifier, so an invalid session still sends the user to login.
pub async fn renewal(dispatcher: &Dispatcher) -> Result<LoginData, ApiError> {
    let login: LoginData = dispatcher.request(ApiRequest::post(RENEWAL_PATH)).await?;
    dispatcher.session().update(login.clone());
    Ok(login)
}
