// ABOUTME: Pure response-code classification for Jpom envelopes
// ABOUTME: Maps an envelope code to the disposition the dispatcher acts on

use crate::envelope::{
    CODE_ACCOUNT_DISABLED, CODE_FORBIDDEN, CODE_SESSION_EXPIRING, CODE_SESSION_INVALID,
    CODE_SUCCESS,
};

/// What the dispatcher must do with a decoded envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 200: hand the payload back to the caller.
    PassThrough,
    /// 800 / 802: notify, clear the session and send the user to login.
    ForceLogin(LoginReason),
    /// 801: try a silent renewal, then fail the call.
    Renew,
    /// 999: notify and hard-redirect to the forbidden page.
    BlockAccess,
    /// Anything else: notify (unless suppressed) and fail the call.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginReason {
    SessionInvalid,
    AccountDisabled,
}

/// Classify an envelope code.
pub fn classify(code: i32) -> Disposition {
    match code {
        CODE_SUCCESS => Disposition::PassThrough,
        CODE_SESSION_INVALID => Disposition::ForceLogin(LoginReason::SessionInvalid),
        CODE_SESSION_EXPIRING => Disposition::Renew,
        CODE_ACCOUNT_DISABLED => Disposition::ForceLogin(LoginReason::AccountDisabled),
        CODE_FORBIDDEN => Disposition::BlockAccess,
        _ => Disposition::Fail,
    }
}
