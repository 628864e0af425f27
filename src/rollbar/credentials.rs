//! Process-wide Rollbar access token.
//!
//! The token is registered once during start-up, before clients that rely on it are built.
//! A client constructed with an empty token reads the registered one for every item it sends.
//! Registering again replaces the previous token for the whole process.

use parking_lot::{RwLock, const_rwlock};

static REGISTERED_TOKEN: RwLock<Option<String>> = const_rwlock(None);

pub fn register_token(token: impl Into<String>) {
    *REGISTERED_TOKEN.write() = Some(token.into());
}

pub fn registered_token() -> Option<String> {
    REGISTERED_TOKEN.read().clone()
}

pub fn clear_registered_token() {
    *REGISTERED_TOKEN.write() = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial(rollbar_token)]
    fn test_last_registration_wins() {
        register_token("first");
        register_token("second");
        assert_eq!(registered_token().as_deref(), Some("second"));

        clear_registered_token();
        assert_eq!(registered_token(), None);
    }
}
