//! Session cookie contract.
//!
//! The vendor area uses `session` (actor id), `sessionCreated` (RFC 3339
//! timestamp) and `testMode`. Customer, admin and delivery sessions are a
//! single cookie holding `<actor id>|<issued at>`. All of them are signed,
//! so a client cannot mint a marker for an id it did not sign in as, and
//! every marker is refused once its issue time is older than the session
//! lifetime.

use actix_web::cookie::{time, Cookie, CookieJar, Key, SameSite};
use chrono::{DateTime, Duration, Utc};

use crate::config::ConfigError;
use crate::domain::session::{Role, SessionMarker};

pub const CUSTOMER_SESSION: &str = "customer_session";
pub const VENDOR_SESSION: &str = "session";
pub const ADMIN_SESSION: &str = "admin_session";
pub const DELIVERY_SESSION: &str = "delivery_session";
pub const TEST_MODE: &str = "testMode";
pub const SESSION_CREATED: &str = "sessionCreated";

pub fn cookie_name(role: Role) -> &'static str {
    match role {
        Role::Customer => CUSTOMER_SESSION,
        Role::Vendor => VENDOR_SESSION,
        Role::Admin => ADMIN_SESSION,
        Role::Delivery => DELIVERY_SESSION,
    }
}

#[derive(Clone)]
pub struct SessionKeys {
    key: Key,
    days: i64,
    secure: bool,
}

impl SessionKeys {
    pub fn new(secret: &[u8], days: i64, secure: bool) -> Result<Self, ConfigError> {
        if secret.len() < 32 {
            return Err(ConfigError::Invalid {
                name: "SESSION_SECRET",
                reason: "must be at least 32 bytes".to_string(),
            });
        }
        Ok(Self {
            key: Key::derive_from(secret),
            days: days.max(1),
            secure,
        })
    }

    fn build(&self, name: &'static str, value: String, http_only: bool) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(http_only)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::days(self.days))
            .finish()
    }

    /// Signed cookies establishing `marker`.
    pub fn issue(&self, marker: &SessionMarker) -> Vec<Cookie<'static>> {
        let created = marker.created_at.unwrap_or_else(Utc::now).to_rfc3339();
        let mut jar = CookieJar::new();
        {
            let mut signed = jar.signed_mut(&self.key);
            if marker.role == Role::Vendor {
                signed.add(self.build(VENDOR_SESSION, marker.actor_id.clone(), true));
                signed.add(self.build(SESSION_CREATED, created, false));
                if marker.test_mode {
                    signed.add(self.build(TEST_MODE, "true".to_string(), false));
                }
            } else {
                let value = format!("{}|{}", marker.actor_id, created);
                signed.add(self.build(cookie_name(marker.role), value, true));
            }
        }
        jar.delta().cloned().collect()
    }

    /// Removal cookies for every cookie of `role`.
    pub fn clear(&self, role: Role) -> Vec<Cookie<'static>> {
        let names: &[&'static str] = match role {
            Role::Customer => &[CUSTOMER_SESSION],
            Role::Vendor => &[VENDOR_SESSION, TEST_MODE, SESSION_CREATED],
            Role::Admin => &[ADMIN_SESSION],
            Role::Delivery => &[DELIVERY_SESSION],
        };
        names
            .iter()
            .map(|name| {
                let mut c = Cookie::build(*name, "").path("/").finish();
                c.make_removal();
                c
            })
            .collect()
    }

    fn verified(&self, cookie: Cookie<'static>) -> Option<String> {
        let name = cookie.name().to_string();
        let mut jar = CookieJar::new();
        jar.add_original(cookie);
        let value = jar.signed(&self.key).get(&name)?.value().to_string();
        Some(value)
    }

    /// Issue time of a marker, if it parses and is still within the
    /// session lifetime.
    fn fresh(&self, raw: &str) -> Option<DateTime<Utc>> {
        let created = DateTime::parse_from_rfc3339(raw).ok()?.with_timezone(&Utc);
        let age = Utc::now() - created;
        if age > Duration::days(self.days) || age < -Duration::minutes(5) {
            return None;
        }
        Some(created)
    }

    /// Recover the marker for `role` using `lookup` to fetch raw request
    /// cookies by name. Unsigned, tampered, undated or expired markers read
    /// as absent.
    pub fn read<F>(&self, role: Role, lookup: F) -> Option<SessionMarker>
    where
        F: Fn(&str) -> Option<Cookie<'static>>,
    {
        let value = self.verified(lookup(cookie_name(role))?)?;
        if role != Role::Vendor {
            let (actor_id, issued) = value.rsplit_once('|')?;
            let created_at = self.fresh(issued)?;
            if actor_id.is_empty() {
                return None;
            }
            return Some(SessionMarker {
                role,
                actor_id: actor_id.to_string(),
                created_at: Some(created_at),
                test_mode: false,
            });
        }

        if value.is_empty() {
            return None;
        }
        let created_at = lookup(SESSION_CREATED)
            .and_then(|c| self.verified(c))
            .and_then(|raw| self.fresh(&raw))?;
        let test_mode = lookup(TEST_MODE)
            .and_then(|c| self.verified(c))
            .is_some_and(|v| v == "true");
        Some(SessionMarker {
            role,
            actor_id: value,
            created_at: Some(created_at),
            test_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(&[7u8; 64], 7, false).expect("keys")
    }

    fn as_request(cookies: Vec<Cookie<'static>>) -> HashMap<String, Cookie<'static>> {
        cookies
            .into_iter()
            .map(|c| (c.name().to_string(), Cookie::new(c.name().to_string(), c.value().to_string())))
            .collect()
    }

    fn vendor_marker(test_mode: bool) -> SessionMarker {
        SessionMarker {
            role: Role::Vendor,
            actor_id: "vendor-1".to_string(),
            created_at: Some(Utc::now()),
            test_mode,
        }
    }

    #[test]
    fn issued_marker_reads_back() {
        let k = keys();
        let jar = as_request(k.issue(&vendor_marker(true)));
        assert!(jar.contains_key(VENDOR_SESSION));
        assert!(jar.contains_key(SESSION_CREATED));

        let read = k.read(Role::Vendor, |n| jar.get(n).cloned()).expect("marker");
        assert_eq!(read.actor_id, "vendor-1");
        assert!(read.test_mode);
        assert!(read.created_at.is_some());
    }

    #[test]
    fn forged_or_foreign_cookie_is_anonymous() {
        let k = keys();
        let forged: HashMap<String, Cookie<'static>> =
            [(VENDOR_SESSION.to_string(), Cookie::new(VENDOR_SESSION, "vendor-1"))].into();
        assert!(k.read(Role::Vendor, |n| forged.get(n).cloned()).is_none());

        let other = SessionKeys::new(&[9u8; 64], 7, false).unwrap();
        let jar = as_request(other.issue(&vendor_marker(false)));
        assert!(k.read(Role::Vendor, |n| jar.get(n).cloned()).is_none());
    }

    #[test]
    fn roles_do_not_share_markers() {
        let k = keys();
        let jar = as_request(k.issue(&vendor_marker(false)));
        assert!(k.read(Role::Admin, |n| jar.get(n).cloned()).is_none());
    }

    #[test]
    fn stale_session_is_rejected() {
        let k = keys();
        let mut old = vendor_marker(false);
        old.created_at = Some(Utc::now() - Duration::days(30));
        let jar = as_request(k.issue(&old));
        assert!(k.read(Role::Vendor, |n| jar.get(n).cloned()).is_none());
    }

    #[test]
    fn clear_removes_all_vendor_cookies() {
        let removed = keys().clear(Role::Vendor);
        let names: Vec<&str> = removed.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec![VENDOR_SESSION, TEST_MODE, SESSION_CREATED]);
        assert!(removed.iter().all(|c| c.value().is_empty()));
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(SessionKeys::new(b"short", 7, false).is_err());
    }

    #[test]
    fn vendor_session_without_issue_time_is_anonymous() {
        let k = keys();
        let mut old = vendor_marker(false);
        old.created_at = Some(Utc::now() - Duration::days(30));
        let mut jar = as_request(k.issue(&old));
        assert!(k.read(Role::Vendor, |n| jar.get(n).cloned()).is_none());

        jar.remove(SESSION_CREATED);
        assert!(k.read(Role::Vendor, |n| jar.get(n).cloned()).is_none());

    }

    #[test]
    fn single_cookie_sessions_carry_their_issue_time() {
        let k = keys();
        for role in [Role::Customer, Role::Admin, Role::Delivery] {
            let marker = SessionMarker {
                role,
                actor_id: "uid-1".to_string(),
                created_at: Some(Utc::now()),
                test_mode: false,
            };
            let jar = as_request(k.issue(&marker));
            assert_eq!(jar.len(), 1);
            let read = k.read(role, |n| jar.get(n).cloned()).expect("marker");
            assert_eq!(read.actor_id, "uid-1");

            let stale = SessionMarker {
                created_at: Some(Utc::now() - Duration::days(8)),
                ..marker
            };
            let jar = as_request(k.issue(&stale));
            assert!(k.read(role, |n| jar.get(n).cloned()).is_none());
        }
    }
}
