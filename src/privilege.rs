//! Identity policy: verify or switch the executing user.
use nix::unistd::{self, Uid, User};
use std::ffi::CString;

use crate::error::{Error, Result};

/// Refuse to continue unless the current effective user matches.
pub fn check_identity(required_user: &str) -> Result<()> {
    let current = current_user_name()?;
    if current == required_user {
        Ok(())
    } else {
        Err(Error::Policy(format!(
            "This script can only be used by the user {required_user}"
        )))
    }
}

/// Switch the effective identity to `target_user`.
///
/// Group list, gid and uid change in that order; after `setuid` the process
/// cannot regain its former privilege. Returns the invoking user's name,
/// recorded later as the `sudo_user` runner variable.
pub fn switch_identity(target_user: &str) -> Result<String> {
    let invoking = current_user_name()?;
    let user = resolve_user(target_user)?;
    let name = CString::new(user.name.clone())
        .map_err(|_| Error::Policy(format!("invalid user name {target_user:?}")))?;

    unistd::initgroups(&name, user.gid)
        .and_then(|()| unistd::setgid(user.gid))
        .and_then(|()| unistd::setuid(user.uid))
        .map_err(|err| Error::Policy(format!("could not become user {target_user:?}: {err}")))?;

    tracing::debug!(user = %user.name, "switched identity");
    Ok(invoking)
}

fn resolve_user(name: &str) -> Result<User> {
    User::from_name(name)
        .map_err(|err| Error::Policy(format!("could not look up user {name:?}: {err}")))?
        .ok_or_else(|| Error::Policy(format!("unknown user {name:?}")))
}

fn current_user_name() -> Result<String> {
    let uid = Uid::effective();
    let user = User::from_uid(uid)
        .map_err(|err| Error::Policy(format!("could not resolve current user: {err}")))?
        .ok_or_else(|| Error::Policy(format!("no passwd entry for uid {uid}")))?;
    Ok(user.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_identity_accepts_the_current_user() {
        let current = current_user_name().expect("current user");
        check_identity(&current).expect("matching identity");
    }

    #[test]
    fn check_identity_rejects_other_users() {
        let err = check_identity("acolyte-nonexistent-user").expect_err("mismatch");
        assert!(
            matches!(err, Error::Policy(message) if message.contains("acolyte-nonexistent-user"))
        );
    }

    #[test]
    fn switch_identity_rejects_unknown_users() {
        let err = switch_identity("acolyte-nonexistent-user").expect_err("unknown user");
        assert!(matches!(err, Error::Policy(_)));
    }
}
