//! Household profile mapping for Discord users.
//!
//! Each household keeps its ledgers under its own profile. Discord users are
//! mapped to a profile through `HOUSEHOLD_USER_ID_n` / `HOUSEHOLD_PROFILE_n`
//! pairs in the environment (n = 1..=`MAX_MAPPINGS`). Unmapped users fall back
//! to the configured default profile.

use std::collections::HashMap;

const MAX_MAPPINGS: usize = 8;

/// Gets a mapping of Discord user IDs to household profile names.
///
/// Only pairs where both variables are set are included.
#[must_use]
pub fn get_user_profiles() -> HashMap<String, String> {
    let mut profiles = HashMap::new();

    for n in 1..=MAX_MAPPINGS {
        if let (Ok(user_id), Ok(profile)) = (
            std::env::var(format!("HOUSEHOLD_USER_ID_{n}")),
            std::env::var(format!("HOUSEHOLD_PROFILE_{n}")),
        ) {
            let profile = profile.trim();
            if !profile.is_empty() {
                profiles.insert(user_id.trim().to_string(), profile.to_string());
            }
        }
    }

    profiles
}

/// Gets the profile configured for a Discord user, if any.
#[must_use]
pub fn get_profile(user_id: &str) -> Option<String> {
    get_user_profiles().remove(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_profile_returns_none_for_unknown_user() {
        assert!(get_profile("no_such_discord_user").is_none());
    }
}
