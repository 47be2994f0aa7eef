//! Slug generation with in-transaction uniqueness claims.
//!
//! The availability check and the insert that depends on it run on the
//! same transaction; a collision retries with a randomized suffix a
//! bounded number of times before giving up with Conflict.

use crate::errors::ServiceError;
use futures::future::BoxFuture;
use rand::distributions::Alphanumeric;
use rand::Rng;

const MAX_ATTEMPTS: usize = 3;
const SUFFIX_LEN: usize = 4;

/// Lower-cases, maps non-alphanumerics to single dashes, and trims.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-').to_string();
    if trimmed.is_empty() {
        "item".to_string()
    } else {
        trimmed
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Claims a unique slug for `title` using `exists` to probe the same
/// connection (typically an open transaction) the caller will insert on.
pub async fn claim_unique<C, F>(conn: &C, title: &str, exists: F) -> Result<String, ServiceError>
where
    C: sea_orm::ConnectionTrait,
    F: for<'a> Fn(&'a C, &str) -> BoxFuture<'a, Result<bool, ServiceError>>,
{
    let base = slugify(title);
    let mut candidate = base.clone();
    for _ in 0..MAX_ATTEMPTS {
        if !exists(conn, &candidate).await? {
            return Ok(candidate);
        }
        candidate = format!("{}-{}", base, random_suffix());
    }
    Err(ServiceError::Conflict(format!(
        "Could not allocate a unique slug for \"{}\"",
        title
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basics() {
        assert_eq!(slugify("Linen Shirt"), "linen-shirt");
        assert_eq!(slugify("  Café crème!  "), "caf-cr-me");
        assert_eq!(slugify("A--B"), "a-b");
        assert_eq!(slugify("***"), "item");
    }

    #[test]
    fn suffix_shape() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(suffix.chars().all(|c| !c.is_ascii_uppercase()));
    }
}
