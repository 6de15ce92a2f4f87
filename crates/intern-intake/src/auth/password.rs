use super::AuthError;

/// bcrypt work factor for stored staff passwords.
pub const PASSWORD_COST: u32 = 10;

pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(plain, PASSWORD_COST)?)
}

/// Compare `plain` against a stored hash. A malformed hash counts as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}
