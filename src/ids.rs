use crate::error::{PlanError, Result};

const USER_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated application-level user identifiers.
pub const USER_ID_LEN: usize = 8;

/// Fresh storage identifier for a document or sub-document.
pub fn document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Random alphanumeric user identifier handed out at bot registration.
pub fn user_id() -> Result<String> {
    user_id_with(|bytes| getrandom::fill(bytes).map_err(|e| PlanError::Random(e.to_string())))
}

/// Test hook: inject deterministic random bytes.
pub(crate) fn user_id_with<F>(mut fill_random: F) -> Result<String>
where
    F: FnMut(&mut [u8]) -> Result<()>,
{
    let mut bytes = [0_u8; USER_ID_LEN];
    fill_random(&mut bytes)?;
    Ok(bytes
        .iter()
        .map(|b| USER_ID_ALPHABET[*b as usize % USER_ID_ALPHABET.len()] as char)
        .collect())
}
