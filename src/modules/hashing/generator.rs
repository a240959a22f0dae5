use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::Mac;
use itertools::Itertools;

use crate::modules::store::ModelError;
use crate::{HmacSha256, HASH_LENGTH};

/// Produces opaque record identifiers from a type tag, a secret and field values
pub struct HashGenerator;

impl HashGenerator {
    /// Digest `values` for entity type `type_tag` under `secret`.
    ///
    /// Output is HMAC-SHA256 keyed by the secret, base64url encoded without
    /// padding, always `HASH_LENGTH` characters. Each input is length-prefixed
    /// so no two distinct value lists share a canonical form.
    pub fn generate(type_tag: &str, secret: &str, values: &[String]) -> Result<String, ModelError> {
        if secret.is_empty() {
            return Err(ModelError::Configuration(format!(
                "AUTOHASH_SECRET must be defined for {}; refusing to operate without a secret",
                type_tag
            )));
        }

        let canonical = std::iter::once(type_tag)
            .chain(values.iter().map(String::as_str))
            .map(|part| format!("{}:{}", part.len(), part))
            .join("|");

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| ModelError::Configuration(format!("Unusable hash secret: {}", e)))?;
        mac.update(canonical.as_bytes());
        let digest = mac.finalize().into_bytes();

        let token = URL_SAFE_NO_PAD.encode(digest);
        debug_assert_eq!(token.len(), HASH_LENGTH);
        Ok(token)
    }
}
