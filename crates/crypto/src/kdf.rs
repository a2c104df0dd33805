//! Schluesselableitung aus Passwort + Salt
//!
//! PBKDF2-HMAC-SHA256 mit fester Iterationszahl. Abgeleitete Schluessel
//! leben nur fuer den einen Verschluesselungs- bzw. Entschluesselungsaufruf
//! (ableiten, verwenden, verwerfen) – ein Cache ueber Nachrichten hinweg
//! waere wirkungslos, da jede Huelle ein eigenes Salt traegt.

use hmac::Hmac;
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};

/// PBKDF2-Iterationen pro Ableitung
pub const KDF_ITERATIONEN: u32 = 10_000;

/// Schluessellaenge in Bytes (256 Bit, passend zum Cipher)
pub const SCHLUESSEL_LAENGE: usize = 32;

/// Sicherer Schluessel-Container (wird beim Drop genullt)
pub struct SchluesselBytes([u8; SCHLUESSEL_LAENGE]);

impl Drop for SchluesselBytes {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SchluesselBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SchluesselBytes([REDACTED] {} bytes)", self.0.len())
    }
}

impl SchluesselBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Leitet einen 256-Bit-Schluessel aus Passwort und Salt ab
///
/// Deterministisch: gleiches Passwort + gleiches Salt ergibt immer
/// denselben Schluessel. Das Salt kommt beim Verschluesseln frisch aus dem
/// CSPRNG und beim Entschluesseln aus der empfangenen Huelle.
pub fn schluessel_ableiten(passwort: &str, salt: &[u8]) -> CryptoResult<SchluesselBytes> {
    let mut ausgabe = [0u8; SCHLUESSEL_LAENGE];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(passwort.as_bytes(), salt, KDF_ITERATIONEN, &mut ausgabe)
        .map_err(|e| CryptoError::SchluesselAbleitung(e.to_string()))?;
    Ok(SchluesselBytes(ausgabe))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
