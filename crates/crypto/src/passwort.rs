//! Passwort-Hashing fuer die lokale Ablage
//!
//! Hasht Raum-Passwoerter mit Argon2id bevor sie lokal gespeichert werden.
//! Ablageformat: `salt:hash` (beide Base64). Dieses Format ist NICHT der
//! Nachrichten-Schluessel – fuer Nachrichten leitet `kdf` pro Huelle einen
//! frischen Schluessel ab.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};

/// Salt-Laenge fuer die Ablage (Bytes)
const ABLAGE_SALT_LAENGE: usize = 16;
/// Hash-Laenge (Bytes)
const ABLAGE_HASH_LAENGE: usize = 32;

/// Argon2id-Parameter gemaess OWASP-Empfehlungen:
/// 64 MiB Speicher, 3 Iterationen, 1 Thread
fn argon2_instanz() -> Argon2<'static> {
    let params = Params::new(64 * 1024, 3, 1, Some(ABLAGE_HASH_LAENGE))
        .expect("Argon2-Parameter ungueltig");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hasht ein Passwort mit frischem Salt
///
/// Gibt `base64(salt):base64(hash)` zurueck.
pub fn passwort_hashen(passwort: &str) -> CryptoResult<String> {
    let mut salt = [0u8; ABLAGE_SALT_LAENGE];
    OsRng.fill_bytes(&mut salt);

    let mut hash = [0u8; ABLAGE_HASH_LAENGE];
    argon2_instanz()
        .hash_password_into(passwort.as_bytes(), &salt, &mut hash)
        .map_err(|e| CryptoError::PasswortHashing(e.to_string()))?;

    Ok(format!("{}:{}", STANDARD.encode(salt), STANDARD.encode(hash)))
}

/// Verifiziert ein Passwort gegen einen `salt:hash`-Eintrag
///
/// Gibt `true` zurueck wenn das Passwort korrekt ist. Der Vergleich laeuft
/// in fester Zeit ueber die volle Hash-Laenge.
pub fn passwort_verifizieren(passwort: &str, gespeichert: &str) -> CryptoResult<bool> {
    let (salt_b64, hash_b64) = gespeichert
        .split_once(':')
        .ok_or_else(|| CryptoError::PasswortHashing("Ungueltiges Ablageformat".into()))?;

    let salt = STANDARD
        .decode(salt_b64)
        .map_err(|e| CryptoError::PasswortHashing(e.to_string()))?;
    let erwartet = STANDARD
        .decode(hash_b64)
        .map_err(|e| CryptoError::PasswortHashing(e.to_string()))?;

    if erwartet.len() != ABLAGE_HASH_LAENGE {
        return Err(CryptoError::PasswortHashing(
            "Ungueltiges Ablageformat".into(),
        ));
    }

    let mut hash = [0u8; ABLAGE_HASH_LAENGE];
    argon2_instanz()
        .hash_password_into(passwort.as_bytes(), &salt, &mut hash)
        .map_err(|e| CryptoError::PasswortHashing(e.to_string()))?;

    let mut differenz = 0u8;
    for (a, b) in hash.iter().zip(erwartet.iter()) {
        differenz |= a ^ b;
    }
    Ok(differenz == 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashen_und_verifizieren() {
        let eintrag = passwort_hashen("sicheres_passwort_123!").unwrap();
        assert!(eintrag.contains(':'));
        assert!(passwort_verifizieren("sicheres_passwort_123!", &eintrag).unwrap());
    }

    #[test]
    fn falsches_passwort_wird_abgelehnt() {
        let eintrag = passwort_hashen("richtig").unwrap();
        assert!(!passwort_verifizieren("falsch", &eintrag).unwrap());
    }

    #[test]
    fn gleiche_passwoerter_unterschiedliche_eintraege() {
        let a = passwort_hashen("gleich").unwrap();
        let b = passwort_hashen("gleich").unwrap();
        assert_ne!(a, b, "Frisches Salt muss verschiedene Eintraege erzeugen");
    }

    #[test]
    fn ungueltiges_ablageformat_gibt_fehler() {
        assert!(passwort_verifizieren("pw", "kein_doppelpunkt").is_err());
        assert!(passwort_verifizieren("pw", "!!!:???").is_err());
        // Gueltiges Base64, aber falsche Hash-Laenge
        assert!(passwort_verifizieren("pw", "AAAA:AAAA").is_err());
    }
}
