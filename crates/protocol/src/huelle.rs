//! Wire-Format verschluesselter Chat-Nachrichten
//!
//! Eine `VerschluesselteHuelle` ist der selbsttragende Datensatz einer
//! einzelnen verschluesselten Nachricht: Ciphertext (inkl. Auth-Tag), das
//! Salt der Schluesselableitung, die IV des Ciphers und ein Zeitstempel.
//!
//! ## Wire-Format (JSON)
//! ```text
//! { "encrypted": base64, "salt": base64, "iv": base64, "timestamp": epoch-ms }
//! ```
//!
//! Salt und IV sind pro Huelle frisch und zufaellig – sie werden nie
//! wiederverwendet, auch nicht beim selben Passwort. Eine einmal gebaute
//! Huelle ist unveraenderlich (keine oeffentlichen Felder).

use serde::{Deserialize, Serialize};

/// Salt-Laenge in Bytes (256 Bit)
pub const SALT_LAENGE: usize = 32;
/// IV-Laenge in Bytes (128 Bit)
pub const IV_LAENGE: usize = 16;

/// Selbsttragender Datensatz einer verschluesselten Nachricht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerschluesselteHuelle {
    /// Ciphertext inkl. angehaengtem Auth-Tag
    #[serde(with = "base64_bytes")]
    encrypted: Vec<u8>,
    /// Salt der Schluesselableitung
    #[serde(with = "base64_bytes")]
    salt: Vec<u8>,
    /// IV des Ciphers
    #[serde(with = "base64_bytes")]
    iv: Vec<u8>,
    /// Erstellungszeitpunkt (Epoch-Millisekunden)
    timestamp: i64,
}

impl VerschluesselteHuelle {
    /// Baut eine Huelle aus frisch erzeugten Bestandteilen
    ///
    /// Die festen Laengen der Parameter garantieren dass lokal gebaute
    /// Huellen immer wohlgeformt sind; nur empfangene Huellen koennen
    /// abweichende Laengen tragen.
    pub fn neu(ciphertext: Vec<u8>, salt: [u8; SALT_LAENGE], iv: [u8; IV_LAENGE]) -> Self {
        Self {
            encrypted: ciphertext,
            salt: salt.to_vec(),
            iv: iv.to_vec(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Ciphertext inkl. Auth-Tag
    pub fn ciphertext(&self) -> &[u8] {
        &self.encrypted
    }

    /// Salt der Schluesselableitung (Laenge nur bei lokal gebauten Huellen garantiert)
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// IV des Ciphers (Laenge nur bei lokal gebauten Huellen garantiert)
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Erstellungszeitpunkt in Epoch-Millisekunden
    pub fn erstellt_um(&self) -> i64 {
        self.timestamp
    }
}

/// Serde-Helfer: Bytes als Base64-String (Standard-Alphabet, mit Padding)
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let kodiert = String::deserialize(deserializer)?;
        STANDARD
            .decode(kodiert.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
