//! Verschluesseln und Entschluesseln einzelner Chat-Nachrichten
//!
//! Pro Nachricht: frisches Salt (32 Bytes) und frische IV (16 Bytes) aus dem
//! CSPRNG, Schluesselableitung via PBKDF2, dann AES-256-GCM. Der Auth-Tag
//! haengt am Ciphertext; Manipulation faellt beim Entschluesseln auf.
//!
//! Die blockierenden Varianten laufen synchron; fuer den Event-Pfad gibt es
//! `*_async`-Wrapper die die Arbeit auf den Blocking-Pool verlagern.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use fluester_protocol::huelle::{VerschluesselteHuelle, IV_LAENGE, SALT_LAENGE};

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::schluessel_ableiten;

/// AES-256-GCM mit 128-Bit-Nonce (die IV-Laenge des Wire-Formats)
type HuellenCipher = AesGcm<Aes256, U16>;

/// Verschluesselt eine Nachricht mit einem passwortabgeleiteten Schluessel
///
/// Salt und IV werden pro Aufruf frisch erzeugt – zweimaliges
/// Verschluesseln desselben Klartexts mit demselben Passwort ergibt
/// zwei voellig verschiedene Huellen.
pub fn verschluesseln(klartext: &str, passwort: &str) -> CryptoResult<VerschluesselteHuelle> {
    let mut salt = [0u8; SALT_LAENGE];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LAENGE];
    OsRng.fill_bytes(&mut iv);

    let schluessel = schluessel_ableiten(passwort, &salt)?;

    let cipher = HuellenCipher::new(Key::<HuellenCipher>::from_slice(schluessel.as_bytes()));
    let nonce = Nonce::<U16>::from_slice(&iv);
    let ciphertext = cipher
        .encrypt(nonce, klartext.as_bytes())
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;

    Ok(VerschluesselteHuelle::neu(ciphertext, salt, iv))
}

/// Entschluesselt eine Huelle mit dem angegebenen Passwort
///
/// Der Schluessel wird aus dem Passwort und dem Salt der Huelle neu
/// abgeleitet. Alle Fehlerpfade (falsches Passwort, manipulierter
/// Ciphertext, missgeformtes Salt/IV) liefern denselben
/// [`CryptoError::Entschluesselung`]; die teure Ableitung laeuft in jedem
/// Fall zuerst.
pub fn entschluesseln(huelle: &VerschluesselteHuelle, passwort: &str) -> CryptoResult<String> {
    let schluessel =
        schluessel_ableiten(passwort, huelle.salt()).map_err(|_| CryptoError::Entschluesselung)?;

    if huelle.iv().len() != IV_LAENGE {
        return Err(CryptoError::Entschluesselung);
    }

    let cipher = HuellenCipher::new(Key::<HuellenCipher>::from_slice(schluessel.as_bytes()));
    let nonce = Nonce::<U16>::from_slice(huelle.iv());
    let klartext = cipher
        .decrypt(nonce, huelle.ciphertext())
        .map_err(|_| CryptoError::Entschluesselung)?;

    String::from_utf8(klartext).map_err(|_| CryptoError::Entschluesselung)
}

/// Async-Variante von [`verschluesseln`] auf dem Blocking-Pool
///
/// Die Schluesselableitung ist absichtlich teuer und darf die Zustellung
/// anderer Nachrichten nicht aufhalten.
pub async fn verschluesseln_async(
    klartext: String,
    passwort: String,
) -> CryptoResult<VerschluesselteHuelle> {
    tokio::task::spawn_blocking(move || verschluesseln(&klartext, &passwort))
        .await
        .map_err(|e| CryptoError::Verschluesselung(format!("Worker abgebrochen: {e}")))?
}

/// Async-Variante von [`entschluesseln`] auf dem Blocking-Pool
pub async fn entschluesseln_async(
    huelle: VerschluesselteHuelle,
    passwort: String,
) -> CryptoResult<String> {
    tokio::task::spawn_blocking(move || entschluesseln(&huelle, &passwort))
        .await
        .map_err(|_| CryptoError::Entschluesselung)?
}

/// Erzeugt einen zufaelligen Raum-Schluessel (Gruppen-Modus)
///
/// Unabhaengig von jedem Passwort; die Verteilung an die Teilnehmer
/// geschieht ausserhalb des Protokolls.
pub fn raum_schluessel_erzeugen() -> [u8; 32] {
    let mut schluessel = [0u8; 32];
    OsRng.fill_bytes(&mut schluessel);
    schluessel
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
