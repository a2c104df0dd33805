//! # fluester-crypto
//!
//! Passwortbasierte Ende-zu-Ende-Verschluesselung fuer Chat-Nachrichten.
//!
//! ## Module
//! - `engine` - Verschluesseln/Entschluesseln einzelner Nachrichten
//! - `kdf` - Schluesselableitung aus Passwort + Salt (PBKDF2)
//! - `passwort` - Passwort-Hashing fuer die lokale Ablage
//! - `eingabe` - Eingabe-Pruefung und HTML-Escaping vor Verschluesselung/Anzeige
//! - `error` - Fehlertypen
//!
//! Pro Nachricht wird aus frischem Salt ein frischer Schluessel abgeleitet.
//! Die Kompromittierung eines Nachrichten-Schluessels hilft damit gegen
//! keine andere Nachricht; dafuer kostet jede Nachricht eine vollstaendige
//! Schluesselableitung. Abgeleitete Schluessel werden nie zwischengespeichert.

pub mod eingabe;
pub mod engine;
pub mod error;
pub mod kdf;
pub mod passwort;

// Bequeme Re-Exports
pub use eingabe::{
    anzeige_escapen, eingabe_bereinigen, eingabe_pruefen, EingabeFehler, MAX_EINGABE_LAENGE,
};
pub use engine::{
    entschluesseln, entschluesseln_async, raum_schluessel_erzeugen, verschluesseln,
    verschluesseln_async,
};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{schluessel_ableiten, SchluesselBytes, KDF_ITERATIONEN, SCHLUESSEL_LAENGE};
pub use passwort::{passwort_hashen, passwort_verifizieren};
