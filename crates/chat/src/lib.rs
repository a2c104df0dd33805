//! fluester-chat – Chat-Pipeline
//!
//! Dieses Crate implementiert beide Richtungen des Chat-Datenflusses:
//! - Ausgehend: Klartext -> Eingabe-Pruefung -> Verschluesselung -> Signal-Nachricht
//! - Eingehend: Signal-Nachricht -> Entschluesselung -> Anzeige-Text
//!
//! Schlaegt die Entschluesselung fehl (falsches Passwort, manipulierte
//! Daten) wird die Nachricht lokal durch einen Platzhalter ersetzt – die
//! Session laeuft weiter, und roher Ciphertext erreicht nie die Anzeige.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{ChatError, ChatResult};
pub use service::{
    ChatService, PLATZHALTER_NICHT_ENTSCHLUESSELBAR, PLATZHALTER_VERSCHLUESSELUNG_AUS,
};
pub use types::AngezeigteNachricht;
