//! Fehlertypen fuer die Chat-Pipeline

use fluester_crypto::{CryptoError, EingabeFehler};
use thiserror::Error;

/// Fehler in der Chat-Pipeline
#[derive(Debug, Error)]
pub enum ChatError {
    /// Eingabe vor der Verschluesselung abgelehnt;
    /// wird dem Benutzer als Validierungsmeldung angezeigt
    #[error("Ungueltige Eingabe: {0}")]
    Eingabe(#[from] EingabeFehler),

    /// Kryptografie-Fehler (nur der Verschluesselungs-Pfad propagiert;
    /// Entschluesselungs-Fehler werden durch den Platzhalter abgefangen)
    #[error(transparent)]
    Krypto(#[from] CryptoError),
}

pub type ChatResult<T> = Result<T, ChatError>;
