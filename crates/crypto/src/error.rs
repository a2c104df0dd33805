//! Fehlertypen fuer das Kryptografie-Subsystem

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Fehler der zugrundeliegenden Primitive beim Verschluesseln.
    /// Fatal fuer den einzelnen Sendeversuch, nie fuer die Session.
    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    /// Entschluesselung fehlgeschlagen. Traegt absichtlich kein Detail:
    /// falsches Passwort, manipulierter Ciphertext und missgeformtes
    /// Salt/IV liefern alle denselben Wert.
    #[error("Entschluesselung fehlgeschlagen: falsches Passwort oder beschaedigte Daten")]
    Entschluesselung,

    /// Schluesselableitung fehlgeschlagen
    #[error("Schluesselableitung fehlgeschlagen: {0}")]
    SchluesselAbleitung(String),

    /// Passwort-Hashing fehlgeschlagen (lokale Ablage)
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entschluesselung_ohne_detail() {
        // Der Fehlertext darf nicht verraten welcher Teilschritt scheiterte
        let e = CryptoError::Entschluesselung;
        assert!(!e.to_string().contains("Tag"));
        assert!(!e.to_string().contains("Salt"));
    }
}
