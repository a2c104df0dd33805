//! Typen der Chat-Pipeline

use serde::{Deserialize, Serialize};

/// Eine fuer die Anzeige aufbereitete, eingehende Chat-Nachricht
///
/// `text` ist immer anzeigefertig: entweder der bereinigte Inhalt oder ein
/// Platzhalter. Roher Ciphertext kommt hier nie an.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AngezeigteNachricht {
    /// Anzeigefertiger Text
    pub text: String,
    /// Kam die Nachricht verschluesselt an?
    pub verschluesselt: bool,
    /// Wurde statt des Inhalts ein Platzhalter eingesetzt?
    pub platzhalter: bool,
}

impl AngezeigteNachricht {
    /// Klartext-Nachricht (unverschluesselt empfangen)
    pub fn klartext(text: String) -> Self {
        Self {
            text,
            verschluesselt: false,
            platzhalter: false,
        }
    }

    /// Erfolgreich entschluesselte Nachricht
    pub fn entschluesselt(text: String) -> Self {
        Self {
            text,
            verschluesselt: true,
            platzhalter: false,
        }
    }

    /// Platzhalter fuer eine nicht entschluesselbare Nachricht
    pub fn platzhalter(text: &'static str) -> Self {
        Self {
            text: text.to_string(),
            verschluesselt: true,
            platzhalter: true,
        }
    }
}
