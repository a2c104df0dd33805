//! Fehlertypen fuer die Mesh-Verwaltung
//!
//! Kein Fehler hier ist global fatal: Krypto- und Eingabe-Fehler sind pro
//! Nachricht behebbar, Mesh-Fehler pro Peer – eine kaputte Peer-Session
//! reisst nie den ganzen Raum ab.

use fluester_core::types::PeerId;
use thiserror::Error;

/// Fehler in der Mesh-Verwaltung
#[derive(Debug, Error)]
pub enum MeshError {
    /// Nachricht fuer unbekannten oder bereits geschlossenen Peer;
    /// wird geloggt und verworfen, nie propagiert
    #[error("Signal fuer unbekannten Peer {peer}: {grund}")]
    SignalRouting { peer: PeerId, grund: String },

    /// Medienzugriff verweigert oder Geraet nicht verfuegbar;
    /// die Session laeuft wo moeglich ohne Audio/Video weiter
    #[error("Medienzugriff fehlgeschlagen: {0}")]
    MedienZugriff(String),

    /// Fehler der nativen Verbindung (Offer/Answer/Kandidat)
    #[error("Verbindungs-Fehler: {0}")]
    Verbindung(String),

    /// Senden auf dem Signaling-Bus fehlgeschlagen
    #[error("Signal-Senden fehlgeschlagen: {0}")]
    SignalSenden(String),

    /// Operation im falschen Session-Zustand
    #[error("Ungueltiger Zustand: {0}")]
    UngueltigerZustand(String),

    /// Konfigurationsfehler
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    /// IO-Fehler (Konfigurationsdatei)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Unerwarteter Fehler aus einer Trait-Implementierung
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl MeshError {
    /// Erstellt einen Routing-Fehler
    pub fn routing(peer: &PeerId, grund: impl Into<String>) -> Self {
        Self::SignalRouting {
            peer: peer.clone(),
            grund: grund.into(),
        }
    }
}

pub type MeshResult<T> = Result<T, MeshError>;
