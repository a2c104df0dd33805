//! Identifikationstypen fuer Fluester
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen. Anders als bei
//! serverseitig vergebenen UUIDs ist die `PeerId` hier der Nickname des
//! Teilnehmers – der Chat-Server garantiert die Eindeutigkeit pro Raum.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimale Nickname-Laenge (Zeichen, nach Trim)
pub const NICKNAME_MIN: usize = 2;
/// Maximale Nickname-Laenge (Zeichen, nach Trim)
pub const NICKNAME_MAX: usize = 20;

/// Fehler bei der Validierung von Identifikatoren
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdFehler {
    #[error("Nickname zu kurz: mindestens 2 Zeichen")]
    ZuKurz,

    #[error("Nickname zu lang: hoechstens 20 Zeichen")]
    ZuLang,

    #[error("Raum-ID darf nicht leer sein")]
    LeererRaum,
}

/// Stabile Kennung eines Mesh-Teilnehmers (sein Nickname im Raum)
///
/// Die abgeleitete lexikografische Ordnung entscheidet bei gleichzeitiger
/// Verbindungs-Initiierung, wessen Offer gilt – beide Seiten kommen ohne
/// zentrale Koordination zum selben Ergebnis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Erstellt eine PeerId ohne Validierung (z.B. aus empfangenen Nachrichten)
    pub fn neu(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Validiert einen lokal eingegebenen Nickname und erstellt eine PeerId
    ///
    /// Der Name wird getrimmt; erlaubt sind 2 bis 20 Zeichen.
    pub fn pruefen(name: &str) -> Result<Self, IdFehler> {
        let getrimmt = name.trim();
        let laenge = getrimmt.chars().count();
        if laenge < NICKNAME_MIN {
            return Err(IdFehler::ZuKurz);
        }
        if laenge > NICKNAME_MAX {
            return Err(IdFehler::ZuLang);
        }
        Ok(Self(getrimmt.to_string()))
    }

    /// Gibt den Nickname als `&str` zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "peer:{}", self.0)
    }
}

/// Eindeutige Raum-ID (vom Chat-Server vergeben)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaumId(String);

impl RaumId {
    /// Erstellt eine RaumId ohne Validierung
    pub fn neu(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Validiert eine Raum-ID (darf nicht leer sein)
    pub fn pruefen(id: &str) -> Result<Self, IdFehler> {
        if id.trim().is_empty() {
            return Err(IdFehler::LeererRaum);
        }
        Ok(Self(id.trim().to_string()))
    }

    /// Gibt die Raum-ID als `&str` zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RaumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "raum:{}", self.0)
    }
}
