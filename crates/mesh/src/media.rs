//! Abstraktionen fuer Medien und native Verbindungen
//!
//! Der Mesh-Kern spricht nie direkt mit Browser- oder Plattform-APIs.
//! Die einbettende Anwendung liefert Implementierungen dieser Traits;
//! Tests verwenden Attrappen. Es gibt keine impliziten Callbacks – alle
//! Benachrichtigungen laufen ueber die expliziten Methoden des Managers.

use std::sync::Arc;

use async_trait::async_trait;
use fluester_protocol::SignalNachricht;
use uuid::Uuid;

use crate::error::MeshResult;

/// Art einer Medien-Spur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpurArt {
    Audio,
    Video,
}

impl std::fmt::Display for SpurArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpurArt::Audio => write!(f, "audio"),
            SpurArt::Video => write!(f, "video"),
        }
    }
}

/// Referenz auf eine lokale Medien-Spur
///
/// Die Spur selbst lebt in der nativen Schicht; hier zirkuliert nur die
/// Referenz. Nur der Manager startet und stoppt die Erfassung, Sessions
/// haengen Spuren lediglich an ihre Verbindung an oder ab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedienSpur {
    /// Art der Spur
    pub art: SpurArt,
    /// Eindeutige Spur-Kennung
    pub kennung: String,
    /// Ist die Spur gerade aktiv? (Mute schaltet Audio-Spuren inaktiv,
    /// ohne das Geraet freizugeben)
    pub aktiviert: bool,
}

impl MedienSpur {
    /// Erstellt eine neue, aktive Spur-Referenz
    pub fn neu(art: SpurArt) -> Self {
        Self {
            art,
            kennung: Uuid::new_v4().to_string(),
            aktiviert: true,
        }
    }
}

/// Lokale Medienquelle (Mikrofon, Kamera)
///
/// `erfassen` kann lange dauern – dahinter steht typischerweise ein
/// Berechtigungs-Dialog. Der Aufruf wird awaited ohne die Negotiation
/// anderer Sessions zu blockieren; sein Scheitern beendet keine bereits
/// verbundene Session.
#[async_trait]
pub trait MedienQuelle: Send + Sync {
    /// Startet die Erfassung einer Spur-Art
    async fn erfassen(&self, art: SpurArt) -> MeshResult<MedienSpur>;

    /// Stoppt die Erfassung einer Spur-Art und gibt die Hardware frei
    fn stoppen(&self, art: SpurArt);
}

/// Native Verbindung zu genau einer Gegenstelle
///
/// Offer/Answer/Kandidat sind opake Blobs – der Kern reicht sie nur
/// zwischen nativer Schicht und Signaling-Bus durch. `offer_erstellen` und
/// `answer_erstellen` setzen die lokale Beschreibung gleich mit.
#[async_trait]
pub trait PeerVerbindung: Send + Sync {
    /// Baut ein Offer und setzt es als lokale Beschreibung
    async fn offer_erstellen(&self) -> MeshResult<serde_json::Value>;

    /// Baut ein Answer und setzt es als lokale Beschreibung
    async fn answer_erstellen(&self) -> MeshResult<serde_json::Value>;

    /// Wendet die entfernte Beschreibung (Offer oder Answer) an
    async fn entfernte_beschreibung_setzen(
        &self,
        beschreibung: serde_json::Value,
    ) -> MeshResult<()>;

    /// Wendet einen entfernten Netzwerk-Kandidaten an
    async fn kandidat_anwenden(&self, kandidat: serde_json::Value) -> MeshResult<()>;

    /// Haengt eine lokale Spur an die Verbindung an
    fn spur_anhaengen(&self, spur: &MedienSpur);

    /// Ersetzt die Spur gleicher Art, oder haengt sie neu an falls keine da ist
    fn spur_ersetzen(&self, spur: &MedienSpur);

    /// Entfernt die Spur der angegebenen Art von der Verbindung
    fn spur_entfernen(&self, art: SpurArt);

    /// Schliesst die Verbindung und gibt alle nativen Ressourcen frei
    fn schliessen(&self);
}

/// Fabrik fuer native Verbindungen
pub trait VerbindungsFabrik: Send + Sync {
    /// Erstellt eine neue Verbindung mit den angegebenen ICE-Servern
    fn erstellen(&self, ice_server: &[String]) -> Arc<dyn PeerVerbindung>;
}

/// Ausgang zum Signaling-Bus des Chat-Servers
///
/// Der Bus ist best-effort: pro Absender geordnet, hoechstens einmal
/// zugestellt. Senden ist nicht-blockierend.
pub trait SignalAusgang: Send + Sync {
    fn senden(&self, nachricht: SignalNachricht) -> MeshResult<()>;
}
