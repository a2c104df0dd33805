//! Mesh-Konfiguration
//!
//! Wird von der einbettenden Anwendung geladen (TOML) oder mit
//! Standardwerten erzeugt. Alle Felder haben sinnvolle Defaults, sodass das
//! Mesh ohne Konfigurationsdatei lauffaehig ist.

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};

/// Konfiguration des Peer-Mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshKonfiguration {
    /// STUN/TURN-Server fuer die Kandidaten-Ermittlung
    pub ice_server: Vec<String>,
    /// Obergrenze des Kandidaten-Puffers pro Session
    pub kandidaten_puffer_limit: usize,
    /// Groesse des Broadcast-Kanals fuer Mesh-Ereignisse
    pub ereignis_kanal_groesse: usize,
}

impl Default for MeshKonfiguration {
    fn default() -> Self {
        Self {
            ice_server: vec![
                "stun:stun.l.google.com:19302".into(),
                "stun:stun1.l.google.com:19302".into(),
            ],
            kandidaten_puffer_limit: 64,
            ereignis_kanal_groesse: 256,
        }
    }
}

impl MeshKonfiguration {
    /// Laedt die Konfiguration aus einem TOML-String
    pub fn aus_toml_str(inhalt: &str) -> MeshResult<Self> {
        toml::from_str(inhalt).map_err(|e| MeshError::Konfiguration(e.to_string()))
    }

    /// Laedt die Konfiguration aus einer TOML-Datei
    pub fn aus_datei(pfad: impl AsRef<std::path::Path>) -> MeshResult<Self> {
        let inhalt = std::fs::read_to_string(pfad)?;
        Self::aus_toml_str(&inhalt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
