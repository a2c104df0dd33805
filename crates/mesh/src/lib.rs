//! # fluester-mesh
//!
//! Peer-Mesh-Verwaltung: baut und haelt direkte Verbindungen zwischen allen
//! Teilnehmer-Paaren eines Raums, ueber den Signaling-Bus des Chat-Servers.
//!
//! ## Module
//! - `manager` - MeshManager: Session-Map, Routing, Capture-Zustand
//! - `session` - PeerSession: Negotiation-State-Machine pro Gegenstelle
//! - `media` - Abstraktionen fuer Medienquelle, native Verbindung, Signal-Ausgang
//! - `config` - Mesh-Konfiguration (ICE-Server, Puffer-Grenzen)
//! - `error` - Fehlertypen
//!
//! ## Nebenlaeufigkeit
//! Ein logischer Akteur pro Raum: alle Manager-Methoden nehmen `&mut self`,
//! die einbettende Event-Schleife serialisiert die Aufrufe. Dadurch laufen
//! nie zwei Zustandsuebergaenge derselben Session gleichzeitig und die
//! Session-Map kommt ohne Locks aus.

pub mod config;
pub mod error;
pub mod manager;
pub mod media;
pub mod session;

// Bequeme Re-Exports
pub use config::MeshKonfiguration;
pub use error::{MeshError, MeshResult};
pub use manager::{MeshEreignis, MeshManager};
pub use media::{
    MedienQuelle, MedienSpur, PeerVerbindung, SignalAusgang, SpurArt, VerbindungsFabrik,
};
pub use session::{PeerSession, SessionZustand};
