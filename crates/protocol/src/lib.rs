//! # fluester-protocol
//!
//! Nachrichtenschema fuer den Signaling-Bus des Chat-Servers.
//!
//! Der Signaling-Transport selbst (WebSocket zum Chat-Server) ist nicht Teil
//! dieses Crates – hier ist nur definiert, WAS ueber den Bus laeuft:
//! - `signal` - alle Signaling-Nachrichten (Chat, Join/Leave, Negotiation)
//! - `huelle` - das Wire-Format verschluesselter Nachrichten
//!
//! Der Bus liefert Nachrichten pro Absender geordnet und hoechstens einmal
//! aus; Verlust und Duplikate zwischen Absendern sind moeglich und werden
//! von den Konsumenten (fluester-mesh, fluester-chat) toleriert.

pub mod huelle;
pub mod signal;

// Bequeme Re-Exports
pub use huelle::VerschluesselteHuelle;
pub use signal::SignalNachricht;
