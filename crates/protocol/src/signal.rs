//! Signaling-Nachrichten
//!
//! Alle Nachrichten die ueber den Message-Bus des Chat-Servers laufen –
//! Chat-Inhalte sowie die Negotiation-Nachrichten des Peer-Mesh.
//!
//! ## Design
//! - Tagged Enum: das `type`-Feld traegt den Nachrichtentyp (snake_case)
//! - Offer/Answer/Kandidat sind opake Blobs (`serde_json::Value`) – der
//!   Kern interpretiert sie nicht, er reicht sie nur durch
//! - Adressierte Nachrichten tragen `to` und `from` (Nicknames)

use fluester_core::types::PeerId;
use serde::{Deserialize, Serialize};

use crate::huelle::VerschluesselteHuelle;

/// Eine Nachricht auf dem Signaling-Bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalNachricht {
    /// Klartext-Chat (Verschluesselung ausgeschaltet)
    ChatMessage { content: String },

    /// Verschluesselter Chat (Verschluesselung eingeschaltet)
    EncryptedChatMessage {
        encrypted_content: VerschluesselteHuelle,
    },

    /// Beitritt zum Voice-Mesh
    VoiceJoin { nickname: PeerId },

    /// Verlassen des Voice-Mesh
    VoiceLeave { nickname: PeerId },

    /// Verbindungs-Offer an einen bestimmten Peer
    VoiceOffer {
        offer: serde_json::Value,
        to: PeerId,
        from: PeerId,
    },

    /// Verbindungs-Answer an einen bestimmten Peer
    VoiceAnswer {
        answer: serde_json::Value,
        to: PeerId,
        from: PeerId,
    },

    /// Netzwerk-Kandidat; null oder mehr pro Negotiation
    VoiceIceCandidate {
        candidate: serde_json::Value,
        to: PeerId,
        from: PeerId,
    },
}

impl SignalNachricht {
    /// Absender einer adressierten Nachricht (`from`-Feld)
    ///
    /// Join/Leave tragen den Absender im `nickname`-Feld und werden hier
    /// ebenfalls aufgeloest; Chat-Nachrichten haben keinen Absender im Schema.
    pub fn absender(&self) -> Option<&PeerId> {
        match self {
            Self::VoiceOffer { from, .. }
            | Self::VoiceAnswer { from, .. }
            | Self::VoiceIceCandidate { from, .. } => Some(from),
            Self::VoiceJoin { nickname } | Self::VoiceLeave { nickname } => Some(nickname),
            Self::ChatMessage { .. } | Self::EncryptedChatMessage { .. } => None,
        }
    }

    /// Empfaenger einer adressierten Nachricht (`to`-Feld)
    pub fn empfaenger(&self) -> Option<&PeerId> {
        match self {
            Self::VoiceOffer { to, .. }
            | Self::VoiceAnswer { to, .. }
            | Self::VoiceIceCandidate { to, .. } => Some(to),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
