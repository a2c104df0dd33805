//! ChatService – beide Richtungen der Chat-Pipeline

use fluester_crypto::{
    anzeige_escapen, eingabe_bereinigen, eingabe_pruefen, entschluesseln_async,
    verschluesseln_async,
};
use fluester_protocol::SignalNachricht;

use crate::error::ChatResult;
use crate::types::AngezeigteNachricht;

/// Platzhalter wenn eine verschluesselte Nachricht nicht entschluesselt
/// werden kann (falsches Passwort, manipulierte Daten)
pub const PLATZHALTER_NICHT_ENTSCHLUESSELBAR: &str = "[🔒 Encrypted message - cannot decrypt]";

/// Platzhalter wenn verschluesselte Nachrichten ankommen, lokal aber keine
/// Verschluesselung konfiguriert ist
pub const PLATZHALTER_VERSCHLUESSELUNG_AUS: &str =
    "[🔒 Encrypted message - encryption not enabled]";

/// Verarbeitet Chat-Nachrichten in beide Richtungen
///
/// Haelt nur das Raum-Passwort (falls Verschluesselung aktiv ist). Das
/// Passwort wird pro Nachricht an die Schluesselableitung gereicht und nie
/// in abgeleiteter Form zwischengespeichert.
pub struct ChatService {
    passwort: Option<String>,
}

impl ChatService {
    /// Erstellt einen ChatService ohne Verschluesselung
    pub fn neu() -> Self {
        Self { passwort: None }
    }

    /// Erstellt einen ChatService mit Raum-Passwort (Verschluesselung aktiv)
    pub fn mit_passwort(passwort: impl Into<String>) -> Self {
        Self {
            passwort: Some(passwort.into()),
        }
    }

    /// Ist die Verschluesselung aktiv?
    pub fn verschluesselung_aktiv(&self) -> bool {
        self.passwort.is_some()
    }

    /// Ausgehende Nachricht: pruefen, bereinigen, ggf. verschluesseln
    ///
    /// Die Eingabe-Pruefung laeuft VOR der Verschluesselung – der
    /// Ciphertext deckt den bereits bereinigten Inhalt ab.
    pub async fn ausgehend(&self, inhalt: &str) -> ChatResult<SignalNachricht> {
        let bereinigt = eingabe_bereinigen(inhalt)?;

        match &self.passwort {
            Some(passwort) => {
                let huelle = verschluesseln_async(bereinigt, passwort.clone()).await?;
                Ok(SignalNachricht::EncryptedChatMessage {
                    encrypted_content: huelle,
                })
            }
            None => Ok(SignalNachricht::ChatMessage { content: bereinigt }),
        }
    }

    /// Eingehende Nachricht: entschluesseln und fuer die Anzeige aufbereiten
    ///
    /// Gibt `None` zurueck wenn die Nachricht keine Chat-Nachricht ist.
    /// Entschluesselungs-Fehler werden lokal durch den Platzhalter ersetzt
    /// und beenden nie die Session.
    pub async fn eingehend(&self, nachricht: &SignalNachricht) -> Option<AngezeigteNachricht> {
        match nachricht {
            SignalNachricht::ChatMessage { content } => {
                Some(AngezeigteNachricht::klartext(anzeige_sichern(content)))
            }

            SignalNachricht::EncryptedChatMessage { encrypted_content } => {
                let passwort = match &self.passwort {
                    Some(p) => p.clone(),
                    None => {
                        return Some(AngezeigteNachricht::platzhalter(
                            PLATZHALTER_VERSCHLUESSELUNG_AUS,
                        ));
                    }
                };

                match entschluesseln_async(encrypted_content.clone(), passwort).await {
                    Ok(klartext) => {
                        Some(AngezeigteNachricht::entschluesselt(anzeige_sichern(
                            &klartext,
                        )))
                    }
                    Err(fehler) => {
                        tracing::debug!(%fehler, "Nachricht nicht entschluesselbar, Platzhalter eingesetzt");
                        Some(AngezeigteNachricht::platzhalter(
                            PLATZHALTER_NICHT_ENTSCHLUESSELBAR,
                        ))
                    }
                }
            }

            _ => None,
        }
    }
}

impl Default for ChatService {
    fn default() -> Self {
        Self::neu()
    }
}

/// Macht empfangenen Inhalt anzeigesicher
///
/// Inhalt eines konformen Absenders ist bereits bereinigt und passiert
/// unveraendert; faellt die Pruefung durch, wird der Inhalt escaped statt
/// verworfen.
fn anzeige_sichern(inhalt: &str) -> String {
    match eingabe_pruefen(inhalt) {
        Ok(()) => inhalt.to_string(),
        Err(fehler) => {
            tracing::warn!(%fehler, "Empfangener Inhalt nicht anzeigesicher, wird escaped");
            anzeige_escapen(inhalt)
        }
    }
}
