//! PeerSession – Negotiation-State-Machine pro Gegenstelle
//!
//! Zustaende und Uebergaenge:
//! ```text
//! Leerlauf --(lokale Initiative)-------> OfferAusstehend
//! Leerlauf --(entferntes Offer)--------> AnswerAusstehend --> Verbunden
//! OfferAusstehend --(entferntes Answer)-> Verbunden
//! beliebig --(Leave / lokaler Stopp)----> Geschlossen
//! ```
//!
//! Kandidaten die vor der zugehoerigen Beschreibung eintreffen, landen in
//! einem FIFO-Puffer und werden unmittelbar nach dem Anwenden der
//! Beschreibung in Empfangsreihenfolge nachgezogen – die uebliche
//! Signaling-Wettlaufsituation, in der Kandidaten das Offer ueberholen.

use std::collections::VecDeque;
use std::sync::Arc;

use fluester_core::types::PeerId;
use fluester_protocol::SignalNachricht;

use crate::error::{MeshError, MeshResult};
use crate::media::{MedienSpur, PeerVerbindung, SignalAusgang, SpurArt, VerbindungsFabrik};

/// Zustand einer Peer-Session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionZustand {
    /// Erstellt, noch keine Negotiation
    Leerlauf,
    /// Eigenes Offer gesendet, Answer steht aus
    OfferAusstehend,
    /// Entferntes Offer angenommen, eigenes Answer in Arbeit
    AnswerAusstehend,
    /// Negotiation abgeschlossen
    Verbunden,
    /// Beendet; alle Ressourcen freigegeben
    Geschlossen,
}

impl std::fmt::Display for SessionZustand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionZustand::Leerlauf => "leerlauf",
            SessionZustand::OfferAusstehend => "offer_ausstehend",
            SessionZustand::AnswerAusstehend => "answer_ausstehend",
            SessionZustand::Verbunden => "verbunden",
            SessionZustand::Geschlossen => "geschlossen",
        };
        write!(f, "{name}")
    }
}

/// Negotiation-Session zu genau einer Gegenstelle
///
/// Gehoert dem MeshManager und wird nur durch dessen Operationen mutiert;
/// pro PeerId existiert zu jedem Zeitpunkt hoechstens eine Session.
pub struct PeerSession {
    peer_id: PeerId,
    zustand: SessionZustand,
    verbindung: Arc<dyn PeerVerbindung>,
    /// FIFO-Puffer fuer Kandidaten ohne angewendete Beschreibung
    kandidaten_puffer: VecDeque<serde_json::Value>,
    puffer_limit: usize,
    /// Wurde die entfernte Beschreibung bereits angewendet?
    beschreibung_angewendet: bool,
    lokale_spuren: Vec<MedienSpur>,
    entfernte_spuren: Vec<MedienSpur>,
}

impl PeerSession {
    /// Erstellt eine Session im Leerlauf
    pub fn neu(peer_id: PeerId, verbindung: Arc<dyn PeerVerbindung>, puffer_limit: usize) -> Self {
        Self {
            peer_id,
            zustand: SessionZustand::Leerlauf,
            verbindung,
            kandidaten_puffer: VecDeque::new(),
            puffer_limit,
            beschreibung_angewendet: false,
            lokale_spuren: Vec::new(),
            entfernte_spuren: Vec::new(),
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn zustand(&self) -> SessionZustand {
        self.zustand
    }

    pub fn ist_verbunden(&self) -> bool {
        self.zustand == SessionZustand::Verbunden
    }

    /// Anzahl aktuell gepufferter Kandidaten
    pub fn gepufferte_kandidaten(&self) -> usize {
        self.kandidaten_puffer.len()
    }

    pub fn lokale_spuren(&self) -> &[MedienSpur] {
        &self.lokale_spuren
    }

    pub fn entfernte_spuren(&self) -> &[MedienSpur] {
        &self.entfernte_spuren
    }

    /// Startet die Negotiation lokal: Spuren anhaengen, Offer bauen, senden
    ///
    /// Die Spuren werden VOR dem Offer angehaengt, damit das Offer den
    /// aktuellen Mute-/Video-Stand widerspiegelt.
    pub async fn offer_initiieren(
        &mut self,
        spuren: &[MedienSpur],
        ausgang: &dyn SignalAusgang,
        lokal: &PeerId,
    ) -> MeshResult<()> {
        if self.zustand != SessionZustand::Leerlauf {
            return Err(MeshError::UngueltigerZustand(format!(
                "Offer-Initiative im Zustand {}",
                self.zustand
            )));
        }

        self.spuren_anhaengen(spuren);

        let offer = self.verbindung.offer_erstellen().await?;
        ausgang.senden(SignalNachricht::VoiceOffer {
            offer,
            to: self.peer_id.clone(),
            from: lokal.clone(),
        })?;

        self.zustand_wechseln(SessionZustand::OfferAusstehend);
        Ok(())
    }

    /// Verarbeitet ein entferntes Offer: annehmen, Answer bauen, senden
    pub async fn offer_verarbeiten(
        &mut self,
        offer: serde_json::Value,
        spuren: &[MedienSpur],
        ausgang: &dyn SignalAusgang,
        lokal: &PeerId,
    ) -> MeshResult<()> {
        if self.zustand != SessionZustand::Leerlauf {
            return Err(MeshError::UngueltigerZustand(format!(
                "Entferntes Offer im Zustand {}",
                self.zustand
            )));
        }

        self.spuren_anhaengen(spuren);

        self.verbindung.entfernte_beschreibung_setzen(offer).await?;
        self.beschreibung_angewendet = true;
        self.zustand_wechseln(SessionZustand::AnswerAusstehend);
        self.kandidaten_nachziehen().await;

        let answer = self.verbindung.answer_erstellen().await?;
        ausgang.senden(SignalNachricht::VoiceAnswer {
            answer,
            to: self.peer_id.clone(),
            from: lokal.clone(),
        })?;

        self.zustand_wechseln(SessionZustand::Verbunden);
        Ok(())
    }

    /// Verarbeitet ein entferntes Answer auf das eigene Offer
    pub async fn answer_verarbeiten(&mut self, answer: serde_json::Value) -> MeshResult<()> {
        if self.zustand != SessionZustand::OfferAusstehend {
            return Err(MeshError::UngueltigerZustand(format!(
                "Answer im Zustand {}",
                self.zustand
            )));
        }

        self.verbindung
            .entfernte_beschreibung_setzen(answer)
            .await?;
        self.beschreibung_angewendet = true;
        self.kandidaten_nachziehen().await;

        self.zustand_wechseln(SessionZustand::Verbunden);
        Ok(())
    }

    /// Verarbeitet einen entfernten Kandidaten
    ///
    /// Ohne angewendete Beschreibung wird gepuffert; danach direkt
    /// angewendet. Ein nicht anwendbarer Kandidat ist nie fatal.
    pub async fn kandidat_verarbeiten(&mut self, kandidat: serde_json::Value) {
        if self.beschreibung_angewendet {
            if let Err(fehler) = self.verbindung.kandidat_anwenden(kandidat).await {
                tracing::warn!(peer = %self.peer_id, %fehler, "Kandidat nicht anwendbar");
            }
            return;
        }

        if self.kandidaten_puffer.len() >= self.puffer_limit {
            tracing::warn!(
                peer = %self.peer_id,
                limit = self.puffer_limit,
                "Kandidaten-Puffer voll, Kandidat verworfen"
            );
            return;
        }
        self.kandidaten_puffer.push_back(kandidat);
    }

    /// Verwirft das eigene ausstehende Offer und setzt die Session zurueck
    ///
    /// Schliesst die alte native Verbindung und erstellt eine frische.
    /// Bereits gepufferte Kandidaten der Gegenstelle bleiben erhalten – sie
    /// gehoeren zum entfernten Offer, das gleich beantwortet wird.
    pub fn offer_verwerfen(&mut self, fabrik: &dyn VerbindungsFabrik, ice_server: &[String]) {
        self.verbindung.schliessen();
        self.verbindung = fabrik.erstellen(ice_server);
        self.beschreibung_angewendet = false;
        self.lokale_spuren.clear();
        self.zustand_wechseln(SessionZustand::Leerlauf);
    }

    /// Ersetzt die lokale Spur gleicher Art (oder haengt sie neu an)
    pub fn spur_aktualisieren(&mut self, spur: &MedienSpur) {
        self.verbindung.spur_ersetzen(spur);
        match self.lokale_spuren.iter_mut().find(|s| s.art == spur.art) {
            Some(vorhanden) => *vorhanden = spur.clone(),
            None => self.lokale_spuren.push(spur.clone()),
        }
    }

    /// Entfernt die lokale Spur der angegebenen Art
    pub fn spur_entfernen(&mut self, art: SpurArt) {
        self.verbindung.spur_entfernen(art);
        self.lokale_spuren.retain(|s| s.art != art);
    }

    /// Vermerkt eine von der Gegenstelle empfangene Spur
    pub fn entfernte_spur_empfangen(&mut self, spur: MedienSpur) {
        match self.entfernte_spuren.iter_mut().find(|s| s.art == spur.art) {
            Some(vorhanden) => *vorhanden = spur,
            None => self.entfernte_spuren.push(spur),
        }
    }

    /// Beendet die Session und gibt alle Ressourcen frei (idempotent)
    pub fn schliessen(&mut self) {
        if self.zustand == SessionZustand::Geschlossen {
            return;
        }
        self.verbindung.schliessen();
        self.kandidaten_puffer.clear();
        self.lokale_spuren.clear();
        self.entfernte_spuren.clear();
        self.zustand_wechseln(SessionZustand::Geschlossen);
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsmethoden
    // -----------------------------------------------------------------------

    fn spuren_anhaengen(&mut self, spuren: &[MedienSpur]) {
        for spur in spuren {
            self.verbindung.spur_anhaengen(spur);
            self.lokale_spuren.push(spur.clone());
        }
    }

    /// Zieht gepufferte Kandidaten in Empfangsreihenfolge nach
    async fn kandidaten_nachziehen(&mut self) {
        while let Some(kandidat) = self.kandidaten_puffer.pop_front() {
            if let Err(fehler) = self.verbindung.kandidat_anwenden(kandidat).await {
                tracing::warn!(peer = %self.peer_id, %fehler, "Gepufferter Kandidat nicht anwendbar");
            }
        }
    }

    fn zustand_wechseln(&mut self, neu: SessionZustand) {
        tracing::debug!(
            peer = %self.peer_id,
            von = %self.zustand,
            nach = %neu,
            "Session-Zustand gewechselt"
        );
        self.zustand = neu;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Attrappe die alle Aufrufe in Reihenfolge protokolliert
    #[derive(Default)]
    struct VerbindungsAttrappe {
        protokoll: Mutex<Vec<String>>,
        geschlossen: AtomicBool,
    }

    #[async_trait]
    impl PeerVerbindung for VerbindungsAttrappe {
        async fn offer_erstellen(&self) -> MeshResult<serde_json::Value> {
            self.protokoll.lock().unwrap().push("offer".into());
            Ok(serde_json::json!({"type": "offer"}))
        }

        async fn answer_erstellen(&self) -> MeshResult<serde_json::Value> {
            self.protokoll.lock().unwrap().push("answer".into());
            Ok(serde_json::json!({"type": "answer"}))
        }

        async fn entfernte_beschreibung_setzen(
            &self,
            _beschreibung: serde_json::Value,
        ) -> MeshResult<()> {
            self.protokoll.lock().unwrap().push("beschreibung".into());
            Ok(())
        }

        async fn kandidat_anwenden(&self, kandidat: serde_json::Value) -> MeshResult<()> {
            self.protokoll
                .lock()
                .unwrap()
                .push(format!("kandidat:{}", kandidat["n"]));
            Ok(())
        }

        fn spur_anhaengen(&self, spur: &MedienSpur) {
            self.protokoll
                .lock()
                .unwrap()
                .push(format!("anhaengen:{}", spur.art));
        }

        fn spur_ersetzen(&self, spur: &MedienSpur) {
            self.protokoll
                .lock()
                .unwrap()
                .push(format!("ersetzen:{}", spur.art));
        }

        fn spur_entfernen(&self, art: SpurArt) {
            self.protokoll
                .lock()
                .unwrap()
                .push(format!("entfernen:{art}"));
        }

        fn schliessen(&self) {
            self.geschlossen.store(true, Ordering::SeqCst);
        }
    }

    struct AusgangsAttrappe {
        gesendet: Mutex<Vec<SignalNachricht>>,
    }

    impl AusgangsAttrappe {
        fn neu() -> Self {
            Self {
                gesendet: Mutex::new(Vec::new()),
            }
        }
    }

    impl SignalAusgang for AusgangsAttrappe {
        fn senden(&self, nachricht: SignalNachricht) -> MeshResult<()> {
            self.gesendet.lock().unwrap().push(nachricht);
            Ok(())
        }
    }

    fn test_session() -> (PeerSession, Arc<VerbindungsAttrappe>) {
        let verbindung = Arc::new(VerbindungsAttrappe::default());
        let session = PeerSession::neu(PeerId::neu("bob"), verbindung.clone(), 8);
        (session, verbindung)
    }

    #[tokio::test]
    async fn offer_initiieren_wechselt_zustand() {
        let (mut session, verbindung) = test_session();
        let ausgang = AusgangsAttrappe::neu();
        let spuren = [MedienSpur::neu(SpurArt::Audio)];

        session
            .offer_initiieren(&spuren, &ausgang, &PeerId::neu("alice"))
            .await
            .unwrap();

        assert_eq!(session.zustand(), SessionZustand::OfferAusstehend);
        // Spur-Anhang VOR dem Offer
        let protokoll = verbindung.protokoll.lock().unwrap().clone();
        assert_eq!(protokoll, vec!["anhaengen:audio", "offer"]);
        assert!(matches!(
            ausgang.gesendet.lock().unwrap()[0],
            SignalNachricht::VoiceOffer { .. }
        ));
    }

    #[tokio::test]
    async fn offer_verarbeiten_fuehrt_zu_verbunden() {
        let (mut session, _verbindung) = test_session();
        let ausgang = AusgangsAttrappe::neu();

        session
            .offer_verarbeiten(
                serde_json::json!({"type": "offer"}),
                &[],
                &ausgang,
                &PeerId::neu("alice"),
            )
            .await
            .unwrap();

        assert_eq!(session.zustand(), SessionZustand::Verbunden);
        assert!(matches!(
            ausgang.gesendet.lock().unwrap()[0],
            SignalNachricht::VoiceAnswer { .. }
        ));
    }

    #[tokio::test]
    async fn answer_im_falschen_zustand_abgelehnt() {
        let (mut session, _) = test_session();
        let ergebnis = session
            .answer_verarbeiten(serde_json::json!({"type": "answer"}))
            .await;
        assert!(matches!(ergebnis, Err(MeshError::UngueltigerZustand(_))));
    }

    #[tokio::test]
    async fn kandidaten_werden_gepuffert_und_in_reihenfolge_nachgezogen() {
        let (mut session, verbindung) = test_session();
        let ausgang = AusgangsAttrappe::neu();

        // Kandidaten treffen vor der Beschreibung ein
        session.kandidat_verarbeiten(serde_json::json!({"n": 1})).await;
        session.kandidat_verarbeiten(serde_json::json!({"n": 2})).await;
        assert_eq!(session.gepufferte_kandidaten(), 2);
        assert!(verbindung.protokoll.lock().unwrap().is_empty());

        session
            .offer_verarbeiten(
                serde_json::json!({"type": "offer"}),
                &[],
                &ausgang,
                &PeerId::neu("alice"),
            )
            .await
            .unwrap();

        // Nach der Beschreibung: beide Kandidaten, in Empfangsreihenfolge
        let protokoll = verbindung.protokoll.lock().unwrap().clone();
        assert_eq!(
            protokoll,
            vec!["beschreibung", "kandidat:1", "kandidat:2", "answer"]
        );
        assert_eq!(session.gepufferte_kandidaten(), 0);

        // Spaetere Kandidaten gehen direkt durch
        session.kandidat_verarbeiten(serde_json::json!({"n": 3})).await;
        assert_eq!(session.gepufferte_kandidaten(), 0);
        assert_eq!(
            verbindung.protokoll.lock().unwrap().last().unwrap(),
            "kandidat:3"
        );
    }

    #[tokio::test]
    async fn puffer_limit_verwirft_ueberzaehlige() {
        let verbindung = Arc::new(VerbindungsAttrappe::default());
        let mut session = PeerSession::neu(PeerId::neu("bob"), verbindung, 2);

        for n in 0..5 {
            session.kandidat_verarbeiten(serde_json::json!({"n": n})).await;
        }
        assert_eq!(session.gepufferte_kandidaten(), 2);
    }

    #[tokio::test]
    async fn schliessen_gibt_ressourcen_frei() {
        let (mut session, verbindung) = test_session();
        session.kandidat_verarbeiten(serde_json::json!({"n": 1})).await;
        session.entfernte_spur_empfangen(MedienSpur::neu(SpurArt::Audio));

        session.schliessen();

        assert_eq!(session.zustand(), SessionZustand::Geschlossen);
        assert!(verbindung.geschlossen.load(Ordering::SeqCst));
        assert_eq!(session.gepufferte_kandidaten(), 0);
        assert!(session.entfernte_spuren().is_empty());

        // Idempotent
        session.schliessen();
        assert_eq!(session.zustand(), SessionZustand::Geschlossen);
    }

    #[tokio::test]
    async fn offer_verwerfen_behaelt_gepufferte_kandidaten() {
        struct Fabrik;
        impl VerbindungsFabrik for Fabrik {
            fn erstellen(&self, _ice: &[String]) -> Arc<dyn PeerVerbindung> {
                Arc::new(VerbindungsAttrappe::default())
            }
        }

        let (mut session, alte_verbindung) = test_session();
        let ausgang = AusgangsAttrappe::neu();
        session
            .offer_initiieren(&[], &ausgang, &PeerId::neu("zoe"))
            .await
            .unwrap();
        session.kandidat_verarbeiten(serde_json::json!({"n": 7})).await;

        session.offer_verwerfen(&Fabrik, &[]);

        assert_eq!(session.zustand(), SessionZustand::Leerlauf);
        assert!(alte_verbindung.geschlossen.load(Ordering::SeqCst));
        assert_eq!(session.gepufferte_kandidaten(), 1);
    }

    #[tokio::test]
    async fn spur_aktualisieren_ersetzt_gleiche_art() {
        let (mut session, verbindung) = test_session();

        let mut spur = MedienSpur::neu(SpurArt::Audio);
        session.spur_aktualisieren(&spur);
        spur.aktiviert = false;
        session.spur_aktualisieren(&spur);

        assert_eq!(session.lokale_spuren().len(), 1);
        assert!(!session.lokale_spuren()[0].aktiviert);
        assert_eq!(
            verbindung.protokoll.lock().unwrap().clone(),
            vec!["ersetzen:audio", "ersetzen:audio"]
        );
    }
}
