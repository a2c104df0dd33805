//! MeshManager – besitzt und verwaltet alle Peer-Sessions eines Raums
//!
//! Der Manager ist die einzige Stelle die Sessions erstellt, mutiert und
//! entfernt; die Session-Map ist explizit und nicht global. Eingehende
//! Signale laufen ausschliesslich durch [`MeshManager::signal_verarbeiten`],
//! Medien-Aenderungen durch die expliziten Methoden – es gibt keine
//! impliziten Listener.
//!
//! Unroutbare Nachrichten (unbekannter Peer, bereits geschlossene Session)
//! werden geloggt und verworfen; sie sind nie fatal.

use std::collections::HashMap;
use std::sync::Arc;

use fluester_core::types::{PeerId, RaumId};
use fluester_protocol::SignalNachricht;
use tokio::sync::broadcast;

use crate::config::MeshKonfiguration;
use crate::error::{MeshError, MeshResult};
use crate::media::{MedienQuelle, MedienSpur, SignalAusgang, SpurArt, VerbindungsFabrik};
use crate::session::{PeerSession, SessionZustand};

// ---------------------------------------------------------------------------
// Mesh-Ereignisse
// ---------------------------------------------------------------------------

/// Benachrichtigungen fuer die einbettende Anwendung
#[derive(Debug, Clone)]
pub enum MeshEreignis {
    /// Negotiation mit einem Peer abgeschlossen
    PeerVerbunden { peer: PeerId },
    /// Session zu einem Peer beendet
    PeerGetrennt { peer: PeerId },
    /// Eine entfernte Spur ist eingetroffen
    EntfernteSpur { peer: PeerId, spur: MedienSpur },
    /// Medienzugriff fehlgeschlagen; das Mesh laeuft eingeschraenkt weiter
    MedienFehler { grund: String },
}

// ---------------------------------------------------------------------------
// MeshManager
// ---------------------------------------------------------------------------

/// Verwaltet das Peer-Mesh eines Raums
///
/// Ein logischer Akteur: alle Methoden nehmen `&mut self`, die einbettende
/// Event-Schleife serialisiert die Aufrufe. Invariante: pro bekanntem Peer
/// existiert genau eine Session, nie zwei fuer dieselbe PeerId.
pub struct MeshManager {
    /// Eigene PeerId (Nickname im Raum)
    lokal: PeerId,
    konfig: MeshKonfiguration,
    quelle: Arc<dyn MedienQuelle>,
    fabrik: Arc<dyn VerbindungsFabrik>,
    ausgang: Arc<dyn SignalAusgang>,
    /// Alle Sessions, indexiert nach PeerId
    sessions: HashMap<PeerId, PeerSession>,
    /// Aktueller Raum (None = nicht beigetreten)
    raum: Option<RaumId>,
    /// Lokaler Mute-Status
    stumm: bool,
    /// Aktive lokale Audio-Spur
    audio_spur: Option<MedienSpur>,
    /// Aktive lokale Video-Spur
    video_spur: Option<MedienSpur>,
    /// Broadcast-Sender fuer Mesh-Ereignisse
    ereignis_tx: broadcast::Sender<MeshEreignis>,
}

impl MeshManager {
    /// Erstellt einen neuen Manager (noch keinem Raum beigetreten)
    pub fn neu(
        lokal: PeerId,
        konfig: MeshKonfiguration,
        quelle: Arc<dyn MedienQuelle>,
        fabrik: Arc<dyn VerbindungsFabrik>,
        ausgang: Arc<dyn SignalAusgang>,
    ) -> Self {
        let (ereignis_tx, _) = broadcast::channel(konfig.ereignis_kanal_groesse);
        Self {
            lokal,
            konfig,
            quelle,
            fabrik,
            ausgang,
            sessions: HashMap::new(),
            raum: None,
            stumm: false,
            audio_spur: None,
            video_spur: None,
            ereignis_tx,
        }
    }

    /// Abonniert Mesh-Ereignisse
    pub fn ereignisse_abonnieren(&self) -> broadcast::Receiver<MeshEreignis> {
        self.ereignis_tx.subscribe()
    }

    /// Tritt dem Voice-Mesh eines Raums bei
    ///
    /// Kuendigt die eigene Praesenz an und initiiert fuer jeden bereits
    /// anwesenden Peer eine Session. Scheitert der Medienzugriff, laeuft
    /// der Beitritt ohne die betroffene Spur weiter (Ereignis
    /// [`MeshEreignis::MedienFehler`]); ein einzelner fehlschlagender Peer
    /// verhindert den Beitritt ebenfalls nicht.
    pub async fn beitreten(
        &mut self,
        raum: RaumId,
        vorhandene_peers: &[PeerId],
        mit_video: bool,
    ) -> MeshResult<()> {
        if self.raum.is_some() {
            return Err(MeshError::UngueltigerZustand(
                "Bereits einem Raum beigetreten".into(),
            ));
        }

        // Medien zuerst erfassen, damit die Offers den echten Stand tragen
        match self.quelle.erfassen(SpurArt::Audio).await {
            Ok(mut spur) => {
                spur.aktiviert = !self.stumm;
                self.audio_spur = Some(spur);
            }
            Err(fehler) => self.medien_fehler(SpurArt::Audio, &fehler),
        }
        if mit_video {
            match self.quelle.erfassen(SpurArt::Video).await {
                Ok(spur) => self.video_spur = Some(spur),
                Err(fehler) => self.medien_fehler(SpurArt::Video, &fehler),
            }
        }

        self.ausgang.senden(SignalNachricht::VoiceJoin {
            nickname: self.lokal.clone(),
        })?;
        self.raum = Some(raum.clone());

        let spuren = self.aktive_spuren();
        let ausgang = Arc::clone(&self.ausgang);
        for peer in vorhandene_peers {
            if *peer == self.lokal {
                continue;
            }
            let verbindung = self.fabrik.erstellen(&self.konfig.ice_server);
            let mut session = PeerSession::neu(
                peer.clone(),
                verbindung,
                self.konfig.kandidaten_puffer_limit,
            );
            match session.offer_initiieren(&spuren, &*ausgang, &self.lokal).await {
                Ok(()) => {
                    self.sessions.insert(peer.clone(), session);
                }
                Err(fehler) => {
                    tracing::warn!(peer = %peer, %fehler, "Offer-Initiative fehlgeschlagen");
                    session.schliessen();
                }
            }
        }

        tracing::info!(
            raum = %raum,
            peers = vorhandene_peers.len(),
            "Mesh beigetreten"
        );
        Ok(())
    }

    /// Verarbeitet eine eingehende Signaling-Nachricht
    ///
    /// Der einzige Eingang fuer Signale. Routet anhand des Absenders zur
    /// passenden Session; nichts hier propagiert einen Fehler nach aussen.
    pub async fn signal_verarbeiten(&mut self, nachricht: SignalNachricht) {
        if self.raum.is_none() {
            tracing::debug!("Signal ohne aktiven Raum verworfen");
            return;
        }

        match nachricht {
            SignalNachricht::VoiceJoin { nickname } => self.peer_beigetreten(nickname),
            SignalNachricht::VoiceLeave { nickname } => self.peer_gegangen(&nickname),
            SignalNachricht::VoiceOffer { offer, to, from } => {
                if to != self.lokal {
                    self.unroutbar(&from, "Offer an fremde Adresse");
                    return;
                }
                self.offer_verarbeiten(from, offer).await;
            }
            SignalNachricht::VoiceAnswer { answer, to, from } => {
                if to != self.lokal {
                    self.unroutbar(&from, "Answer an fremde Adresse");
                    return;
                }
                self.answer_verarbeiten(from, answer).await;
            }
            SignalNachricht::VoiceIceCandidate {
                candidate,
                to,
                from,
            } => {
                if to != self.lokal {
                    self.unroutbar(&from, "Kandidat an fremde Adresse");
                    return;
                }
                self.kandidat_verarbeiten(from, candidate).await;
            }
            SignalNachricht::ChatMessage { .. } | SignalNachricht::EncryptedChatMessage { .. } => {
                tracing::trace!("Chat-Nachricht nicht Mesh-relevant, ignoriert");
            }
        }
    }

    /// Ein Peer ist dem Raum beigetreten
    ///
    /// Erstellt eine passive Session im Leerlauf – der Beitretende
    /// initiiert die Offers zu allen Anwesenden. Eine veraltete Session
    /// derselben PeerId (Rejoin-Wettlauf) wird vorher geschlossen; steht
    /// dagegen das eigene Offer zu diesem Peer noch aus (gleichzeitiger
    /// Beitritt), bleibt die Session bestehen und der Offer-Pfad loest die
    /// Situation als Glare auf.
    pub fn peer_beigetreten(&mut self, peer: PeerId) {
        if peer == self.lokal {
            return;
        }
        match self.sessions.get(&peer).map(|s| s.zustand()) {
            Some(SessionZustand::OfferAusstehend) => {
                tracing::debug!(peer = %peer, "Join waehrend eigenes Offer aussteht, Session bleibt");
                return;
            }
            Some(_) => {
                if let Some(mut alte) = self.sessions.remove(&peer) {
                    tracing::info!(peer = %peer, "Veraltete Session vor Neuaufbau geschlossen");
                    alte.schliessen();
                    let _ = self.ereignis_tx.send(MeshEreignis::PeerGetrennt {
                        peer: peer.clone(),
                    });
                }
            }
            None => {}
        }

        let verbindung = self.fabrik.erstellen(&self.konfig.ice_server);
        let session = PeerSession::neu(
            peer.clone(),
            verbindung,
            self.konfig.kandidaten_puffer_limit,
        );
        self.sessions.insert(peer.clone(), session);
        tracing::debug!(peer = %peer, "Session fuer neuen Peer angelegt");
    }

    /// Ein Peer hat den Raum verlassen
    pub fn peer_gegangen(&mut self, peer: &PeerId) {
        match self.sessions.remove(peer) {
            Some(mut session) => {
                session.schliessen();
                let _ = self.ereignis_tx.send(MeshEreignis::PeerGetrennt {
                    peer: peer.clone(),
                });
                tracing::info!(peer = %peer, "Peer gegangen, Session geschlossen");
            }
            None => {
                tracing::debug!(peer = %peer, "Leave fuer unbekannten Peer ignoriert");
            }
        }
    }

    /// Setzt den lokalen Mute-Status und spielt ihn in alle verbundenen
    /// Sessions ein
    ///
    /// Mute deaktiviert nur die Spur – das Geraet bleibt offen und es gibt
    /// keine Renegotiation.
    pub fn stumm_setzen(&mut self, stumm: bool) {
        self.stumm = stumm;
        let spur = match self.audio_spur.as_mut() {
            Some(spur) => {
                spur.aktiviert = !stumm;
                spur.clone()
            }
            None => return,
        };
        for session in self.sessions.values_mut().filter(|s| s.ist_verbunden()) {
            session.spur_aktualisieren(&spur);
        }
        tracing::debug!(stumm, "Mute-Status in verbundene Sessions uebernommen");
    }

    /// Schaltet die Kamera ein oder aus
    ///
    /// Einschalten erfasst eine neue Spur und spielt sie per Ersetzen in
    /// alle verbundenen Sessions ein – keine Renegotiation. Ausschalten
    /// stoppt die Erfassung vollstaendig (Hardware-Indikator erlischt) und
    /// haengt die Spur ueberall ab.
    pub async fn video_setzen(&mut self, aktiv: bool) {
        if aktiv {
            if self.video_spur.is_some() {
                return;
            }
            match self.quelle.erfassen(SpurArt::Video).await {
                Ok(spur) => {
                    for session in self.sessions.values_mut().filter(|s| s.ist_verbunden()) {
                        session.spur_aktualisieren(&spur);
                    }
                    self.video_spur = Some(spur);
                }
                Err(fehler) => self.medien_fehler(SpurArt::Video, &fehler),
            }
        } else if self.video_spur.take().is_some() {
            for session in self.sessions.values_mut().filter(|s| s.ist_verbunden()) {
                session.spur_entfernen(SpurArt::Video);
            }
            self.quelle.stoppen(SpurArt::Video);
        }
    }

    /// Vermerkt eine von der nativen Schicht gemeldete entfernte Spur
    pub fn entfernte_spur_empfangen(&mut self, von: &PeerId, spur: MedienSpur) {
        match self.sessions.get_mut(von) {
            Some(session) => {
                session.entfernte_spur_empfangen(spur.clone());
                let _ = self.ereignis_tx.send(MeshEreignis::EntfernteSpur {
                    peer: von.clone(),
                    spur,
                });
            }
            None => self.unroutbar(von, "Spur fuer unbekannten Peer"),
        }
    }

    /// Verlaesst das Mesh: schliesst alle Sessions synchron, stoppt die
    /// Erfassung und kuendigt den Abgang an
    ///
    /// Auch mitten in laufenden Negotiations bleibt nichts zurueck – nach
    /// diesem Aufruf existiert keine Session und keine native Verbindung
    /// mehr.
    pub fn verlassen(&mut self) {
        if self.raum.take().is_none() {
            return;
        }

        for (_, mut session) in self.sessions.drain() {
            session.schliessen();
        }
        if self.audio_spur.take().is_some() {
            self.quelle.stoppen(SpurArt::Audio);
        }
        if self.video_spur.take().is_some() {
            self.quelle.stoppen(SpurArt::Video);
        }

        if let Err(fehler) = self.ausgang.senden(SignalNachricht::VoiceLeave {
            nickname: self.lokal.clone(),
        }) {
            tracing::warn!(%fehler, "Leave-Ankuendigung fehlgeschlagen");
        }

        tracing::info!("Mesh verlassen, alle Sessions geschlossen");
    }

    // -----------------------------------------------------------------------
    // Abfragen
    // -----------------------------------------------------------------------

    pub fn ist_im_raum(&self) -> bool {
        self.raum.is_some()
    }

    pub fn ist_stumm(&self) -> bool {
        self.stumm
    }

    pub fn video_aktiv(&self) -> bool {
        self.video_spur.is_some()
    }

    pub fn session_anzahl(&self) -> usize {
        self.sessions.len()
    }

    /// Zustand der Session zu einem Peer
    pub fn session_zustand(&self, peer: &PeerId) -> Option<SessionZustand> {
        self.sessions.get(peer).map(|s| s.zustand())
    }

    /// Alle Peers mit abgeschlossener Negotiation
    pub fn verbundene_peers(&self) -> Vec<PeerId> {
        self.sessions
            .values()
            .filter(|s| s.ist_verbunden())
            .map(|s| s.peer_id().clone())
            .collect()
    }

    /// Aktuell aktive lokale Spuren (Referenz-Kopien)
    pub fn aktive_spuren(&self) -> Vec<MedienSpur> {
        self.audio_spur
            .iter()
            .chain(self.video_spur.iter())
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Interne Verarbeitung
    // -----------------------------------------------------------------------

    async fn offer_verarbeiten(&mut self, von: PeerId, offer: serde_json::Value) {
        let spuren = self.aktive_spuren();
        let ausgang = Arc::clone(&self.ausgang);
        let fabrik = Arc::clone(&self.fabrik);
        let ice_server = self.konfig.ice_server.clone();
        let lokal = self.lokal.clone();

        let session = match self.sessions.get_mut(&von) {
            Some(session) => session,
            None => {
                // Der Bus ist pro Absender geordnet: ein Join kommt immer
                // vor dem Offer. Ohne Session ist das Offer veraltet.
                self.unroutbar(&von, "Offer ohne bekannte Session");
                return;
            }
        };

        match session.zustand() {
            SessionZustand::Leerlauf => {}
            SessionZustand::OfferAusstehend => {
                // Glare: beide Seiten haben gleichzeitig initiiert.
                // Das Offer der lexikografisch kleineren PeerId gilt.
                if lokal < von {
                    tracing::info!(
                        peer = %von,
                        "Glare aufgeloest: eigenes Offer gilt, entferntes verworfen"
                    );
                    return;
                }
                tracing::info!(
                    peer = %von,
                    "Glare aufgeloest: eigenes Offer verworfen, antworte stattdessen"
                );
                session.offer_verwerfen(&*fabrik, &ice_server);
            }
            zustand => {
                tracing::debug!(peer = %von, %zustand, "Offer in diesem Zustand verworfen");
                return;
            }
        }

        if let Err(fehler) = session
            .offer_verarbeiten(offer, &spuren, &*ausgang, &lokal)
            .await
        {
            tracing::warn!(peer = %von, %fehler, "Offer-Verarbeitung fehlgeschlagen, Session geschlossen");
            if let Some(mut session) = self.sessions.remove(&von) {
                session.schliessen();
            }
            return;
        }

        let _ = self
            .ereignis_tx
            .send(MeshEreignis::PeerVerbunden { peer: von });
    }

    async fn answer_verarbeiten(&mut self, von: PeerId, answer: serde_json::Value) {
        let session = match self.sessions.get_mut(&von) {
            Some(session) => session,
            None => {
                self.unroutbar(&von, "Answer ohne bekannte Session");
                return;
            }
        };

        match session.answer_verarbeiten(answer).await {
            Ok(()) => {
                let _ = self
                    .ereignis_tx
                    .send(MeshEreignis::PeerVerbunden { peer: von });
            }
            Err(MeshError::UngueltigerZustand(grund)) => {
                // Duplikat oder verspaetetes Answer – verwerfen
                tracing::debug!(peer = %von, grund = %grund, "Answer verworfen");
            }
            Err(fehler) => {
                tracing::warn!(peer = %von, %fehler, "Answer-Verarbeitung fehlgeschlagen, Session geschlossen");
                if let Some(mut session) = self.sessions.remove(&von) {
                    session.schliessen();
                }
            }
        }
    }

    async fn kandidat_verarbeiten(&mut self, von: PeerId, kandidat: serde_json::Value) {
        match self.sessions.get_mut(&von) {
            Some(session) => session.kandidat_verarbeiten(kandidat).await,
            None => self.unroutbar(&von, "Kandidat ohne bekannte Session"),
        }
    }

    fn medien_fehler(&self, art: SpurArt, fehler: &MeshError) {
        tracing::warn!(%art, %fehler, "Medienzugriff fehlgeschlagen, Mesh laeuft eingeschraenkt weiter");
        let _ = self.ereignis_tx.send(MeshEreignis::MedienFehler {
            grund: fehler.to_string(),
        });
    }

    fn unroutbar(&self, peer: &PeerId, grund: &str) {
        let fehler = MeshError::routing(peer, grund);
        tracing::warn!(%fehler, "Signal verworfen");
    }
}
