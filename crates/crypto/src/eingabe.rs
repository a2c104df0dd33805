//! Eingabe-Pruefung und HTML-Escaping
//!
//! Laeuft VOR der Verschluesselung (der Ciphertext deckt damit bereits den
//! bereinigten Inhalt ab) und erneut ueber allem was nach einem
//! Entschluesselungs-Fehlschlag woertlich angezeigt wird.
//!
//! Abgelehnt werden leere Eingaben, Eingaben ueber der Maximallaenge und
//! drei Muster: `<script`, `javascript:` sowie Inline-Event-Handler
//! (`on...=`), jeweils unabhaengig von Gross-/Kleinschreibung.

use thiserror::Error;

/// Maximale Eingabelaenge in Zeichen
pub const MAX_EINGABE_LAENGE: usize = 10_000;

/// Fehler bei der Eingabe-Pruefung
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EingabeFehler {
    #[error("Eingabe darf nicht leer sein")]
    Leer,

    #[error("Eingabe zu lang: {laenge} Zeichen (Maximum: 10000)")]
    ZuLang { laenge: usize },

    #[error("Eingabe enthaelt ein gefaehrliches Muster: {muster}")]
    GefaehrlichesMuster { muster: &'static str },
}

/// Prueft eine Eingabe gegen Laengen-Limit und Muster-Denylist
pub fn eingabe_pruefen(eingabe: &str) -> Result<(), EingabeFehler> {
    if eingabe.is_empty() {
        return Err(EingabeFehler::Leer);
    }

    let laenge = eingabe.chars().count();
    if laenge > MAX_EINGABE_LAENGE {
        return Err(EingabeFehler::ZuLang { laenge });
    }

    let klein = eingabe.to_lowercase();
    if klein.contains("<script") {
        return Err(EingabeFehler::GefaehrlichesMuster { muster: "<script" });
    }
    if klein.contains("javascript:") {
        return Err(EingabeFehler::GefaehrlichesMuster {
            muster: "javascript:",
        });
    }
    if hat_event_handler_attribut(&klein) {
        return Err(EingabeFehler::GefaehrlichesMuster { muster: "on...=" });
    }

    Ok(())
}

/// Prueft und escaped eine Eingabe
///
/// Escaped werden `& < > " ' /` zu ihren Entity-Formen. Das Escaping laeuft
/// in einem Durchgang, es kann also kein bereits eingesetztes `&amp;`
/// doppelt escaped werden.
pub fn eingabe_bereinigen(eingabe: &str) -> Result<String, EingabeFehler> {
    eingabe_pruefen(eingabe)?;
    Ok(anzeige_escapen(eingabe))
}

/// Escaped ohne Pruefung
///
/// Fuer empfangene Inhalte die nicht abgelehnt, sondern nur neutralisiert
/// werden sollen (der Absender ist nicht mehr erreichbar).
pub fn anzeige_escapen(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for zeichen in text.chars() {
        match zeichen {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            sonst => escaped.push(sonst),
        }
    }
    escaped
}

/// Findet Inline-Event-Handler-Attribute: `on`, mindestens ein Wortzeichen,
/// optionaler Whitespace, dann `=`. Erwartet bereits kleingeschriebenen Text.
fn hat_event_handler_attribut(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 2 < bytes.len() {
        if bytes[i] == b'o' && bytes[i + 1] == b'n' {
            let mut j = i + 2;
            let mut wortzeichen = 0;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
                wortzeichen += 1;
            }
            if wortzeichen > 0 {
                while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                if j < bytes.len() && bytes[j] == b'=' {
                    return true;
                }
            }
        }
        i += 1;
    }
    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
