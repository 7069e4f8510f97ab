//! Best-effort voice selection

use readalong_core::Voice;

/// Pick a voice for an utterance
///
/// Exact name match first, then the first voice whose name contains the
/// preferred fragment. `None` leaves the choice to the engine default; a
/// missing voice is never an error.
pub fn select_voice(
    voices: &[Voice],
    requested: Option<&str>,
    preferred: Option<&str>,
) -> Option<Voice> {
    let requested = requested.filter(|name| !name.is_empty());

    if let Some(name) = requested {
        if let Some(voice) = voices.iter().find(|v| v.name == name) {
            return Some(voice.clone());
        }
        tracing::debug!(voice = name, "Requested voice not installed, using fallback");
    }

    preferred
        .filter(|fragment| !fragment.is_empty())
        .and_then(|fragment| voices.iter().find(|v| v.name.contains(fragment)))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed() -> Vec<Voice> {
        vec![
            Voice::new("Samantha", "en-US"),
            Voice::new("Google US English", "en-US"),
            Voice::new("Google UK English Female", "en-GB"),
        ]
    }

    #[test]
    fn test_exact_match() {
        let voice = select_voice(&installed(), Some("Samantha"), Some("Google US English"));
        assert_eq!(voice.unwrap().name, "Samantha");
    }

    #[test]
    fn test_missing_falls_back_to_preferred() {
        let voice = select_voice(&installed(), Some("Nonexistent"), Some("Google US English"));
        assert_eq!(voice.unwrap().name, "Google US English");

        let voice = select_voice(&installed(), None, Some("UK English"));
        assert_eq!(voice.unwrap().name, "Google UK English Female");
    }

    #[test]
    fn test_engine_default() {
        assert_eq!(select_voice(&installed(), Some("Nonexistent"), None), None);
        assert_eq!(select_voice(&[], Some("Samantha"), Some("Google")), None);
        assert_eq!(select_voice(&installed(), Some(""), Some("")), None);
    }
}
