//! Default configuration constants for revoice.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default storage key prefix.
///
/// Namespaces all artifact keys so multiple environments (beta, prod, a
/// developer sandbox) can share one bucket without colliding.
pub const PREFIX: &str = "beta";

/// Default target language code for translation and synthesis.
pub const TARGET_LANGUAGE: &str = "es";

/// Source language of the input audio.
///
/// Transcription and translation both assume English input; per-file language
/// detection is out of scope for the batch pipeline.
pub const SOURCE_LANGUAGE: &str = "en";

/// Default service region identifier.
pub const REGION: &str = "us-east-1";

/// Media format submitted with transcription jobs.
pub const MEDIA_FORMAT: &str = "mp3";

/// File extension that marks a file in the input directory as pipeline input.
///
/// Matched case-sensitively against the exact suffix.
pub const AUDIO_EXTENSION: &str = ".mp3";

/// Directory scanned for input audio files.
pub const INPUT_DIR: &str = "audio_inputs";

/// Seconds to wait between transcription job status polls.
pub const POLL_INTERVAL_SECS: u64 = 10;

/// Maximum number of status polls before a transcription job is abandoned.
///
/// 360 polls at the default 10s interval is roughly one hour of waiting,
/// after which the file is marked timed out instead of blocking the batch
/// forever.
pub const MAX_POLL_ATTEMPTS: u32 = 360;

/// Default voice used when a target language has no mapping.
pub const FALLBACK_VOICE: &str = "Matthew";

/// Synthesis voice for a target language code.
///
/// Covers the languages the pipeline is routinely run with; anything else
/// falls back to the English voice. Overridable per language via the
/// `[voices]` configuration table.
pub fn voice_for_language(lang: &str) -> &'static str {
    match lang {
        "es" => "Lucia",
        "fr" => "Celine",
        "de" => "Marlene",
        "it" => "Carla",
        "pt" => "Ines",
        "ja" => "Mizuki",
        "en" => FALLBACK_VOICE,
        _ => FALLBACK_VOICE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_for_known_languages() {
        assert_eq!(voice_for_language("es"), "Lucia");
        assert_eq!(voice_for_language("fr"), "Celine");
        assert_eq!(voice_for_language("de"), "Marlene");
    }

    #[test]
    fn voice_for_unknown_language_falls_back_to_english() {
        assert_eq!(voice_for_language("xx"), FALLBACK_VOICE);
        assert_eq!(voice_for_language(""), FALLBACK_VOICE);
        assert_eq!(voice_for_language("en"), FALLBACK_VOICE);
    }

    #[test]
    fn audio_extension_includes_dot() {
        assert!(AUDIO_EXTENSION.starts_with('.'));
        assert_eq!(MEDIA_FORMAT, &AUDIO_EXTENSION[1..]);
    }
}
