//! Deterministic artifact naming.
//!
//! Every byproduct of the pipeline lands at a storage key derived purely from
//! the configured prefix, the artifact category and the input file's base
//! name, so a rerun overwrites its own artifacts instead of colliding with
//! another environment's.

use std::time::{SystemTime, UNIX_EPOCH};

/// Category of a persisted pipeline artifact.
///
/// The `as_str` value is the key-path segment between the prefix and the
/// object name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    AudioInputs,
    Transcripts,
    Translations,
    AudioOutputs,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::AudioInputs => "audio_inputs",
            ArtifactKind::Transcripts => "transcripts",
            ArtifactKind::Translations => "translations",
            ArtifactKind::AudioOutputs => "audio_outputs",
        }
    }
}

/// Storage key for the uploaded input audio: `{prefix}/audio_inputs/{file_name}`.
pub fn input_key(prefix: &str, file_name: &str) -> String {
    format!("{prefix}/{}/{file_name}", ArtifactKind::AudioInputs.as_str())
}

/// Storage key for the transcript text: `{prefix}/transcripts/{base}.txt`.
pub fn transcript_key(prefix: &str, base_name: &str) -> String {
    format!(
        "{prefix}/{}/{base_name}.txt",
        ArtifactKind::Transcripts.as_str()
    )
}

/// Storage key for the translated text: `{prefix}/translations/{base}_{lang}.txt`.
pub fn translation_key(prefix: &str, base_name: &str, target_lang: &str) -> String {
    format!(
        "{prefix}/{}/{base_name}_{target_lang}.txt",
        ArtifactKind::Translations.as_str()
    )
}

/// Storage key for the synthesized audio: `{prefix}/audio_outputs/{base}_{lang}.mp3`.
pub fn output_audio_key(prefix: &str, base_name: &str, target_lang: &str) -> String {
    format!(
        "{prefix}/{}/{base_name}_{target_lang}.mp3",
        ArtifactKind::AudioOutputs.as_str()
    )
}

/// Local file name for the persisted transcript.
pub fn transcript_file_name(base_name: &str) -> String {
    format!("{base_name}.txt")
}

/// Local file name for the persisted translation.
pub fn translation_file_name(base_name: &str, target_lang: &str) -> String {
    format!("{base_name}_{target_lang}.txt")
}

/// Local file name for the synthesized audio.
pub fn output_audio_file_name(base_name: &str, target_lang: &str) -> String {
    format!("{base_name}_{target_lang}.mp3")
}

/// Transcription job name: base name plus a uniqueness token.
///
/// The transcription service rejects duplicate job names, so reruns of the
/// same file need distinct names.
pub fn job_name(base_name: &str, token: u128) -> String {
    format!("{base_name}-{token}")
}

/// Millisecond timestamp used as the job-name uniqueness token.
pub fn timestamp_token() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_key_keeps_original_file_name() {
        assert_eq!(
            input_key("beta", "greeting.mp3"),
            "beta/audio_inputs/greeting.mp3"
        );
    }

    #[test]
    fn test_transcript_key_format() {
        assert_eq!(
            transcript_key("beta", "greeting"),
            "beta/transcripts/greeting.txt"
        );
    }

    #[test]
    fn test_translation_key_includes_language() {
        assert_eq!(
            translation_key("beta", "greeting", "fr"),
            "beta/translations/greeting_fr.txt"
        );
    }

    #[test]
    fn test_output_audio_key_includes_language() {
        assert_eq!(
            output_audio_key("beta", "greeting", "fr"),
            "beta/audio_outputs/greeting_fr.mp3"
        );
    }

    #[test]
    fn test_key_derivation_is_idempotent() {
        let a = translation_key("prod", "intro", "de");
        let b = translation_key("prod", "intro", "de");
        assert_eq!(a, b);
    }

    #[test]
    fn test_keys_differ_across_categories() {
        let keys = [
            input_key("beta", "greeting.mp3"),
            transcript_key("beta", "greeting"),
            translation_key("beta", "greeting", "es"),
            output_audio_key("beta", "greeting", "es"),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_local_file_names() {
        assert_eq!(transcript_file_name("greeting"), "greeting.txt");
        assert_eq!(translation_file_name("greeting", "fr"), "greeting_fr.txt");
        assert_eq!(output_audio_file_name("greeting", "fr"), "greeting_fr.mp3");
    }

    #[test]
    fn test_job_name_embeds_token() {
        assert_eq!(job_name("greeting", 1700000000000), "greeting-1700000000000");
    }

    #[test]
    fn test_timestamp_token_is_monotonic_enough() {
        let a = timestamp_token();
        let b = timestamp_token();
        assert!(b >= a);
        assert!(a > 0);
    }

    #[test]
    fn test_artifact_kind_segments() {
        assert_eq!(ArtifactKind::AudioInputs.as_str(), "audio_inputs");
        assert_eq!(ArtifactKind::Transcripts.as_str(), "transcripts");
        assert_eq!(ArtifactKind::Translations.as_str(), "translations");
        assert_eq!(ArtifactKind::AudioOutputs.as_str(), "audio_outputs");
    }
}
