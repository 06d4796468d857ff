#![allow(clippy::unwrap_used, clippy::expect_used)]

use dungeon_core::*;

// ---------------------------------------------------------------------------
// 1. A fresh story: clear, seed, append
// ---------------------------------------------------------------------------

#[test]
fn cleared_log_shows_single_welcome_turn() {
    let mut log: ConversationLog = vec![
        Turn::user("I draw my sword"),
        Turn::ai("The goblin flees."),
    ]
    .into();

    log.clear();
    assert!(log.is_empty());

    log.ensure_welcome();
    assert_eq!(log.len(), 1);
    assert_eq!(log.turns()[0].sender, Sender::Ai);
    assert_eq!(log.turns()[0].text, WELCOME_TEXT);
}

// ---------------------------------------------------------------------------
// 2. Settings validation leaves prior values intact
// ---------------------------------------------------------------------------

#[test]
fn rejected_settings_changes_do_not_leak() {
    let mut settings = SessionSettings::default();
    settings.set_mode_str("uncensored").unwrap();
    settings.set_temperature(0.25).unwrap();
    settings.set_tone_str("Mystery").unwrap();
    let before = settings;

    assert!(settings.set_temperature(-0.1).is_err());
    assert!(settings.set_temperature(1.5).is_err());
    assert!(settings.set_mode_str("foo").is_err());
    assert!(settings.set_tone_str("Unknown").is_err());

    assert_eq!(settings, before);
}

// ---------------------------------------------------------------------------
// 3. Error messages are display-ready
// ---------------------------------------------------------------------------

#[test]
fn errors_render_human_readable_messages() {
    let err = GenerationError::provider(ProviderCategory::Forbidden, "key lacks access");
    assert_eq!(
        err.to_string(),
        "AI provider error (permission denied): key lacks access"
    );

    assert_eq!(
        GenerationError::Empty.to_string(),
        "AI returned an empty or unreadable response."
    );
    assert_eq!(
        StoreError::NotConfigured.to_string(),
        "Persistence is not configured"
    );
    assert_eq!(
        ImportError::MalformedDocument("missing 'settings'".into()).to_string(),
        "Invalid transcript: missing 'settings'"
    );
    assert_eq!(
        InvalidSettingValue::new("tone", "Western").to_string(),
        "Invalid value for tone: Western"
    );
}

// ---------------------------------------------------------------------------
// 4. Turns deserialize from exported history entries
// ---------------------------------------------------------------------------

#[test]
fn history_parses_from_transcript_json() {
    let json = r#"[{"sender":"ai","text":"Hello"},{"sender":"user","text":"Hi"}]"#;
    let log: ConversationLog = serde_json::from_str(json).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log.turns()[1], Turn::user("Hi"));

    let bad = r#"[{"sender":"narrator","text":"?"}]"#;
    assert!(serde_json::from_str::<ConversationLog>(bad).is_err());
}
