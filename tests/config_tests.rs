use anyhow::Result;
use capture_session::{AudioModeOptions, Config};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_file_uses_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("absent");

    let cfg = Config::load(&path.display().to_string())?;

    assert_eq!(cfg.audio.sample_rate, 16000);
    assert_eq!(cfg.audio.channels, 1);
    assert!(cfg.audio.permission_granted);
    assert_eq!(cfg.controller.settle_delay_ms, 300);
    assert_eq!(cfg.controller.elapsed_tick_ms, 1000);
    assert_eq!(cfg.controller.playback_poll_ms, 100);
    assert_eq!(cfg.controller.inert_mode, AudioModeOptions::INERT);
    assert!(cfg.controller.recording_mode.record_enabled);

    Ok(())
}

#[test]
fn test_partial_file_overrides_selected_keys() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("session.toml");
    fs::write(
        &path,
        r#"
[audio]
sample_rate = 48000
recordings_path = "/tmp/takes"

[controller]
settle_delay_ms = 500

[controller.idle_mode]
record_enabled = false
duck_others = false
background_active = true
"#,
    )?;

    let cfg = Config::load(&path.display().to_string())?;

    assert_eq!(cfg.audio.sample_rate, 48000);
    assert_eq!(cfg.audio.recordings_path, "/tmp/takes");
    assert_eq!(cfg.audio.channels, 1);
    assert_eq!(cfg.controller.settle_delay_ms, 500);
    assert_eq!(cfg.controller.playback_poll_ms, 100);
    assert_eq!(
        cfg.controller.idle_mode,
        AudioModeOptions::new(false, false, true)
    );

    let capture = cfg.audio.capture_config();
    assert_eq!(capture.sample_rate, 48000);
    assert_eq!(capture.recordings_dir.display().to_string(), "/tmp/takes");

    Ok(())
}

#[test]
fn test_reset_modes_from_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("resets.toml");
    fs::write(
        &path,
        r#"
[[controller.reset_modes]]
record_enabled = false
duck_others = true
background_active = false

[[controller.reset_modes]]
record_enabled = true
duck_others = true
background_active = true
"#,
    )?;

    let cfg = Config::load(&path.display().to_string())?;

    assert_eq!(
        cfg.controller.reset_modes,
        [
            AudioModeOptions::new(false, true, false),
            AudioModeOptions::new(true, true, true),
        ]
    );

    Ok(())
}

#[test]
fn test_environment_overrides_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("service.toml");
    fs::write(&path, "[service]\nname = \"from-file\"\n")?;

    // Only the service name is touched so parallel tests are unaffected
    std::env::set_var("CAPTURE_SESSION__SERVICE__NAME", "from-env");
    let cfg = Config::load(&path.display().to_string());
    std::env::remove_var("CAPTURE_SESSION__SERVICE__NAME");

    assert_eq!(cfg?.service.name, "from-env");
    Ok(())
}
