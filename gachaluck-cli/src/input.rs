use anyhow::{Context, Result};
use gachaluck_engine::{DrawEvent, Engine, GameVariant, RawRecord, VariantProfile};
use std::path::Path;

/// Engine for a built-in variant, or for a JSON profile when one is given.
pub fn load_engine(variant: GameVariant, profile: Option<&Path>) -> Result<Engine> {
    let profile = match profile {
        Some(path) => {
            let text = read_text(path)?;
            VariantProfile::from_json(&text)
                .with_context(|| format!("invalid variant profile in {}", path.display()))?
        }
        None => variant.profile(),
    };
    let name = profile.name.clone();
    Engine::from_profile(profile).with_context(|| format!("failed to build engine for {name}"))
}

pub fn load_events(path: &Path) -> Result<Vec<DrawEvent>> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of draw events", path.display()))
}

pub fn load_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of raw records", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(label: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "gachaluck-input-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn events_load_from_json_array() {
        let path = temp_file("events", r#"[{"name":"Jiyan","rarity":5,"featured":true}]"#);
        let events = load_events(&path).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].featured, Some(true));
    }

    #[test]
    fn malformed_input_reports_the_file() {
        let path = temp_file("broken", "{");
        let err = load_events(&path).unwrap_err();
        assert!(format!("{err:#}").contains("not a JSON array of draw events"));
        let missing = std::env::temp_dir().join("gachaluck-definitely-missing.json");
        assert!(format!("{:#}", load_raw_records(&missing).unwrap_err()).contains("failed to read"));
    }

    #[test]
    fn custom_profile_overrides_the_variant() {
        let path = temp_file(
            "profile",
            r#"{
                "name": "Flat",
                "rate": {"base_rate": 0.02, "hard_cap": 50},
                "percentile": {"floor_percentile": 1.0, "draws_ceiling": 100}
            }"#,
        );
        let engine = load_engine(GameVariant::WutheringWaves, Some(&path)).unwrap();
        assert_eq!(engine.profile().name, "Flat");
        assert_eq!(engine.rate_model().hard_cap(), 50);

        let bad = temp_file("bad-profile", r#"{"name": "Bad"}"#);
        assert!(load_engine(GameVariant::WutheringWaves, Some(&bad)).is_err());
    }
}
