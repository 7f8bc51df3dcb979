use std::fs;

use mechanics_content::{ContentFactory, ContentLoader};
use mechanics_core::magic::EffectId;
use mechanics_core::{ContentOracle, MechanicsConfig, RefId};
use tempfile::TempDir;

const EFFECTS: &str = r#"(
    magic_effects: [
        (id: FireDamage, school: Destruction, base_cost: 5.0, flags: "HARMFUL"),
    ],
)"#;

const SPELLS_V1: &str = r#"(
    spells: [
        (id: "flame", kind: Spell, cost: 5, effects: []),
    ],
)"#;

const SPELLS_V2: &str = r#"(
    spells: [
        (id: "flame", kind: Spell, cost: 12, effects: []),
    ],
)"#;

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("content")).unwrap();
    fs::write(dir.path().join("content/00_effects.ron"), EFFECTS).unwrap();
    fs::write(dir.path().join("content/10_spells.ron"), SPELLS_V1).unwrap();
    dir
}

#[test]
fn loads_a_data_directory_with_defaults() {
    let dir = data_dir();
    let loaded = ContentFactory::new(dir.path()).load_all().unwrap();

    assert_eq!(loaded.config, MechanicsConfig::default());
    assert_eq!(loaded.settings.float("fCombatDistance").unwrap(), 128.0);
    let fire = loaded.content.magic_effect(EffectId::FireDamage).unwrap();
    assert!(fire.is_harmful());
    assert!(loaded.tables.summon_creature(EffectId::SummonScamp).is_some());
}

#[test]
fn settings_file_overlays_defaults() {
    let dir = data_dir();
    fs::write(
        dir.path().join("settings.toml"),
        "iCrimeThreshold = 250\nfHoldBreathTime = 5.0\n",
    )
    .unwrap();
    fs::write(dir.path().join("config.toml"), "sneak_interval = 1.5\n").unwrap();

    let loaded = ContentFactory::new(dir.path()).load_all().unwrap();

    assert_eq!(loaded.settings.int("iCrimeThreshold").unwrap(), 250);
    assert_eq!(loaded.settings.float("fHoldBreathTime").unwrap(), 5.0);
    assert_eq!(loaded.settings.float("fSuffocationDamage").unwrap(), 3.0);
    assert_eq!(loaded.config.sneak_interval, 1.5);
}

#[test]
fn later_catalogs_replace_earlier_records() {
    let dir = data_dir();
    fs::write(dir.path().join("content/20_patch.ron"), SPELLS_V2).unwrap();

    let content = ContentFactory::new(dir.path()).load_content().unwrap();
    assert_eq!(content.spell(&RefId::new("flame")).unwrap().cost, 12);
}

#[test]
fn broken_catalog_names_the_file() {
    let dir = data_dir();
    let path = dir.path().join("content/30_broken.ron");
    fs::write(&path, "(spells: [ (id: ").unwrap();

    let error = ContentLoader::load(&path).unwrap_err();
    assert!(error.to_string().contains("30_broken.ron"));
}

#[test]
fn missing_content_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(ContentFactory::new(dir.path()).load_content().is_err());
}
