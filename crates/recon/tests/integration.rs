use std::path::PathBuf;

use legiscrub_recon::config::PipelineConfig;
use legiscrub_recon::engine::{run, update};
use legiscrub_recon::model::{Table, Value};
use legiscrub_recon::report::PruneStatus;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_config(name: &str) -> PipelineConfig {
    let path = fixtures_dir().join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    PipelineConfig::from_toml(&text).unwrap()
}

/// Comma-separated lines, header first. Fixture cells never contain commas.
fn table(text: &str) -> Table {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let headers = lines
        .next()
        .unwrap()
        .split(',')
        .map(str::to_string)
        .collect();
    let rows = lines.map(|l| l.split(',').map(Value::from_field).collect::<Vec<_>>());
    Table::from_rows(headers, rows).unwrap()
}

fn text(t: &Table, row: usize, column: &str) -> String {
    t.get(row, column).unwrap().as_field().to_string()
}

// -------------------------------------------------------------------------
// Legislator defaults
// -------------------------------------------------------------------------

fn caucus_members() -> Table {
    table(
        "
        id,cong,mc.name,state,statenm,party
        10713,110,Joe Baca,,,D
        29940,110,Linda Sanchez,,,D
        99999,110,Zoë Lofgren,CA,california,D
        ",
    )
}

fn legislator_reference() -> Table {
    table(
        "
        id,congress,name,state,chamber
        10713,110,Joe Baca,CA,House
        29940,110,Linda T. Sánchez,CA,House
        29940,111,Linda T. Sánchez,CA,House
        ",
    )
}

#[test]
fn three_rows_two_match() {
    let config = load_config("legislators.toml");
    let out = run(caucus_members(), &legislator_reference(), &config).unwrap();

    assert_eq!(out.table.headers(), &["id", "cong", "mc.name", "state", "party"]);
    assert_eq!(out.table.len(), 3);
    assert_eq!(text(&out.table, 0, "mc.name"), "Joe Baca");
    assert_eq!(text(&out.table, 1, "mc.name"), "Linda T. Sanchez");
    assert_eq!(text(&out.table, 1, "state"), "CA");
    // Miss keeps its own values but still gets normalized
    assert_eq!(text(&out.table, 2, "mc.name"), "Zoe Lofgren");
    assert_eq!(text(&out.table, 2, "state"), "CA");

    // Keys come out exactly as they went in
    for (i, (id, cong)) in [("10713", "110"), ("29940", "110"), ("99999", "110")].iter().enumerate() {
        assert_eq!(text(&out.table, i, "id"), *id);
        assert_eq!(text(&out.table, i, "cong"), *cong);
    }

    let s = &out.report.summary;
    assert_eq!((s.rows, s.matched, s.unmatched), (3, 2, 1));
    assert_eq!(s.prune, PruneStatus::Removed { column: "statenm".into() });
    assert_eq!(out.report.non_matches[0].to_string(), "99999, 110, Zoë Lofgren");
    assert!(out.report.duplicate_keys.is_empty());
}

#[test]
fn update_only_overrides() {
    let config = load_config("legislators.toml");
    let out = update(caucus_members(), &legislator_reference(), &config).unwrap();

    assert_eq!(out.table.width(), 6);
    assert_eq!(text(&out.table, 1, "mc.name"), "Linda T. Sánchez");
    assert_eq!(text(&out.table, 1, "statenm"), "CA");
    assert_eq!(text(&out.table, 2, "statenm"), "california");
}

#[test]
fn numeric_keys_match_across_spellings() {
    let target = table(
        "
        id,cong,mc.name,state,statenm
        29940,110,Linda Sanchez,,
        ",
    );
    let reference = table(
        "
        id,congress,name,state
        29940.0,110.0,Linda T. Sánchez,CA
        ",
    );
    let out = run(target, &reference, &PipelineConfig::default()).unwrap();
    assert_eq!(out.report.summary.matched, 1);
    // Written back the way the target spelled it
    assert_eq!(text(&out.table, 0, "id"), "29940");
}

#[test]
fn text_keys_do_not_match_numbers_or_other_case() {
    let target = table(
        "
        id,cong,mc.name,state,statenm
        A12,110,Ann,,
        12,110,Bo,,
        ",
    );
    let reference = table(
        "
        id,congress,name,state
        a12,110,Ann B,OH
        12x,110,Bo C,TX
        ",
    );
    let out = run(target, &reference, &PipelineConfig::default()).unwrap();
    assert_eq!(out.report.summary.matched, 0);
    assert_eq!(out.report.summary.unmatched, 2);
}

#[test]
fn duplicate_reference_keys_last_wins() {
    let reference = table(
        "
        id,congress,name,state
        10713,110,Joe Baca (old),CA
        10713,110,Joe Baca,CA
        ",
    );
    let out = run(caucus_members(), &reference, &PipelineConfig::default()).unwrap();
    assert_eq!(text(&out.table, 0, "mc.name"), "Joe Baca");
    assert_eq!(out.report.summary.duplicate_reference_keys, 1);
    assert_eq!(out.report.duplicate_keys[0].occurrences, 2);
}

#[test]
fn missing_key_cells_never_match() {
    let target = table(
        "
        id,cong,mc.name,state,statenm
        ,110,Nobody,,
        ",
    );
    let reference = table(
        "
        id,congress,name,state
        ,110,Somebody,XX
        ",
    );
    let out = run(target, &reference, &PipelineConfig::default()).unwrap();
    assert_eq!(out.report.summary.matched, 0);
    assert_eq!(out.report.summary.unkeyed_reference_rows, 1);
    assert_eq!(text(&out.table, 0, "mc.name"), "Nobody");
}

// -------------------------------------------------------------------------
// Custom column names
// -------------------------------------------------------------------------

#[test]
fn icpsr_config_with_compatibility_form() {
    let config = load_config("icpsr.toml");
    let target = table(
        "
        icpsr,cong,mc.name,state,statenm
        15000,115,Rufino,,
        ",
    );
    let reference = table(
        "
        icpsr,congress,bioname,state_abbrev
        15000,115,Ruﬁno Ñúñez,TX
        ",
    );
    let out = run(target, &reference, &config).unwrap();
    assert_eq!(text(&out.table, 0, "mc.name"), "Rufino Nunez");
    assert_eq!(text(&out.table, 0, "state"), "TX");
    assert_eq!(out.report.summary.prune, PruneStatus::Disabled);
    assert_eq!(out.table.width(), 5);
    assert_eq!(out.report.meta.config_name, "Caucus members (ICPSR keys)");
}

#[test]
fn missing_reference_key_column_is_fatal() {
    let config = load_config("icpsr.toml");
    let err = run(caucus_members(), &legislator_reference(), &config).unwrap_err();
    assert_eq!(err.to_string(), "target table: missing column 'icpsr'");

    let target = table("icpsr,cong,mc.name,state,statenm\n1,110,A,,");
    let err = run(target, &legislator_reference(), &config).unwrap_err();
    assert_eq!(err.to_string(), "reference table: missing column 'icpsr'");
}

#[test]
fn empty_target_yields_empty_output() {
    let target = table("id,cong,mc.name,state,statenm");
    let out = run(target, &legislator_reference(), &PipelineConfig::default()).unwrap();
    assert!(out.table.is_empty());
    assert_eq!(out.table.headers(), &["id", "cong", "mc.name", "state"]);
    assert!(out.report.all_matched());
}
