//! Include resolution against real files.

use std::path::PathBuf;

use cw_template::{TemplateError, TemplateLoader};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cw_template_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(dir.join("ips")).unwrap();
    dir
}

#[test]
fn include_is_merged_under_local_keys() {
    let dir = scratch_dir("merge");
    std::fs::write(
        dir.join("ips/pmu_v3.json"),
        r#"{ "vp_class": "pulp/pmu", "version": 3, "nb_domains": 4 }"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("chip.yaml"),
        "chip: wolfe\nsoc:\n  peripherals:\n    pmu:\n      '@include@': ips/pmu_v3.json\n      version: 4\n",
    )
    .unwrap();

    let tp = TemplateLoader::new().load(&dir.join("chip.yaml")).unwrap();
    assert_eq!(tp.get_child_int("soc/peripherals/pmu/version").unwrap(), Some(4));
    assert_eq!(tp.get_child_int("soc/peripherals/pmu/nb_domains").unwrap(), Some(4));
    assert_eq!(
        tp.get_child_str("soc/peripherals/pmu/vp_class").unwrap().as_deref(),
        Some("pulp/pmu")
    );
}

#[test]
fn include_found_on_search_path() {
    let dir = scratch_dir("search");
    let lib = dir.join("lib");
    std::fs::create_dir_all(&lib).unwrap();
    std::fs::write(lib.join("rtc.json"), r#"{ "config": { "apb_irq_soc_event": 8 } }"#).unwrap();
    std::fs::write(dir.join("chip.json"), r#"{ "rtc": { "@include@": "rtc.json" } }"#).unwrap();

    let loader = TemplateLoader::new().with_search_dir(&lib);
    let tp = loader.load(&dir.join("chip.json")).unwrap();
    assert_eq!(tp.get_child_int("rtc/config/apb_irq_soc_event").unwrap(), Some(8));

    let imported = loader.import("rtc.json", false).unwrap().unwrap();
    assert!(imported.has("config"));
}

#[test]
fn include_cycle_is_detected() {
    let dir = scratch_dir("cycle");
    std::fs::write(dir.join("a.json"), r#"{ "b": { "@include@": "b.json" } }"#).unwrap();
    std::fs::write(dir.join("b.json"), r#"{ "a": { "@include@": "a.json" } }"#).unwrap();

    let err = TemplateLoader::new().load(&dir.join("a.json")).unwrap_err();
    assert!(matches!(err, TemplateError::IncludeCycle { .. }));
}

#[test]
fn unreadable_file_reports_path() {
    let dir = scratch_dir("missing");
    let path = dir.join("nope.yaml");
    match TemplateLoader::new().load(&path) {
        Err(TemplateError::Read { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("unexpected {other:?}"),
    }
}
