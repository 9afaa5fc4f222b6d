//! Pad-frame descriptions loaded from referenced files.

use std::path::PathBuf;

use cw_compose::ChipComposer;
use cw_template::{Template, TemplateLoader};
use serde_json::json;

fn ip_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cw_compose_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(dir.join("padframes")).unwrap();
    dir
}

#[test]
fn groups_come_from_content_file() {
    let dir = ip_dir("content");
    std::fs::write(
        dir.join("padframes/wolfe.json"),
        r#"{ "groups": { "hyper0": { "is_master": true, "nb_cs": 2 }, "jtag0": { "is_slave": true } } }"#,
    )
    .unwrap();

    let composer = ChipComposer::new(TemplateLoader::new().with_search_dir(&dir));
    let tp = Template::new(json!({
        "chip": "wolfe",
        "padframe": { "content": "padframes/wolfe.json" }
    }));
    let g = composer.compose(&tp).unwrap();

    let padframe = g.lookup("padframe").unwrap();
    assert_eq!(g.node(padframe).unwrap().includes(), ["padframes/wolfe.json"]);
    assert_eq!(
        g.targets_of(padframe, "hyper0_cs1_data_pad"),
        ["wolfe->hyper0_cs1_data"]
    );
    assert_eq!(g.targets_of(g.root(), "jtag0"), ["wolfe/padframe->jtag0_pad"]);
}

#[test]
fn missing_content_file_skips_groups() {
    let dir = ip_dir("missing");
    let composer = ChipComposer::new(TemplateLoader::new().with_search_dir(&dir));
    let tp = Template::new(json!({
        "chip": "wolfe",
        "padframe": { "content": "padframes/absent.json" }
    }));
    let g = composer.compose(&tp).unwrap();

    let padframe = g.lookup("padframe").unwrap();
    // Only the clock and reference clock reach the pad-frame.
    let names: Vec<&str> = g
        .node(padframe)
        .unwrap()
        .ports()
        .iter()
        .map(|&p| g.port(p).unwrap().name.as_str())
        .collect();
    assert_eq!(names, ["ref_clock_pad", "clock"]);
}

#[test]
fn strict_padframe_loading() {
    let dir = ip_dir("strict");
    let composer = ChipComposer::new(TemplateLoader::new().with_search_dir(&dir));
    let tp = Template::new(json!({
        "chip": "wolfe",
        "composer": { "padframe_tolerant": false },
        "padframe": { "content": "padframes/absent.json" }
    }));
    assert!(composer.compose(&tp).is_err());
}
