use reitmap_recon::config::ReconConfig;
use reitmap_recon::engine::{overlay, run};
use reitmap_recon::geo::Placemark;
use reitmap_recon::model::{Origin, ReconInput, ReconResult};

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

/// Inspection row with installation in E, work order in H, device in AP.
fn inspection_row(installation: &str, work_order: &str, device: &str) -> Vec<String> {
    let mut r = vec![String::new(); 42];
    r[4] = installation.into();
    r[7] = work_order.into();
    r[41] = device.into();
    r
}

fn sample_input() -> ReconInput {
    ReconInput {
        inspection: vec![
            inspection_row("INSTALACAO_NOVA", "NUMERO_OT", "DISPOSITIVO"),
            inspection_row("", "OT100", "X1"),
            inspection_row("INST-2", "OT200", "QXB0145"),
            inspection_row("", "", "  "),
            inspection_row("INST-4", "", "R <&> \"9\""),
        ],
        reiterated: vec![
            row(&["ELEMENTO", "DATA", "ALIMENTADOR"]),
            row(&["x-1", "01/02", "PF-A"]),
            row(&["PF-7", "02/02", "QXD01P2"]),
            row(&["PF-7", "03/02", "QXD01P2"]),
            row(&["ZZZ1", "04/02", "ZZZ999"]),
        ],
    }
}

fn run_default(input: &ReconInput) -> ReconResult {
    run(&ReconConfig::default(), input).unwrap()
}

// -------------------------------------------------------------------------
// Reconciliation
// -------------------------------------------------------------------------

#[test]
fn shared_single_row_lists_merge_to_nothing() {
    let input = ReconInput {
        inspection: vec![inspection_row("", "", "DISPOSITIVO"), {
            let mut r = row(&["", "", "", "", "X1", "", "", "OT100"]);
            r.resize(42, String::new());
            r[41] = "X1".into();
            r
        }],
        reiterated: vec![row(&["ELEMENTO", "", "ALIMENTADOR"]), row(&["X1", "", "PF-A"])],
    };
    let result = run_default(&input);
    assert!(result.records.is_empty());
    assert_eq!(result.summary.removed_keys, 1);
}

#[test]
fn sample_merge_order_and_annotation() {
    let result = run_default(&sample_input());

    let keys: Vec<(&str, Origin)> = result.records.iter().map(|r| (r.key.as_str(), r.origin)).collect();
    assert_eq!(
        keys,
        vec![
            ("PF7", Origin::Reiterated),
            ("PF7", Origin::Reiterated),
            ("ZZZ1", Origin::Reiterated),
            ("QXB0145", Origin::Inspection),
            ("R9", Origin::Inspection),
        ]
    );

    let s = &result.summary;
    assert_eq!(s.inspection_read, 3);
    assert_eq!(s.reiterated_read, 4);
    assert_eq!(s.removed_keys, 1);
    assert_eq!(s.merged, 5);
    assert_eq!(s.merged_reiterated, 3);
    assert_eq!(s.merged_inspection, 2);

    let rows = result.export_rows();
    assert_eq!(rows[0].tipo, "REITERADA");
    assert_eq!(rows[0].alimentador, "QXD01P2");
    assert_eq!(rows[3].instalacao_nova, "INST-2");
    assert_eq!(rows[3].numero_ot, "OT200");
    assert!(rows[0].diferenca.contains("REITERADAS"));
    assert!(rows[3].diferenca.contains("INSPEÇÃO"));
}

#[test]
fn custom_columns_come_from_config() {
    let config = ReconConfig::from_toml(
        r#"
[columns.inspection]
device = "A"
installation = "B"
work_order = "C"

[columns.reiterated]
element = "B"
feeder = "A"
"#,
    )
    .unwrap();
    let input = ReconInput {
        inspection: vec![row(&["DISP", "INST", "OT"]), row(&["K-1", "I1", "O1"])],
        reiterated: vec![row(&["ALIM", "ELEM"]), row(&["QXD01P1", "K-2"])],
    };
    let result = run(&config, &input).unwrap();
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].device_label, "K-2");
    assert_eq!(result.records[0].feeder, "QXD01P1");
    assert_eq!(result.records[1].installation, "I1");
}

// -------------------------------------------------------------------------
// Overlay
// -------------------------------------------------------------------------

fn sample_placemarks() -> Vec<Placemark> {
    vec![
        Placemark::new(Some("PF-7"), "-38.9,-4.9,0"),
        Placemark::new(Some("pf 7"), "10,10,0"),
        Placemark::new(Some("QXB0145"), "-39.0,-5.0,0"),
        Placemark::new(Some("R9"), "-38.1,-4.1"),
        Placemark::new(Some("X1"), "-37,-3,0"),
        Placemark::new(Some("ZZZ1"), "not,numbers"),
    ]
}

#[test]
fn overlay_groups_by_category_then_origin() {
    let config = ReconConfig::default();
    let result = run(&config, &sample_input()).unwrap();
    let report = overlay(&config, &result.records, &sample_placemarks());

    assert_eq!(report.matched, 4);
    assert_eq!(report.unmatched, 1);

    let doc = &report.document;
    let names: Vec<&str> = doc.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Quixadá", "Outros"]);

    let quixada = &doc.groups[0];
    let labels: Vec<&str> = quixada.subgroups.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Reiteradas", "Inspeção"]);
    assert_eq!(quixada.subgroups[0].markers.len(), 2);
    assert_eq!(quixada.subgroups[0].markers[0].point.longitude, -38.9);

    assert_eq!(report.category_counts.get("Quixadá"), Some(&3));
    assert_eq!(report.category_counts.get("Outros"), Some(&1));
    assert_eq!(doc.marker_count(), 4);
}

#[test]
fn overlay_markup_escapes_free_text() {
    let config = ReconConfig::default();
    let result = run(&config, &sample_input()).unwrap();
    let report = overlay(&config, &result.records, &sample_placemarks());
    let kml = report.document.to_kml();

    assert!(kml.contains("<name>R &lt;&amp;&gt; &quot;9&quot;</name>"));
    assert!(!kml.contains("R <&>"));
    assert!(kml.contains(&format!("<name>{}</name>", config.output.document_name)));
}

#[test]
fn strict_coordinate_policy_drops_zero_points() {
    let config = ReconConfig::from_toml("[geo]\nreject_zero = true\n").unwrap();
    let result = run(&config, &sample_input()).unwrap();
    let placemarks = vec![
        Placemark::new(Some("PF-7"), "0,-4.9,0"),
        Placemark::new(Some("QXB0145"), "-39.0,-5.0,0"),
    ];
    let report = overlay(&config, &result.records, &placemarks);
    assert_eq!(report.matched, 1);

    let lenient = overlay(&ReconConfig::default(), &result.records, &placemarks);
    assert_eq!(lenient.matched, 3);
}
