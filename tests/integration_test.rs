use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use gpslog2gpx::distance::geodesic_distance_km;
use gpslog2gpx::gpx_reader::extract_track_coordinates;
use gpslog2gpx::pipeline::{convert_log, write_document};
use gpslog2gpx::serializer::GpxTemplate;
use gpslog2gpx::{ConvertOptions, FixedClock, GpsLogError, parse_log, process_log, run};
use tempdir::TempDir;

fn fixture_path(path: &str) -> PathBuf {
    Path::new("tests/fixtures").join(path)
}

fn load_fixture(path: &str) -> String {
    std::fs::read_to_string(fixture_path(path)).unwrap()
}

fn convert(log: &str) -> gpslog2gpx::Conversion {
    convert_log(log, &GpxTemplate::embedded(), &ConvertOptions::default()).unwrap()
}

fn clock() -> FixedClock {
    FixedClock(
        NaiveDate::from_ymd_opt(2023, 4, 1)
            .unwrap()
            .and_hms_opt(18, 30, 5)
            .unwrap(),
    )
}

fn opts_in(dir: &Path) -> ConvertOptions {
    ConvertOptions {
        output_dir: Some(dir.to_path_buf()),
        ..Default::default()
    }
}

fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

// ---- basic/ ----

#[test]
fn test_two_points_end_to_end() {
    let conv = convert(&load_fixture("basic/two_points.TXT"));

    assert_eq!(conv.name, "230401120000");
    assert_eq!(conv.document.matches("<trkpt ").count(), 2);
    let first = conv
        .document
        .find(r#"<trkpt lat="10.0" lon="10.0"><ele>30</ele><time>230401T120000Z</time></trkpt>"#)
        .unwrap();
    let second = conv
        .document
        .find(r#"<trkpt lat="10.01" lon="10.0"><ele>60</ele><time>230401T120005Z</time></trkpt>"#)
        .unwrap();
    assert!(first < second);

    let expected = geodesic_distance_km((10.0, 10.0), (10.01, 10.0));
    assert!((conv.distance_km - expected).abs() < 1e-12);
    assert_eq!(format!("{:.2}", conv.distance_km), "1.11");
}

#[test]
fn test_single_point_has_zero_distance() {
    let conv = convert(&load_fixture("basic/single_point.TXT"));
    assert_eq!(conv.distance_km, 0.0);
    assert_eq!(conv.name, "240715093012");
    assert!(conv.document.contains("<ele>409</ele>"));
}

#[test]
fn test_shuffled_keys_and_negative_altitude() {
    let log = parse_log(&load_fixture("basic/shuffled_keys.TXT")).unwrap();
    assert_eq!(log.waypoints.len(), 2);
    assert_eq!(log.waypoints[0].latitude(), "37.774929");
    assert_eq!(log.waypoints[0].elevation_meters(), -30);
    assert_eq!(log.waypoints[1].elevation_meters(), -15);
    assert_eq!(log.document_name, "230402101500");
}

#[test]
fn test_drive_distance_is_sum_of_legs() {
    let text = load_fixture("basic/drive.TXT");
    let log = parse_log(&text).unwrap();
    assert_eq!(log.waypoints.len(), 6);

    let coords: Vec<(f64, f64)> = log
        .waypoints
        .iter()
        .map(|w| w.coordinates().unwrap())
        .collect();
    let expected: f64 = coords
        .windows(2)
        .map(|p| geodesic_distance_km(p[0], p[1]))
        .sum();

    let conv = convert(&text);
    assert!((conv.distance_km - expected).abs() < 1e-9);
    // about half a kilometer through central Berlin
    assert!(conv.distance_km > 0.4 && conv.distance_km < 0.8, "got {}", conv.distance_km);
}

#[test]
fn test_document_reads_back_to_same_coordinates() {
    let text = load_fixture("basic/drive.TXT");
    let log = parse_log(&text).unwrap();
    let conv = convert(&text);

    let coords = extract_track_coordinates(&conv.document).unwrap();
    assert_eq!(coords.len(), log.waypoints.len());
    for (read, wpt) in coords.iter().zip(&log.waypoints) {
        let (lat, lon) = wpt.coordinates().unwrap();
        assert!((read.0 - lat).abs() < 1e-10);
        assert!((read.1 - lon).abs() < 1e-10);
    }
}

#[test]
fn test_bare_carriage_return_lines() {
    let conv =
        process_log(&fixture_path("basic/cr_lines.TXT"), &ConvertOptions::default()).unwrap();
    let expected = convert(&load_fixture("basic/two_points.TXT"));
    assert_eq!(conv, expected);
}

// ---- errors/ ----

#[test]
fn test_out_of_range_latitude() {
    let err = process_log(&fixture_path("errors/bad_latitude.TXT"), &ConvertOptions::default())
        .unwrap_err();
    match &err {
        GpsLogError::MalformedField { field, value } => {
            assert_eq!(*field, "lat");
            assert_eq!(value, "91.0");
        }
        other => panic!("Expected MalformedField, got {other:?}"),
    }
    assert!(err.is_incompatible_input());
}

#[test]
fn test_log_not_utf8() {
    let tmp = TempDir::new("gpslog2gpx-encoding").unwrap();
    let input = tmp.path().join("LOG02.TXT");
    std::fs::write(&input, b"lat>10.0,lon>\xff\xfe10.0\n").unwrap();

    let err = process_log(&input, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, GpsLogError::InvalidEncoding { .. }));
    assert!(err.is_incompatible_input());
}

#[test]
fn test_empty_log() {
    let err =
        process_log(&fixture_path("errors/empty.TXT"), &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, GpsLogError::EmptyLog));
}

#[test]
fn test_missing_field() {
    let err = process_log(&fixture_path("errors/missing_field.TXT"), &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, GpsLogError::MissingField { line: 1, .. }));
}

#[test]
fn test_malformed_segment() {
    let err = process_log(
        &fixture_path("errors/malformed_segment.TXT"),
        &ConvertOptions::default(),
    )
    .unwrap_err();
    match err {
        GpsLogError::MalformedLine { line, segment } => {
            assert_eq!(line, 2);
            assert_eq!(segment, "bogus");
        }
        other => panic!("Expected MalformedLine, got {other:?}"),
    }
}

#[test]
fn test_blank_line() {
    let err = process_log(&fixture_path("errors/blank_line.TXT"), &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, GpsLogError::MalformedLine { line: 2, .. }));
}

#[test]
fn test_bad_altitude() {
    let err = process_log(&fixture_path("errors/bad_altitude.TXT"), &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, GpsLogError::MalformedField { field: "alti", .. }));
    assert!(err.is_incompatible_input());
}

#[test]
fn test_missing_input_file() {
    let err = process_log(Path::new("tests/fixtures/nope.TXT"), &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, GpsLogError::Io { .. }));
}

#[test]
fn test_missing_template() {
    let opts = ConvertOptions {
        template_path: Some(PathBuf::from("tests/fixtures/no_such_template")),
        ..Default::default()
    };
    let err = process_log(&fixture_path("basic/two_points.TXT"), &opts).unwrap_err();
    assert!(matches!(err, GpsLogError::TemplateUnavailable { .. }));
    assert!(!err.is_incompatible_input());
}

// ---- output files ----

#[test]
fn test_run_writes_timestamped_document() {
    let tmp = TempDir::new("gpslog2gpx-run").unwrap();
    let output = run(
        &fixture_path("basic/two_points.TXT"),
        &opts_in(tmp.path()),
        &clock(),
    )
    .unwrap();

    assert_eq!(
        output.gpx_path,
        tmp.path().join("230401_183005-two_points.gpx")
    );
    assert!(output.map.is_none());
    let written = std::fs::read_to_string(&output.gpx_path).unwrap();
    assert_eq!(written, output.conversion.document);
    assert_eq!(dir_entries(tmp.path()).len(), 1);
}

#[test]
fn test_run_with_map() {
    let tmp = TempDir::new("gpslog2gpx-map").unwrap();
    let opts = ConvertOptions {
        generate_map: true,
        ..opts_in(tmp.path())
    };
    let output = run(&fixture_path("basic/drive.TXT"), &opts, &clock()).unwrap();

    let map_path = output.map.unwrap().unwrap();
    assert_eq!(map_path, tmp.path().join("230401_183005-drive.html"));
    let html = std::fs::read_to_string(map_path).unwrap();
    assert!(html.contains("L.geoJSON("));
    assert!(html.contains("13.404954"));
}

#[test]
fn test_failed_parse_writes_nothing() {
    let tmp = TempDir::new("gpslog2gpx-fail").unwrap();
    let err = run(
        &fixture_path("errors/malformed_segment.TXT"),
        &opts_in(tmp.path()),
        &clock(),
    )
    .unwrap_err();
    assert!(err.is_incompatible_input());
    assert!(dir_entries(tmp.path()).is_empty());
}

#[test]
fn test_map_failure_keeps_document() {
    let tmp = TempDir::new("gpslog2gpx-map-fail").unwrap();
    let template = tmp.path().join("no_track_template");
    std::fs::write(&template, "<gpx><metadata><name>{name}</name></metadata></gpx>").unwrap();
    let out_dir = tmp.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let opts = ConvertOptions {
        generate_map: true,
        template_path: Some(template),
        ..opts_in(&out_dir)
    };
    let output = run(&fixture_path("basic/two_points.TXT"), &opts, &clock()).unwrap();

    assert!(matches!(output.map, Some(Err(GpsLogError::EmptyTrack))));
    assert!(output.gpx_path.is_file());
    assert_eq!(output.conversion.name, "230401120000");
    assert!(output.conversion.distance_km > 1.0);
    assert_eq!(dir_entries(&out_dir), vec![output.gpx_path.clone()]);
}

#[test]
fn test_custom_template() {
    let tmp = TempDir::new("gpslog2gpx-template").unwrap();
    let template = tmp.path().join("gpx_template");
    std::fs::write(&template, "<gpx><!-- {time} -->{name}|{trackpoints}</gpx>").unwrap();

    let opts = ConvertOptions {
        template_path: Some(template),
        ..Default::default()
    };
    let conv = process_log(&fixture_path("basic/single_point.TXT"), &opts).unwrap();
    assert_eq!(
        conv.document,
        r#"<gpx><!-- 240715093012 -->240715093012|<trkpt lat="47.376887" lon="8.541694"><ele>409</ele><time>240715T093012Z</time></trkpt></gpx>"#
    );
}

#[test]
fn test_write_document_to_missing_dir() {
    let err = write_document(Path::new("tests/fixtures/no/such/dir"), "x", "<gpx/>").unwrap_err();
    assert!(matches!(err, GpsLogError::Io { .. }));
}
