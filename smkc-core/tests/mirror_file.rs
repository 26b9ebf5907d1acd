use rand::{rngs::StdRng, Rng, SeedableRng};
use smkc_core::map::{LINES_PER_ROW, MAP_DATA_LINES, TILES_PER_ROW};
use smkc_core::reassemble::split_lines;
use smkc_core::{
    derive_output_path, layout_path, mirror_document, run, MirrorError, MirrorSettings,
};
use std::fs;
use std::path::Path;

const HEADER: &str = "#VERSION 1\n#GAME SUPER MARIO KART\n#THEME 2\n#MAP\n";
const FOOTER: &str = "#AREA\n#0000000000\n#OBJECTS\n#01 10 20\n";

fn random_map_lines(seed: u64, count: usize) -> Vec<String> {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let payload: String = (0..64)
                .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
                .collect();
            format!("#{payload}\n")
        })
        .collect()
}

fn track(map: &[String]) -> String {
    format!("{HEADER}{}{FOOTER}", map.concat())
}

fn row_tiles(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| {
            let payload = &line.trim_end()[1..];
            (0..payload.len())
                .step_by(2)
                .map(move |i| payload[i..i + 2].to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn settings(input: &Path) -> MirrorSettings {
    MirrorSettings {
        input_path: input.to_path_buf(),
        output_path: None,
        dry_run: false,
        debug: false,
    }
}

#[test]
fn mirroring_twice_restores_the_map() {
    let text = track(&random_map_lines(0x5eed, MAP_DATA_LINES));
    let once = mirror_document(&text).unwrap();
    assert_ne!(once.text, text);
    let twice = mirror_document(&once.text).unwrap();
    assert_eq!(twice.text, text);
}

#[test]
fn every_row_is_reversed_in_place() {
    let text = track(&random_map_lines(42, MAP_DATA_LINES));
    let out = mirror_document(&text).unwrap();

    let before = split_lines(&text);
    let after = split_lines(&out.text);
    let start = out.section_start;

    for row in 0..MAP_DATA_LINES / LINES_PER_ROW {
        let at = start + row * LINES_PER_ROW;
        let input = row_tiles(&before[at..at + LINES_PER_ROW]);
        let output = row_tiles(&after[at..at + LINES_PER_ROW]);
        assert_eq!(input.len(), TILES_PER_ROW);
        for i in 0..TILES_PER_ROW {
            assert_eq!(output[i], input[TILES_PER_ROW - 1 - i], "row {row} tile {i}");
        }
    }
}

#[test]
fn lines_outside_the_map_pass_through() {
    let text = track(&random_map_lines(7, MAP_DATA_LINES));
    let out = mirror_document(&text).unwrap();

    let before = split_lines(&text);
    let after = split_lines(&out.text);
    assert_eq!(before.len(), after.len());

    let start = out.section_start;
    let resume = start + MAP_DATA_LINES;
    assert_eq!(before[..start], after[..start]);
    assert_eq!(before[resume..], after[resume..]);
}

#[test]
fn crlf_files_stay_crlf() {
    let map: Vec<String> = random_map_lines(9, MAP_DATA_LINES)
        .into_iter()
        .map(|l| l.replace('\n', "\r\n"))
        .collect();
    let text = format!("#NAME x\r\n#MAP\r\n{}#AREA\r\n", map.concat());
    let out = mirror_document(&text).unwrap();
    assert_eq!(out.text.len(), text.len());
    assert!(split_lines(&out.text).iter().all(|l| l.ends_with("\r\n")));
}

#[test]
fn cr_only_files_are_mirrored() {
    let map = random_map_lines(21, MAP_DATA_LINES).concat().replace('\n', "\r");
    let text = format!("#NAME x\r#MAP\r{map}#AREA\r");
    let out = mirror_document(&text).unwrap();
    assert_eq!(out.section_start, 2);
    assert_eq!(out.total_lines, MAP_DATA_LINES + 3);
    assert_eq!(out.text.len(), text.len());
    assert!(!out.text.contains('\n'));

    let twice = mirror_document(&out.text).unwrap();
    assert_eq!(twice.text, text);
}

#[test]
fn run_writes_reversed_file_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("donut-plains.smkc");
    let text = track(&random_map_lines(1, MAP_DATA_LINES));
    fs::write(&input, &text).unwrap();

    let report = run(settings(&input)).unwrap();

    let expected_out = dir.path().join("donut-plains-reversed.smkc");
    assert_eq!(report.output_path, expected_out);
    assert_eq!(report.section_start_line, 5);
    assert_eq!(report.data_lines, MAP_DATA_LINES);
    assert_eq!(report.rows, 128);
    assert_eq!(report.total_lines, split_lines(&text).len());
    assert!(report.written);
    assert_eq!(report.layout_path, None);
    assert!(!layout_path(&expected_out).exists());

    let written = fs::read_to_string(&expected_out).unwrap();
    assert_eq!(written, mirror_document(&text).unwrap().text);
    assert_eq!(fs::read_to_string(&input).unwrap(), text);
}

#[test]
fn malformed_counts_write_nothing() {
    for count in [MAP_DATA_LINES - 1, MAP_DATA_LINES + 1] {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ghost-valley.smkc");
        fs::write(&input, track(&random_map_lines(3, count))).unwrap();

        let err = run(settings(&input)).unwrap_err();
        assert!(err.is_structural());
        assert!(matches!(err, MirrorError::CountMismatch { found, .. } if found == count));
        assert!(!derive_output_path(&input).exists());
    }
}

#[test]
fn missing_input_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("nowhere.smkc");
    let err = run(settings(&input)).unwrap_err();
    assert!(matches!(err, MirrorError::NotFound { .. }));
    assert!(!err.is_structural());

    let err = run(settings(dir.path())).unwrap_err();
    assert!(matches!(err, MirrorError::NotFound { .. }));
}

#[test]
fn dry_run_only_reports() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("koopa-beach.smkc");
    fs::write(&input, track(&random_map_lines(11, MAP_DATA_LINES))).unwrap();

    let report = run(MirrorSettings {
        dry_run: true,
        ..settings(&input)
    })
    .unwrap();

    assert!(!report.written);
    assert!(!report.output_path.exists());
}

#[test]
fn explicit_output_path_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.smkc");
    let output = dir.path().join("mirrored.txt");
    fs::write(&input, track(&random_map_lines(5, MAP_DATA_LINES))).unwrap();

    let report = run(MirrorSettings {
        output_path: Some(output.clone()),
        ..settings(&input)
    })
    .unwrap();

    assert_eq!(report.output_path, output);
    assert!(output.exists());
    assert!(!derive_output_path(&input).exists());
}

#[test]
fn refuses_to_overwrite_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("rainbow-road.smkc");
    let text = track(&random_map_lines(13, MAP_DATA_LINES));
    fs::write(&input, &text).unwrap();

    let err = run(MirrorSettings {
        output_path: Some(input.clone()),
        ..settings(&input)
    })
    .unwrap_err();

    assert!(matches!(err, MirrorError::Config(_)));
    assert_eq!(fs::read_to_string(&input).unwrap(), text);
}

#[test]
fn debug_run_writes_map_layout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("vanilla-lake.smkc");
    fs::write(&input, track(&random_map_lines(17, MAP_DATA_LINES))).unwrap();

    let report = run(MirrorSettings {
        debug: true,
        ..settings(&input)
    })
    .unwrap();

    let expected = layout_path(&report.output_path);
    assert_eq!(report.layout_path.as_ref(), Some(&expected));
    let layout = fs::read_to_string(&expected).unwrap();
    assert!(layout.starts_with("#MAP marker: line 4\n"));
    assert!(layout.contains("data lines: 512 (expected 512)\n"));
    assert!(layout.contains("\nrow 127: "));
}

#[test]
fn debug_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("choco-island.smkc");
    fs::write(&input, track(&random_map_lines(19, MAP_DATA_LINES))).unwrap();

    let report = run(MirrorSettings {
        debug: true,
        dry_run: true,
        ..settings(&input)
    })
    .unwrap();

    assert_eq!(report.layout_path, None);
    assert!(!layout_path(&report.output_path).exists());
    assert!(!report.output_path.exists());
}
