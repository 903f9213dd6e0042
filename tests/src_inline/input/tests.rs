use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use super::*;
use crate::error::CohortError;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

const HEADER: &str = "project,subject,condition,age,sex,treatment,response,sample,sample_type,time_from_treatment_start,b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte";

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_cohortstats_input_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = File::create(path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
}

#[test]
fn test_read_valid_rows() {
    let dir = make_temp_dir();
    let path = dir.join("cell-count.csv");
    write_file(
        &path,
        &format!(
            "{HEADER}\nprj1,sbj000,melanoma,57,M,miraclib,yes,s000,PBMC,0,36000,24000,42000,6000,12000\nprj1,sbj001,carcinoma,,F,none,,s001,WB,7.0,100,200,300,400,500\n"
        ),
    );

    let rows = read_cell_count_csv(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].subject, "sbj000");
    assert_eq!(rows[0].age, Some(57));
    assert_eq!(rows[0].sex, Some(Sex::M));
    assert_eq!(rows[0].response, Some(Response::Yes));
    assert_eq!(rows[0].counts, [36000, 24000, 42000, 6000, 12000]);
    assert_eq!(rows[1].age, None);
    assert_eq!(rows[1].response, None);
    assert_eq!(rows[1].visit_time, 7.0);
    assert_eq!(rows[1].line, 3);
}

#[test]
fn test_read_gzipped_input() {
    let dir = make_temp_dir();
    let path = dir.join("cell-count.csv.gz");
    let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    enc.write_all(
        format!("{HEADER}\nprj2,sbj9,melanoma,40,F,miraclib,no,s9,PBMC,0,1,2,3,4,5\n").as_bytes(),
    )
    .unwrap();
    enc.finish().unwrap();

    let rows = read_cell_count_csv(&path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].response, Some(Response::No));
}

#[test]
fn test_missing_columns_are_reported() {
    let dir = make_temp_dir();
    let path = dir.join("broken.csv");
    write_file(&path, "project,subject,sample\nprj1,sbj1,s1\n");

    let err = read_cell_count_csv(&path).unwrap_err();
    match err {
        CohortError::MissingInput(msg) => {
            assert!(msg.contains("monocyte"));
            assert!(msg.contains("time_from_treatment_start"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_negative_count_rejected_with_line() {
    let dir = make_temp_dir();
    let path = dir.join("neg.csv");
    write_file(
        &path,
        &format!("{HEADER}\nprj1,sbj1,melanoma,50,M,miraclib,yes,s1,PBMC,0,1,-2,3,4,5\n"),
    );

    match read_cell_count_csv(&path).unwrap_err() {
        CohortError::InvalidRow { line, reason } => {
            assert_eq!(line, 2);
            assert!(reason.contains("cd8_t_cell"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_bad_response_rejected() {
    let dir = make_temp_dir();
    let path = dir.join("resp.csv");
    write_file(
        &path,
        &format!("{HEADER}\nprj1,sbj1,melanoma,50,M,miraclib,partial,s1,PBMC,0,1,2,3,4,5\n"),
    );

    assert!(matches!(
        read_cell_count_csv(&path),
        Err(CohortError::InvalidRow { .. })
    ));
}

#[test]
fn test_missing_file() {
    let dir = make_temp_dir();
    assert!(matches!(
        read_cell_count_csv(&dir.join("absent.csv")),
        Err(CohortError::MissingInput(_))
    ));
}

#[test]
fn test_parse_integer_accepts_whole_floats() {
    assert_eq!(parse_integer("12"), Some(12));
    assert_eq!(parse_integer("12.0"), Some(12));
    assert_eq!(parse_integer("12.5"), None);
    assert_eq!(parse_integer("abc"), None);
}
