//! End-to-end tests for the conversion binaries

use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};
use tempfile::TempDir;

const DTM2TXT: &str = env!("CARGO_BIN_EXE_dtm2txt");
const TXT2DTM: &str = env!("CARGO_BIN_EXE_txt2dtm");
const DTM_TOOLS: &str = env!("CARGO_BIN_EXE_dtm-tools");

const SAMPLE_DTM: &[u8] = include_bytes!("../../dtm/test/sample.dtm");
const SAMPLE_TXT: &str = include_str!("../../dtm/test/sample.txt");

fn run<I, S>(binary: &str, args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(binary)
        .args(args)
        .output()
        .expect("could not run binary")
}

fn write(dir: &TempDir, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("could not write input");
    path
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_failed(output: &Output, output_path: &Path) {
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(output).contains("ERROR"), "{}", stderr(output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("USAGE"));
    assert!(!output_path.exists());
}

#[test]
fn dtm_to_text() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "sample.dtm", SAMPLE_DTM);
    let output_path = dir.path().join("sample.txt");

    let output = run(DTM2TXT, [&input, &output_path]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(fs::read_to_string(&output_path).unwrap(), SAMPLE_TXT);
}

#[test]
fn text_to_dtm() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "sample.txt", SAMPLE_TXT);
    let output_path = dir.path().join("sample.dtm");

    let output = run(TXT2DTM, [&input, &output_path]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(fs::read(&output_path).unwrap(), SAMPLE_DTM);
}

#[test]
fn edited_text_to_dtm() {
    let dir = TempDir::new().unwrap();
    let text = format!("{SAMPLE_TXT}# appended by hand\n12: A\n3: B\n");
    let input = write(&dir, "edited.txt", text);
    let output_path = dir.path().join("edited.dtm");

    let output = run(TXT2DTM, [&input, &output_path]);
    assert!(output.status.success(), "{}", stderr(&output));

    let bytes = fs::read(&output_path).unwrap();
    assert_eq!(bytes.len(), 256 + 13 * 8);
    assert_eq!(&bytes[..SAMPLE_DTM.len()][256..], &SAMPLE_DTM[256..]);
    assert_eq!(bytes[0x15], 13, "input count is raised to cover the last frame");
    assert_eq!(&bytes[256 + 12 * 8..], &[0x02, 0, 0, 0, 128, 128, 128, 128]);
}

#[test]
fn subcommands() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "sample.dtm", SAMPLE_DTM);
    let text = dir.path().join("sample.txt");
    let binary = dir.path().join("again.dtm");

    let output = run(DTM_TOOLS, [Path::new("to-text"), input.as_path(), text.as_path()]);
    assert!(output.status.success(), "{}", stderr(&output));

    let output = run(DTM_TOOLS, [Path::new("to-dtm"), text.as_path(), binary.as_path()]);
    assert!(output.status.success(), "{}", stderr(&output));

    assert_eq!(fs::read(&binary).unwrap(), SAMPLE_DTM);
}

#[test]
fn bad_signature() {
    let dir = TempDir::new().unwrap();
    let mut bytes = SAMPLE_DTM.to_vec();
    bytes[..4].copy_from_slice(b"NOPE");
    let input = write(&dir, "bad.dtm", bytes);
    let output_path = dir.path().join("bad.txt");

    let output = run(DTM2TXT, [&input, &output_path]);

    assert_failed(&output, &output_path);
    assert!(stderr(&output).contains("Not a DTM file"));
}

#[test]
fn wii_recording() {
    let dir = TempDir::new().unwrap();
    let mut bytes = SAMPLE_DTM.to_vec();
    bytes[0x0A] = 1;
    let input = write(&dir, "wii.dtm", bytes);
    let output_path = dir.path().join("wii.txt");

    let output = run(DTM2TXT, [&input, &output_path]);

    assert_failed(&output, &output_path);
    assert!(stderr(&output).contains("Wii not supported"));
}

#[test]
fn multiple_controllers() {
    let dir = TempDir::new().unwrap();
    let mut bytes = SAMPLE_DTM.to_vec();
    bytes[0x0B] = 2;
    let input = write(&dir, "multi.dtm", bytes);
    let output_path = dir.path().join("multi.txt");

    let output = run(DTM2TXT, [&input, &output_path]);

    assert_failed(&output, &output_path);
    assert!(stderr(&output).contains("Only one controller supported"));
}

#[test]
fn missing_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.dtm");
    let output_path = dir.path().join("missing.txt");

    let output = run(DTM2TXT, [&input, &output_path]);

    assert_failed(&output, &output_path);
}

#[test]
fn malformed_text() {
    let dir = TempDir::new().unwrap();
    let text = format!("{SAMPLE_TXT}9: AnalogX:left\n");
    let input = write(&dir, "broken.txt", text);
    let output_path = dir.path().join("broken.dtm");

    let output = run(TXT2DTM, [&input, &output_path]);

    assert_failed(&output, &output_path);
    assert!(stderr(&output).contains("Line 44"));
}

#[test]
fn too_many_frames() {
    let dir = TempDir::new().unwrap();
    let text = format!("{SAMPLE_TXT}{}: A\n", u64::MAX);
    let input = write(&dir, "long.txt", text);
    let output_path = dir.path().join("long.dtm");

    let output = run(TXT2DTM, [&input, &output_path]);

    assert_failed(&output, &output_path);
    assert!(stderr(&output).contains("too long"), "{}", stderr(&output));
}

#[test]
fn wrong_argument_count() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("c");

    let output = run(DTM2TXT, ["only-one.dtm"]);
    assert_failed(&output, &output_path);
    assert_eq!(stderr(&output).lines().count(), 1, "{}", stderr(&output));
    assert!(stderr(&output).starts_with("ERROR: "));

    let output = run(TXT2DTM, [Path::new("a"), Path::new("b"), output_path.as_path()]);
    assert_failed(&output, &output_path);
    assert_eq!(stderr(&output).lines().count(), 1, "{}", stderr(&output));
}

#[test]
fn help() {
    let output = run(DTM2TXT, ["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("<OUTPUT>"));
}
