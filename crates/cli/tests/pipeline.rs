use shuffler_core::capacity::{DiskStatus, StaticDiskUsage};
use shuffler_core::config::ShuffleConfig;
use shuffler_core::pipeline::{self, RunOutcome, Runtime};
use shuffler_core::prompt::LinePrompt;
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::tempdir;

const PLENTY: DiskStatus = DiskStatus {
    total: 1 << 42,
    free: 1 << 41,
};

fn seed_dataset(data: &Path) {
    fs::create_dir_all(data.join(".hidden")).unwrap();
    fs::write(data.join("a.jpg"), b"0123456789").unwrap();
    fs::write(data.join(".hidden/b.jpg"), b"12345").unwrap();
    fs::write(data.join("skip.txt"), b"abc").unwrap();
}

fn run_with_answer(cfg: &ShuffleConfig, answer: &str) -> shuffler_core::Result<RunOutcome> {
    let mut prompt = LinePrompt::new(Cursor::new(answer.as_bytes().to_vec()), io::sink());
    pipeline::run(
        cfg,
        Runtime {
            disk: &StaticDiskUsage(PLENTY),
            confirm: &mut prompt,
            progress: &mut io::sink(),
        },
    )
}

#[test]
fn filtered_single_file_lands_as_zero() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    let out = temp.path().join("out");
    seed_dataset(&data);

    let cfg = ShuffleConfig {
        output_dir: out.clone(),
        data_dir: data.clone(),
        prefix: Some("a".into()),
        suffix: Some("jpg".into()),
        ..ShuffleConfig::default()
    };
    let outcome = run_with_answer(&cfg, "yes\n").unwrap();
    assert!(matches!(outcome, RunOutcome::Copied(_)));

    let names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["0.jpg".to_string()]);
    assert_eq!(fs::read(out.join("0.jpg")).unwrap(), b"0123456789");
}

#[test]
fn every_accepted_file_gets_a_unique_index() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    let out = temp.path().join("out");
    for i in 0..25 {
        let dir = data.join(format!("class{}", i % 3));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("img{i}.png")), format!("{i}")).unwrap();
    }
    fs::create_dir_all(data.join(".cache")).unwrap();
    fs::write(data.join(".cache/img99.png"), b"x").unwrap();

    let cfg = ShuffleConfig {
        output_dir: out.clone(),
        data_dir: data,
        ..ShuffleConfig::default()
    };
    let RunOutcome::Copied(summary) = run_with_answer(&cfg, "Y\n").unwrap() else {
        panic!("expected copy");
    };
    assert_eq!(summary.copy.files, 25);

    let mut stems: Vec<usize> = fs::read_dir(&out)
        .unwrap()
        .map(|e| {
            let name = e.unwrap().file_name().to_string_lossy().into_owned();
            assert!(name.ends_with(".png"));
            name.trim_end_matches(".png").parse().unwrap()
        })
        .collect();
    stems.sort_unstable();
    assert_eq!(stems, (0..25).collect::<Vec<_>>());
}

#[test]
fn manifest_lines_carry_label() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    let out = temp.path().join("out");
    let manifest = temp.path().join("train.txt");
    for name in ["x.jpg", "y.jpg", "z.jpg", "w.jpg"] {
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join(name), name).unwrap();
    }

    let cfg = ShuffleConfig {
        output_dir: out.clone(),
        data_dir: data,
        manifest: true,
        label: Some("cat".into()),
        manifest_file: Some(manifest.clone()),
        ..ShuffleConfig::default()
    };
    run_with_answer(&cfg, "YES\n").unwrap();

    let text = fs::read_to_string(&manifest).unwrap();
    assert_eq!(text.lines().count(), 4);
    for line in text.lines() {
        let (dest, label) = line.split_once(' ').unwrap();
        assert_eq!(label, "cat");
        assert!(Path::new(dest).starts_with(&out));
        assert!(Path::new(dest).is_file());
    }
}

#[test]
fn non_affirmative_answers_remove_output() {
    for answer in ["n\n", "NO\n", "", "sure\n"] {
        let temp = tempdir().unwrap();
        let data = temp.path().join("data");
        let out = temp.path().join("out");
        seed_dataset(&data);
        let cfg = ShuffleConfig {
            output_dir: out.clone(),
            data_dir: data,
            ..ShuffleConfig::default()
        };
        let outcome = run_with_answer(&cfg, answer).unwrap();
        assert!(matches!(outcome, RunOutcome::Declined { .. }), "{answer:?}");
        assert!(!out.exists(), "{answer:?}");
    }
}

#[test]
fn binary_copies_and_exits_zero_with_yes_flag() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    let out = temp.path().join("out");
    seed_dataset(&data);

    let status = Command::new(env!("CARGO_BIN_EXE_dataset-shuffler"))
        .current_dir(temp.path())
        .args(["-d", "data", "-o", "out", "-s", "jpg", "-y", "--min-free-gb", "0"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(0));
    assert_eq!(fs::read(out.join("0.jpg")).unwrap(), b"0123456789");
}

#[test]
fn binary_decline_exits_one_and_cleans_up() {
    let temp = tempdir().unwrap();
    seed_dataset(&temp.path().join("data"));

    let mut child = Command::new(env!("CARGO_BIN_EXE_dataset-shuffler"))
        .current_dir(temp.path())
        .args(["-d", "data", "-o", "out", "--min-free-gb", "0"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"n\n").unwrap();
    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(1));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn binary_rejects_manifest_without_label() {
    let temp = tempdir().unwrap();
    seed_dataset(&temp.path().join("data"));

    let status = Command::new(env!("CARGO_BIN_EXE_dataset-shuffler"))
        .current_dir(temp.path())
        .args(["-d", "data", "-o", "out", "-t", "-f", "list.txt", "-y"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn output_nested_in_data_dir_is_not_read_back() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    let out = data.join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(data.join("a.jpg"), b"AAAA").unwrap();
    fs::write(out.join("0.jpg"), b"BBBB").unwrap();

    let cfg = ShuffleConfig {
        output_dir: out.clone(),
        data_dir: data,
        seed: Some(1),
        ..ShuffleConfig::default()
    };
    let RunOutcome::Copied(summary) = run_with_answer(&cfg, "y\n").unwrap() else {
        panic!("expected copy");
    };
    assert_eq!(summary.copy.files, 1);

    let mut bodies: Vec<Vec<u8>> = fs::read_dir(&out)
        .unwrap()
        .map(|e| fs::read(e.unwrap().path()).unwrap())
        .collect();
    bodies.sort();
    assert_eq!(bodies, vec![b"AAAA".to_vec()]);
}

#[test]
fn non_utf8_answer_declines_and_cleans_up() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    let out = temp.path().join("out");
    seed_dataset(&data);
    let cfg = ShuffleConfig {
        output_dir: out.clone(),
        data_dir: data,
        ..ShuffleConfig::default()
    };
    let mut prompt = LinePrompt::new(Cursor::new(b"\xff\n".to_vec()), io::sink());
    let outcome = pipeline::run(
        &cfg,
        Runtime {
            disk: &StaticDiskUsage(PLENTY),
            confirm: &mut prompt,
            progress: &mut io::sink(),
        },
    )
    .unwrap();
    assert!(matches!(outcome, RunOutcome::Declined { .. }));
    assert!(!out.exists());
}

#[test]
fn binary_silent_stdin_times_out_as_decline() {
    let temp = tempdir().unwrap();
    seed_dataset(&temp.path().join("data"));

    let mut child = Command::new(env!("CARGO_BIN_EXE_dataset-shuffler"))
        .current_dir(temp.path())
        .args(["-d", "data", "-o", "out", "--timeout", "1", "--min-free-gb", "0"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    // Held open and never written, so only the timeout can end the prompt.
    let stdin = child.stdin.take();
    let status = child.wait().unwrap();
    drop(stdin);
    assert_eq!(status.code(), Some(1));
    assert!(!temp.path().join("out").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn binary_unwritable_summary_exits_with_io_code() {
    let temp = tempdir().unwrap();
    seed_dataset(&temp.path().join("data"));

    let status = Command::new(env!("CARGO_BIN_EXE_dataset-shuffler"))
        .current_dir(temp.path())
        .args(["-d", "data", "-o", "out", "-y", "--min-free-gb", "0"])
        .stdin(Stdio::null())
        .stdout(fs::File::create("/dev/full").unwrap())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(5));
    assert!(temp.path().join("out").is_dir());
}
