use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const SAM: &str = "I am Sam. Sam I am. I do not like this Sam I am.\n";

// Compress then expand through the CLI and compare with the original.
fn round_trip_test(dat: &[u8],kind: &str) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("original");
    let cmp_path = temp_dir.path().join("compressed");
    let out_path = temp_dir.path().join("expanded");
    std::fs::write(&in_path,dat)?;
    Command::cargo_bin("treehuff")?
        .arg("compress")
        .arg("-s").arg(kind)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("compressed"));
    Command::cargo_bin("treehuff")?
        .arg("expand")
        .arg("-s").arg(kind)
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(out_path)?,dat.to_vec());
    Ok(())
}

#[test]
fn text_round_trip() -> STDRESULT {
    round_trip_test(SAM.as_bytes(),"char")?;
    round_trip_test("añ€ añ€ ñ".as_bytes(),"char")?;
    round_trip_test("aaaa".as_bytes(),"char")
}

#[test]
fn binary_round_trip() -> STDRESULT {
    let dat: Vec<u8> = (0..=255).chain([0,0,0,7,7]).collect();
    round_trip_test(&dat,"byte")
}

#[test]
fn compressed_layout() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("original");
    let cmp_path = temp_dir.path().join("compressed");
    std::fs::write(&in_path,"aaabbc")?;
    Command::cargo_bin("treehuff")?
        .arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success();
    let expected = [
        vec![6,0,0,0],
        hex::decode("8001618001630162")?,
        "000111110".as_bytes().to_vec()
    ].concat();
    assert_eq!(std::fs::read(cmp_path)?,expected);
    Ok(())
}

#[test]
fn stats_report() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("original");
    std::fs::write(&in_path,"aaabbc")?;
    Command::cargo_bin("treehuff")?
        .arg("stats")
        .arg("-i").arg(&in_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("48 bits to 9 bits (81.25%)"));
    Ok(())
}

#[test]
fn table_listing() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("original");
    std::fs::write(&in_path,"aaabbc")?;
    Command::cargo_bin("treehuff")?
        .arg("table")
        .arg("-i").arg(&in_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("'a' 0"))
        .stdout(predicate::str::contains("'c' 10"))
        .stdout(predicate::str::contains("header: 8001618001630162"));
    Ok(())
}

#[test]
fn corrupt_input_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("compressed");
    let out_path = temp_dir.path().join("expanded");
    // count of 6, but the header stops inside a leaf
    std::fs::write(&in_path,[6,0,0,0,0x80,0x01,0x61,0x05,0x62])?;
    Command::cargo_bin("treehuff")?
        .arg("expand")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("MalformedHeader"));
    Ok(())
}

#[test]
fn help_says_symbol_kind_must_match() -> STDRESULT {
    Command::cargo_bin("treehuff")?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("given the same `-s`"));
    Ok(())
}
