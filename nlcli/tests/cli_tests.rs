use assert_cmd::Command;
use std::fs;
use std::path::Path;

const PANGRAM: &str = "The quick brown fox jumps over the lazy dog.\n";

/// Tiny WordNet fixture: enough headwords that every group has room to
/// permute, plus empty exception/frequency files.
fn write_wordnet(dir: &Path) {
    fs::write(
        dir.join("index.noun"),
        "antelope n 1\ncat n 1\ncow n 1\ndog n 1\nelephant n 1\nfox n 1\n\
         hen n 1\nostrich n 1\nowl n 1\npig n 1\n",
    )
    .unwrap();
    fs::write(dir.join("index.verb"), "jump v 1\nlook v 1\ntalk v 1\nwalk v 1\n").unwrap();
    fs::write(dir.join("index.adj"), "brown a 1\nlazy a 1\nquick a 1\nslow a 1\n").unwrap();
    fs::write(dir.join("index.adv"), "over r 1\nsoon r 1\nvery r 1\n").unwrap();
    for name in ["noun.exc", "verb.exc", "adj.exc", "adv.exc", "cntlist"] {
        fs::write(dir.join(name), "").unwrap();
    }
    fs::write(dir.join("skip.txt"), "the\tDT\n").unwrap();
}

fn build_dictionary(dir: &Path) {
    Command::cargo_bin("mkdict")
        .unwrap()
        .arg("-O")
        .arg(dir)
        .arg("-s")
        .arg(dir.join("skip.txt"))
        .arg(dir)
        .assert()
        .success();
    assert!(dir.join("w2g.cdb").exists());
    assert!(dir.join("g2w.cdb").exists());
}

#[test]
fn test_encrypt_and_decrypt() {
    let dir = tempfile::tempdir().unwrap();
    write_wordnet(dir.path());
    build_dictionary(dir.path());

    let file_path = dir.path().join("message.txt");
    fs::write(&file_path, PANGRAM).unwrap();

    // Encrypt the file to stdout.
    let encrypted = Command::cargo_bin("nlcli")
        .unwrap()
        .arg("-b")
        .arg(dir.path())
        .arg("secret")
        .arg(&file_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let encrypted_text = String::from_utf8(encrypted.clone()).unwrap();
    assert_ne!(encrypted_text, PANGRAM);
    // Skip-listed word survives verbatim, case intact.
    assert!(encrypted_text.starts_with("The "), "{encrypted_text:?}");
    assert!(encrypted_text.ends_with(".\n"), "{encrypted_text:?}");

    // Decrypt from stdin.
    Command::cargo_bin("nlcli")
        .unwrap()
        .arg("-R")
        .arg("-b")
        .arg(dir.path())
        .arg("secret")
        .write_stdin(encrypted)
        .assert()
        .success()
        .stdout(PANGRAM);
}

#[test]
fn test_cbc_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write_wordnet(dir.path());
    build_dictionary(dir.path());

    let encrypted = Command::cargo_bin("nlcli")
        .unwrap()
        .args(["-C", "-b"])
        .arg(dir.path())
        .arg("secret")
        .write_stdin("fox fox fox fox fox fox fox fox")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    // Chaining: the same plaintext word stops encrypting identically.
    let text = String::from_utf8(encrypted.clone()).unwrap();
    let words: Vec<&str> = text.split(' ').collect();
    assert!(words.windows(2).any(|w| w[0] != w[1]), "{text:?}");

    Command::cargo_bin("nlcli")
        .unwrap()
        .args(["-C", "-R", "-b"])
        .arg(dir.path())
        .arg("secret")
        .write_stdin(encrypted)
        .assert()
        .success()
        .stdout("fox fox fox fox fox fox fox fox");
}

#[test]
fn test_debug_trace_goes_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    write_wordnet(dir.path());
    build_dictionary(dir.path());

    Command::cargo_bin("nlcli")
        .unwrap()
        .arg("-d")
        .arg("-b")
        .arg(dir.path())
        .arg("secret")
        .write_stdin("fox")
        .assert()
        .success()
        .stderr(predicates::str::contains("substitution"));
}

#[test]
fn test_usage_error_exit_code() {
    // No key at all.
    Command::cargo_bin("nlcli").unwrap().assert().code(100);

    // Unknown codec.
    Command::cargo_bin("nlcli")
        .unwrap()
        .args(["-c", "ebcdic", "key"])
        .assert()
        .code(100)
        .stderr(predicates::str::contains("codec"));

    // Builder without a base directory.
    Command::cargo_bin("mkdict").unwrap().assert().code(100);
}

#[test]
fn test_missing_dictionary_fails() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("nlcli")
        .unwrap()
        .arg("-b")
        .arg(dir.path())
        .arg("key")
        .write_stdin("fox")
        .assert()
        .code(1)
        .stderr(predicates::str::contains("w2g.cdb"));
}

#[test]
fn test_latin1_codec_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write_wordnet(dir.path());
    build_dictionary(dir.path());

    // 0xE9 is é in latin-1 and invalid alone in UTF-8; it must survive the
    // decode/encode cycle byte-for-byte.
    let input: &[u8] = b"fox \xe9 dog";
    let encrypted = Command::cargo_bin("nlcli")
        .unwrap()
        .args(["-c", "latin-1", "-b"])
        .arg(dir.path())
        .arg("k")
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(encrypted.contains(&0xe9), "{encrypted:?}");

    Command::cargo_bin("nlcli")
        .unwrap()
        .args(["-c", "latin-1", "-R", "-b"])
        .arg(dir.path())
        .arg("k")
        .write_stdin(encrypted)
        .assert()
        .success()
        .stdout(input.to_vec());
}
