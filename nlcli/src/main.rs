use clap::Parser;
use nlcrypt::NlCrypt;
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::Context;

/// Disguise text as grammatically plausible prose, or turn it back.
#[derive(Parser, Debug)]
#[command(name = "nlcli")]
struct Args {
    /// Trace substitutions to stderr
    #[arg(short = 'd')]
    debug: bool,

    /// Byte codec for input and output (utf-8 or latin-1)
    #[arg(short = 'c', default_value = "utf-8", value_name = "CODEC")]
    codec: String,

    /// Directory holding w2g.cdb and g2w.cdb
    #[arg(short = 'b', default_value = ".", value_name = "DIR")]
    basedir: PathBuf,

    /// Chain substitutions (CBC mode)
    #[arg(short = 'C')]
    cbc: bool,

    /// Reverse the direction (decryption)
    #[arg(short = 'R')]
    reverse: bool,

    /// Session key, UTF-8 encoded
    #[arg(value_name = "KEY")]
    key: String,

    /// Input files; stdin when none are given
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

const USAGE_ERROR: i32 = 100;

enum Codec {
    Utf8,
    Latin1,
}

impl Codec {
    fn parse(name: &str) -> Option<Codec> {
        match name.to_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Codec::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Some(Codec::Latin1),
            _ => None,
        }
    }

    /// Decoding is lossy on purpose: a stray invalid byte should not kill a
    /// whole transform.
    fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Codec::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Codec::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Codec::Utf8 => text.as_bytes().to_vec(),
            Codec::Latin1 => text
                .chars()
                .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
                .collect(),
        }
    }
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(if err.use_stderr() { USAGE_ERROR } else { 0 });
        }
    };

    let Some(codec) = Codec::parse(&args.codec) else {
        eprintln!("nlcli: unknown codec {:?} (use utf-8 or latin-1)", args.codec);
        std::process::exit(USAGE_ERROR);
    };

    if args.debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(io::stderr)
            .init();
    }

    if let Err(err) = run(&args, &codec) {
        eprintln!("nlcli: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args, codec: &Codec) -> anyhow::Result<()> {
    // One session for all inputs: in CBC mode the state chains across file
    // boundaries, exactly as if the files were concatenated.
    let mut session = NlCrypt::new(args.key.as_bytes(), args.reverse, args.cbc, &args.basedir)
        .context("opening dictionary")?;

    let stdout = io::stdout();
    let mut stdout = BufWriter::new(stdout.lock());

    if args.files.is_empty() {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("reading stdin")?;
        let out = session.feed(&codec.decode(&bytes))?;
        stdout.write_all(&codec.encode(&out))?;
    } else {
        for path in &args.files {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let out = session.feed(&codec.decode(&bytes))?;
            stdout.write_all(&codec.encode(&out))?;
        }
    }

    // True end of stream: an article still pending has no word to agree
    // with, so it goes out as it came in.
    let tail = session.finish();
    if !tail.is_empty() {
        stdout.write_all(&codec.encode(&tail))?;
    }
    stdout.flush()?;
    Ok(())
}
