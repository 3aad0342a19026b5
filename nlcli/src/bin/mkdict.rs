use clap::Parser;
use nlcrypt::{DictBuilder, Pos};
use std::io;
use std::path::PathBuf;

/// Build the nlcrypt dictionary pair (w2g.cdb, g2w.cdb) from WordNet files.
#[derive(Parser, Debug)]
#[command(name = "mkdict")]
struct Args {
    /// Output directory for the two databases
    #[arg(short = 'O', default_value = ".", value_name = "DIR")]
    outdir: PathBuf,

    /// Skip-list files: words that must never be substituted
    #[arg(short = 's', value_name = "FILE")]
    skip: Vec<PathBuf>,

    /// Directory with the WordNet index.*, *.exc and cntlist files
    #[arg(value_name = "BASEDIR")]
    basedir: PathBuf,
}

const USAGE_ERROR: i32 = 100;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(if err.use_stderr() { USAGE_ERROR } else { 0 });
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(&args) {
        eprintln!("mkdict: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mut builder = DictBuilder::from_wordnet(&args.basedir)?;
    for path in &args.skip {
        builder.read_skip_file(path)?;
    }
    for pos in Pos::ALL {
        builder.scan_index(pos)?;
    }
    builder.write(&args.outdir)?;
    Ok(())
}
