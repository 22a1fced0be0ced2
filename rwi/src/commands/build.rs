use std::ffi::OsString;

use wordindex::corpus;
use wordindex::TrieBuilder;

use crate::error::CommandError;
use crate::ui::Ui;

pub const HELP_TEXT: &str = "
build a word-completion index from a directory of text files
";

pub fn args() -> clap::Command {
    clap::command!("build")
        .arg(
            clap::Arg::new("rootdir")
                .help("directory to ingest, recursively")
                .required(true)
                .value_name("ROOTDIR")
                .value_parser(clap::value_parser!(OsString)),
        )
        .arg(
            clap::Arg::new("outfile")
                .help("where to write the index file")
                .required(true)
                .value_name("OUTFILE")
                .value_parser(clap::value_parser!(OsString)),
        )
        .about(HELP_TEXT)
}

#[tracing::instrument(level = "debug", skip_all, name = "rwi build")]
pub fn run(_ui: &Ui, args: &clap::ArgMatches) -> Result<(), CommandError> {
    let rootdir = args
        .get_one::<OsString>("rootdir")
        .expect("rootdir is a required arg");
    let outfile = args
        .get_one::<OsString>("outfile")
        .expect("outfile is a required arg");

    let mut builder = TrieBuilder::new();
    corpus::ingest_directory(&mut builder, rootdir)?;
    builder.write_file(outfile)?;
    Ok(())
}
