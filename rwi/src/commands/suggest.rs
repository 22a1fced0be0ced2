use std::ffi::OsString;

use format_bytes::format_bytes;
use wordindex::WordIndex;

use crate::error::CommandError;
use crate::ui::Ui;

pub const HELP_TEXT: &str = "
list words from the index that start with the given prefix
";

pub fn args() -> clap::Command {
    clap::command!("suggest")
        .arg(
            clap::Arg::new("indexfile")
                .help("index file to query")
                .required(true)
                .value_name("INDEXFILE")
                .value_parser(clap::value_parser!(OsString)),
        )
        .arg(
            clap::Arg::new("prefix")
                .help("prefix to complete; all words when omitted")
                .value_name("PREFIX")
                .value_parser(clap::value_parser!(OsString)),
        )
        .arg(
            clap::Arg::new("limit")
                .help("print at most NUM words")
                .short('l')
                .long("limit")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .about(HELP_TEXT)
}

#[tracing::instrument(level = "debug", skip_all, name = "rwi suggest")]
pub fn run(ui: &Ui, args: &clap::ArgMatches) -> Result<(), CommandError> {
    let indexfile = args
        .get_one::<OsString>("indexfile")
        .expect("indexfile is a required arg");
    // Indexed words are raw bytes, so take the prefix as raw bytes too.
    let prefix = match args.get_one::<OsString>("prefix") {
        Some(prefix) => prefix.as_encoded_bytes(),
        None => b"",
    };
    let limit = match args.get_one::<usize>("limit") {
        Some(&limit) => limit,
        None => usize::MAX,
    };

    let mut index = WordIndex::open(indexfile)?;
    let mut stdout = ui.stdout_buffer();
    // A prefix that matches nothing is not an error: we print nothing.
    for word in index.suggest(prefix)?.take(limit) {
        let word = word?;
        stdout.write_all(&format_bytes!(b"{}\n", word))?;
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_prefix_may_be_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let matches = args()
            .try_get_matches_from([
                OsString::from("suggest"),
                OsString::from("words.idx"),
                OsString::from_vec(b"caf\xe9".to_vec()),
            ])
            .expect("a non-UTF-8 prefix should parse");
        let prefix = matches
            .get_one::<OsString>("prefix")
            .expect("prefix should be captured");
        assert_eq!(prefix.as_encoded_bytes(), b"caf\xe9");
    }
}
