use std::ffi::OsString;

use format_bytes::format_bytes;
use wordindex::WordIndex;

use crate::error::CommandError;
use crate::ui::Ui;

pub const HELP_TEXT: &str = "
dump every record in the index, in traversal order
";

pub fn args() -> clap::Command {
    clap::command!("debugnodes")
        .arg(
            clap::Arg::new("indexfile")
                .help("index file to dump")
                .required(true)
                .value_name("INDEXFILE")
                .value_parser(clap::value_parser!(OsString)),
        )
        .about(HELP_TEXT)
}

#[tracing::instrument(level = "debug", skip_all, name = "rwi debugnodes")]
pub fn run(ui: &Ui, args: &clap::ArgMatches) -> Result<(), CommandError> {
    let indexfile = args
        .get_one::<OsString>("indexfile")
        .expect("indexfile is a required arg");

    let mut index = WordIndex::open(indexfile)?;
    let mut stdout = ui.stdout_buffer();
    for node in index.debug_iter_nodes() {
        let (pointer, record) = node?;
        match record.char {
            None => {
                stdout.write_all(&format_bytes!(b"{}: root", pointer))?
            }
            Some(char) => stdout.write_all(&format_bytes!(
                b"{}: char={} terminal={}",
                pointer,
                &[char][..],
                if record.terminal { &b"t"[..] } else { &b"f"[..] }
            ))?,
        }
        for child in &record.children {
            stdout.write_all(&format_bytes!(b" {}", *child))?;
        }
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
