use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result};
use log::{info, Level};
use qtree::{header::MAGIC, QTree, Settings};
use text_io::read;

pub enum Assume {
    Yes,
    No,
}

/// Set up logging, `verbosity` being the number of `-v` flags given.
pub fn setup_logger(verbosity: u8) -> Result<()> {
    let log_level = match verbosity {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };

    simple_logger::init_with_level(log_level)?;

    info!("Log level: {}", log_level);
    Ok(())
}

/// Whether the file at `path` starts with the binary container identifier.
pub fn is_binary<P: AsRef<Path>>(path: P) -> Result<bool> {
    let mut magic = [0u8; MAGIC.len()];
    let mut file = File::open(path)?;

    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == MAGIC),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Load and uncompress a compressed image, text or binary.
pub fn load_compressed<P: AsRef<Path>>(path: P, settings: Settings) -> Result<QTree> {
    let path = path.as_ref();
    let mut tree = QTree::with_settings(settings);

    let result = if is_binary(path)? {
        info!("Reading binary container {path:?}");
        let input = BufReader::new(File::open(path)?);
        tree.decode_binary(input)
    } else {
        tree.open_compressed(path)
    };
    result.with_context(|| format!("Could not uncompress {path:?}"))?;

    Ok(tree)
}

pub fn exists_decision<P: AsRef<Path>>(place: &str, action: &str, path: &P, assume: Option<Assume>) -> bool {
    let path = path.as_ref();

    match assume {
        Some(Assume::Yes) => return true,
        Some(Assume::No) => return false,
        None => (),
    }

    loop {
        print!("{place} file {path:?} already exists. {action}? [y/N] ");

        let opt: String = read!("{}\n");
        let opt = opt.to_lowercase();

        if opt.is_empty() || opt == "n" {
            return false
        } else if opt == "y" {
            return true
        }
    }
}
