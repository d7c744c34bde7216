use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::info;
use thiserror::Error;

use super::block::{Block, GENESIS_HASH};
use super::chain::Blockchain;
use super::transaction::Transaction;

/// Errors that can occur while reading or writing a chain file
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid integer for {field} on line {line}")]
    InvalidInteger { line: usize, field: &'static str },

    #[error("chain file ended mid-record, expected {field}")]
    UnexpectedEof { field: &'static str },
}

/// Line-oriented cursor over a chain file, tracking the current line
/// number for error reporting.
struct LineSource<B> {
    lines: B,
    line: usize,
}

impl<B: Iterator<Item = io::Result<String>>> LineSource<B> {
    fn new(lines: B) -> Self {
        LineSource { lines, line: 0 }
    }

    /// Next line, or `None` at end of file. Only legal between records.
    fn next_record(&mut self) -> Option<io::Result<String>> {
        self.line += 1;
        self.lines.next()
    }

    /// Next line within a record; end of file here is a format error.
    fn next_field(&mut self, field: &'static str) -> Result<String, StorageError> {
        self.line += 1;
        match self.lines.next() {
            Some(line) => Ok(line?),
            None => Err(StorageError::UnexpectedEof { field }),
        }
    }

    fn next_int<T: std::str::FromStr>(&mut self, field: &'static str) -> Result<T, StorageError> {
        let raw = self.next_field(field)?;
        self.parse_int(&raw, field)
    }

    fn parse_int<T: std::str::FromStr>(
        &self,
        raw: &str,
        field: &'static str,
    ) -> Result<T, StorageError> {
        raw.parse().map_err(|_| StorageError::InvalidInteger {
            line: self.line,
            field,
        })
    }
}

/// Reads a chain file into a blockchain.
///
/// The format is seven lines per block, in index order: index, timestamp
/// (milliseconds), sender, receiver, amount, nonce, hash. Previous hashes
/// are not persisted; the loader threads them through, starting from the
/// genesis sentinel. Every block is appended through [`Blockchain::add`],
/// so the ledger is populated exactly as a live append would.
///
/// Any malformed line aborts the whole load: a partially populated chain
/// never escapes this function.
///
/// # Arguments
///
/// * `path` - Path of the chain file
///
/// # Returns
///
/// The loaded blockchain, or the error that stopped the load
pub fn read_chain<P: AsRef<Path>>(path: P) -> Result<Blockchain, StorageError> {
    let file = File::open(path)?;
    let mut source = LineSource::new(BufReader::new(file).lines());

    let mut chain = Blockchain::new();
    let mut previous_hash = GENESIS_HASH.to_string();

    while let Some(first) = source.next_record() {
        let index: u64 = source.parse_int(&first?, "index")?;
        let timestamp: i64 = source.next_int("timestamp")?;
        let sender = source.next_field("sender")?;
        let receiver = source.next_field("receiver")?;
        let amount: i64 = source.next_int("amount")?;
        let nonce = source.next_field("nonce")?;
        let hash = source.next_field("hash")?;

        let block = Block::from_stored(
            index,
            Transaction::new(sender, receiver, amount),
            nonce,
            previous_hash,
            hash.clone(),
            timestamp,
        );
        previous_hash = hash;
        chain.add(block);
    }

    info!("loaded {} blocks from storage", chain.len());
    Ok(chain)
}

/// Writes every block of the chain to a file, overwriting the destination.
///
/// # Arguments
///
/// * `chain` - The blockchain to persist
/// * `path` - Destination path
pub fn write_chain<P: AsRef<Path>>(chain: &Blockchain, path: P) -> Result<(), StorageError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for block in chain.blocks() {
        writeln!(writer, "{}", block.index)?;
        writeln!(writer, "{}", block.timestamp)?;
        writeln!(writer, "{}", block.transaction.sender)?;
        writeln!(writer, "{}", block.transaction.receiver)?;
        writeln!(writer, "{}", block.transaction.amount)?;
        writeln!(writer, "{}", block.nonce)?;
        writeln!(writer, "{}", block.hash)?;
    }

    writer.flush()?;
    Ok(())
}
