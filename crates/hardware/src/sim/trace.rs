//! Instruction Trace Sources.
//!
//! This module supplies the fetch stage with static instructions. It provides:
//! 1. **Trait:** [`TraceSource`], a pull-based stream that ends with `None`.
//! 2. **In-memory traces:** [`VecTrace`] for tests and embedding callers.
//! 3. **Binary traces:** [`BinaryTrace`] decodes fixed 12-byte little-endian records.
//!
//! # Record layout
//!
//! | Offset | Size | Field  |
//! |--------|------|--------|
//! | 0      | 1    | kind   |
//! | 1      | 1    | src1   |
//! | 2      | 1    | src2   |
//! | 3      | 1    | dest   |
//! | 4      | 4    | pc     |
//! | 8      | 4    | addr   |

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::common::{SimError, SimResult};
use crate::isa::{InstKind, StaticInst};

/// Size of one binary trace record in bytes.
pub const RECORD_SIZE: usize = 12;

/// A stream of static instructions in program order.
pub trait TraceSource {
    /// Returns the next instruction, or `None` once the trace is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Trace`] or [`SimError::Io`] if the underlying
    /// input is malformed or unreadable. End of trace is never an error.
    fn next_inst(&mut self) -> SimResult<Option<StaticInst>>;
}

/// Trace backed by an in-memory list.
#[derive(Debug, Clone, Default)]
pub struct VecTrace {
    insts: VecDeque<StaticInst>,
}

impl VecTrace {
    /// Creates a trace that yields `insts` in order.
    pub fn new(insts: impl IntoIterator<Item = StaticInst>) -> Self {
        Self {
            insts: insts.into_iter().collect(),
        }
    }

    /// Instructions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.insts.len()
    }
}

impl TraceSource for VecTrace {
    fn next_inst(&mut self) -> SimResult<Option<StaticInst>> {
        Ok(self.insts.pop_front())
    }
}

/// Trace decoded from binary records read from any [`Read`].
#[derive(Debug)]
pub struct BinaryTrace<R> {
    reader: R,
    records: u64,
}

impl BinaryTrace<BufReader<File>> {
    /// Opens a trace file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> SimResult<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> BinaryTrace<R> {
    /// Wraps a reader positioned at the first record.
    pub const fn new(reader: R) -> Self {
        Self { reader, records: 0 }
    }

    /// Records decoded so far.
    pub const fn records_read(&self) -> u64 {
        self.records
    }

    /// Fills `buf` completely, or reports how many bytes were available.
    fn read_record(&mut self, buf: &mut [u8; RECORD_SIZE]) -> SimResult<usize> {
        let mut filled = 0;
        while filled < RECORD_SIZE {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

/// Decodes one record.
///
/// # Errors
///
/// Returns [`SimError::Trace`] for an unknown kind code.
pub fn decode_record(buf: &[u8; RECORD_SIZE]) -> SimResult<StaticInst> {
    let kind = InstKind::from_code(buf[0])
        .ok_or_else(|| SimError::Trace(format!("unknown instruction kind {}", buf[0])))?;
    Ok(StaticInst {
        kind,
        src1: buf[1],
        src2: buf[2],
        dest: buf[3],
        pc: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        addr: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
    })
}

/// Encodes one record; the inverse of [`decode_record`].
pub fn encode_record(inst: &StaticInst) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    buf[0] = inst.kind.code();
    buf[1] = inst.src1;
    buf[2] = inst.src2;
    buf[3] = inst.dest;
    buf[4..8].copy_from_slice(&inst.pc.to_le_bytes());
    buf[8..12].copy_from_slice(&inst.addr.to_le_bytes());
    buf
}

impl<R: Read> TraceSource for BinaryTrace<R> {
    fn next_inst(&mut self) -> SimResult<Option<StaticInst>> {
        let mut buf = [0u8; RECORD_SIZE];
        match self.read_record(&mut buf)? {
            0 => Ok(None),
            RECORD_SIZE => {
                let inst = decode_record(&buf).map_err(|e| match e {
                    SimError::Trace(msg) => SimError::Trace(format!("record {}: {msg}", self.records)),
                    other => other,
                })?;
                self.records += 1;
                Ok(Some(inst))
            }
            n => Err(SimError::Trace(format!(
                "record {} truncated after {n} of {RECORD_SIZE} bytes",
                self.records
            ))),
        }
    }
}
