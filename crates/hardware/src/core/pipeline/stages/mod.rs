//! Pipeline stage implementations.
//!
//! This module contains the individual implementations for the five stages of the
//! instruction pipeline. It includes:
//! 1. **Fetch:** Pulls instructions from the trace into IF.
//! 2. **Decode:** Moves instructions from IF to ID, waiting on data hazards without forwarding.
//! 3. **Issue:** Moves instructions from ID into the ALU or load/store execute slot.
//! 4. **Memory:** Advances execute slots into memory slots and accesses the data port.
//! 5. **Writeback:** Retires the memory slots, serializing them on write-port conflicts.
//!
//! Within a cycle the stages run in reverse order (writeback first), so each
//! stage sees the registers as the previous cycle left them.

/// Instruction decode stage implementation.
pub mod decode;

/// Instruction fetch stage implementation.
pub mod fetch;

/// Instruction issue stage implementation.
pub mod issue;

/// Memory access stage implementation.
pub mod memory;

/// Writeback stage implementation.
pub mod writeback;

/// Decode stage entry point (ID stage).
pub use decode::decode_stage;
/// Fetch stage entry point (IF stage).
pub use fetch::fetch_stage;
/// Issue stage entry point (EX stage).
pub use issue::issue_stage;
/// Memory stage entry point (MEM stage).
pub use memory::memory_stage;
/// Writeback stage entry point (WB stage).
pub use writeback::writeback_stage;
