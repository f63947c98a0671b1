//! # DSP
//!
//! - **`interval`**: maps a musical note value and a tempo to a delay
//!   time.
//! - **`delay_line`**: a multichannel ring buffer that is written and read
//!   a whole block at a time.
//! - **`processor`**: runs one host block through the delay line using the
//!   current parameter snapshot.

pub mod delay_line;
pub mod interval;
pub mod processor;
