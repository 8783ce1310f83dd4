// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sample Measurement
//!
//! One profiling observation: the measured costs of executing the work
//! function on a single input item. Produced only during profiling and
//! consumed immediately by profile aggregation; never persisted.

use std::time::Duration;

/// Costs observed while profiling one input item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleMeasurement {
    /// Elapsed compute time of the work function.
    pub compute: Duration,
    /// Elapsed time encoding the input item.
    pub encode_input: Duration,
    /// Elapsed time encoding the function's output.
    pub encode_output: Duration,
    /// Serialized byte length of the output. `u64::MAX` when the encoder
    /// failed and the size must be assumed infinite.
    pub output_bytes: u64,
}

impl SampleMeasurement {
    /// Combined per-item serialization cost (the transfer tax a
    /// process-pool executor pays for this item).
    pub fn transfer_cost(&self) -> Duration {
        self.encode_input + self.encode_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_cost_sums_both_directions() {
        let sample = SampleMeasurement {
            compute: Duration::from_micros(100),
            encode_input: Duration::from_micros(3),
            encode_output: Duration::from_micros(7),
            output_bytes: 256,
        };
        assert_eq!(sample.transfer_cost(), Duration::from_micros(10));
    }
}
