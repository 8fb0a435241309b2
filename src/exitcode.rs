//! Process exit codes

use crate::domain::Outcome;

/// Successful termination (includes no-op and warning outcomes)
pub const OK: i32 = 0;

/// Operation failed
pub const FAILURE: i32 = 1;

/// Command line usage error
pub const USAGE: i32 = 1;

/// Exit code for the outcome of an operation.
pub fn for_outcome(outcome: Outcome) -> i32 {
    if outcome.is_failure() {
        FAILURE
    } else {
        OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_outcomes_when_mapping_then_only_failure_is_nonzero() {
        assert_eq!(for_outcome(Outcome::Success), OK);
        assert_eq!(for_outcome(Outcome::NoOp), OK);
        assert_eq!(for_outcome(Outcome::Warning), OK);
        assert_eq!(for_outcome(Outcome::Failure), FAILURE);
    }
}
