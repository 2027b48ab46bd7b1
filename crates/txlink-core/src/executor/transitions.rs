//! Allowed phase transitions of an execution run.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use txlink_types::ExecutionPhase;

// Static transition table - each phase maps to allowed next phases
static TRANSITIONS: Lazy<HashMap<ExecutionPhase, HashSet<ExecutionPhase>>> = Lazy::new(|| {
	use ExecutionPhase::*;

	let mut m = HashMap::new();
	m.insert(Idle, HashSet::from([Switching, Failed]));
	m.insert(
		Switching,
		HashSet::from([Signing, Depositing, Approving, Approved, Failed]),
	);
	m.insert(Signing, HashSet::from([Confirmed, Failed]));
	m.insert(Depositing, HashSet::from([Confirmed, Failed]));
	m.insert(Approving, HashSet::from([Approved, Failed]));
	m.insert(Approved, HashSet::from([Swapping, Failed]));
	m.insert(Swapping, HashSet::from([Confirmed, Failed]));
	// terminal phases only go back to Idle through a reset
	m.insert(Confirmed, HashSet::from([Idle]));
	m.insert(Failed, HashSet::from([Idle]));
	m
});

/// Checks if a phase transition is valid.
pub fn is_valid_transition(from: ExecutionPhase, to: ExecutionPhase) -> bool {
	TRANSITIONS
		.get(&from)
		.is_some_and(|allowed| allowed.contains(&to))
}

#[cfg(test)]
mod tests {
	use super::*;
	use ExecutionPhase::*;

	#[test]
	fn test_swap_path_is_valid() {
		let path = [Idle, Switching, Approving, Approved, Swapping, Confirmed];
		assert!(path.windows(2).all(|w| is_valid_transition(w[0], w[1])));
	}

	#[test]
	fn test_swap_with_allowance_skips_approving() {
		assert!(is_valid_transition(Switching, Approved));
	}

	#[test]
	fn test_transfer_and_wrap_paths_are_valid() {
		assert!(is_valid_transition(Switching, Signing));
		assert!(is_valid_transition(Signing, Confirmed));
		assert!(is_valid_transition(Switching, Depositing));
		assert!(is_valid_transition(Depositing, Confirmed));
	}

	#[test]
	fn test_any_running_phase_can_fail() {
		for phase in [Idle, Switching, Signing, Depositing, Approving, Approved, Swapping] {
			assert!(is_valid_transition(phase, Failed), "{phase} -> Failed");
		}
	}

	#[test]
	fn test_invalid_transitions() {
		assert!(!is_valid_transition(Idle, Confirmed));
		assert!(!is_valid_transition(Switching, Swapping));
		assert!(!is_valid_transition(Approving, Swapping));
		assert!(!is_valid_transition(Confirmed, Failed));
		assert!(!is_valid_transition(Failed, Switching));
	}
}
