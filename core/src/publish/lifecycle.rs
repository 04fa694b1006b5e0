use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PublishState {
    UNRENDERED,
    RENDERED,
    HASHED,
    VALIDATED,
}

/// Tracks one run through render, hash-update and validation. There is
/// no rollback; a failed step leaves the last reached state.
#[derive(Debug, Clone)]
pub struct PublishLifecycle {
    run_id: String,
    state: PublishState,
}

impl PublishLifecycle {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            state: PublishState::UNRENDERED,
        }
    }

    pub fn state(&self) -> PublishState {
        self.state
    }

    pub fn transition(&mut self, to: PublishState) -> CoreResult<()> {
        if !valid_transition(self.state, to) {
            return Err(CoreError::InvalidInput(format!(
                "invalid publish state transition {:?} -> {:?} for run {}",
                self.state, to, self.run_id
            )));
        }
        tracing::debug!(run_id = %self.run_id, from = ?self.state, to = ?to, "publish state changed");
        self.state = to;
        Ok(())
    }
}

fn valid_transition(from: PublishState, to: PublishState) -> bool {
    use PublishState::*;
    match (from, to) {
        (UNRENDERED, RENDERED) => true,
        (RENDERED, HASHED) => true,
        (RENDERED, VALIDATED) => true,
        (HASHED, VALIDATED) => true,
        // re-running the pipeline starts over from a fresh render
        (_, RENDERED) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{valid_transition, PublishLifecycle, PublishState};

    #[test]
    fn state_machine_blocks_invalid_edges() {
        assert!(valid_transition(PublishState::UNRENDERED, PublishState::RENDERED));
        assert!(valid_transition(PublishState::RENDERED, PublishState::VALIDATED));
        assert!(!valid_transition(PublishState::UNRENDERED, PublishState::HASHED));
        assert!(!valid_transition(PublishState::VALIDATED, PublishState::HASHED));
    }

    #[test]
    fn failed_transition_keeps_state() {
        let mut lc = PublishLifecycle::new("example");
        assert!(lc.transition(PublishState::VALIDATED).is_err());
        assert_eq!(lc.state(), PublishState::UNRENDERED);
        lc.transition(PublishState::RENDERED).unwrap();
        lc.transition(PublishState::HASHED).unwrap();
        lc.transition(PublishState::VALIDATED).unwrap();
        assert_eq!(lc.state(), PublishState::VALIDATED);
    }
}
