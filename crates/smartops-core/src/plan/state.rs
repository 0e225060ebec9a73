//! Plan lifecycle.

use super::editor;
use super::model::ActionPlan;
use crate::error::{Result, SmartOpsError};
use serde::{Deserialize, Serialize};

/// Where the current plan is in its review/execute lifecycle.
///
/// `Empty → Proposed → (Approved | Empty)`. An approved plan is no longer
/// editable. It stays `Approved` after a failed run so it can be retried from
/// the first action or abandoned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PlanState {
    #[default]
    Empty,
    Proposed { plan: ActionPlan },
    Approved { plan: ActionPlan },
}

impl PlanState {
    pub fn plan(&self) -> Option<&ActionPlan> {
        match self {
            Self::Empty => None,
            Self::Proposed { plan } | Self::Approved { plan } => Some(plan),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_proposed(&self) -> bool {
        matches!(self, Self::Proposed { .. })
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Proposed { .. } => "proposed",
            Self::Approved { .. } => "approved",
        }
    }

    /// A freshly proposed plan replaces whatever was held. An empty proposal
    /// leaves the state as it was.
    pub fn propose(&self, plan: ActionPlan) -> PlanState {
        if plan.is_empty() {
            self.clone()
        } else {
            Self::Proposed { plan }
        }
    }

    /// Applies one parameter edit. Only a proposed plan accepts edits.
    pub fn edit(&self, index: usize, key: &str, raw_value: &str, nested: bool) -> Result<PlanState> {
        match self {
            Self::Proposed { plan } => Ok(Self::Proposed {
                plan: editor::update(plan, index, key, raw_value, nested)?,
            }),
            Self::Approved { .. } => Err(SmartOpsError::invalid_state(
                "plan is locked after approval; propose a new plan to edit",
            )),
            Self::Empty => Err(SmartOpsError::invalid_state("no plan to edit")),
        }
    }

    /// Approves a proposed plan. Approving an already approved plan is the
    /// retry path after a failed run.
    pub fn approve(&self) -> Result<PlanState> {
        match self {
            Self::Proposed { plan } | Self::Approved { plan } => {
                Ok(Self::Approved { plan: plan.clone() })
            }
            Self::Empty => Err(SmartOpsError::invalid_state("no plan to approve")),
        }
    }

    pub fn cancel(&self) -> Result<PlanState> {
        match self {
            Self::Empty => Err(SmartOpsError::invalid_state("no plan to cancel")),
            _ => Ok(Self::Empty),
        }
    }

    /// Clears an approved plan after every action ran.
    pub fn consume(&self) -> Result<PlanState> {
        match self {
            Self::Approved { .. } => Ok(Self::Empty),
            other => Err(SmartOpsError::invalid_state(format!(
                "cannot complete a plan that is {}",
                other.label()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::model::{Action, ParamValue, ParameterBag};

    fn plan() -> ActionPlan {
        ActionPlan::new(vec![Action::new(
            "send_email",
            ParameterBag::new().with("recipient", ParamValue::scalar("Alice")),
        )])
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let proposed = PlanState::Empty.propose(plan());
        assert!(proposed.is_proposed());

        let edited = proposed.edit(0, "recipient", "Bob", false).unwrap();
        assert_eq!(
            edited.plan().unwrap().get(0).unwrap().parameters.scalar("recipient"),
            Some("Bob")
        );

        let approved = edited.approve().unwrap();
        assert!(approved.is_approved());
        assert!(approved.consume().unwrap().is_empty());
    }

    #[test]
    fn test_empty_proposal_keeps_state() {
        let proposed = PlanState::Empty.propose(plan());
        assert_eq!(proposed.propose(ActionPlan::default()), proposed);
    }

    #[test]
    fn test_approved_plan_is_locked_but_retryable() {
        let approved = PlanState::Empty.propose(plan()).approve().unwrap();
        let err = approved.edit(0, "recipient", "Bob", false).unwrap_err();
        assert!(matches!(err, SmartOpsError::InvalidState(_)));
        assert_eq!(approved.approve().unwrap(), approved);
        assert!(approved.cancel().unwrap().is_empty());
    }

    #[test]
    fn test_empty_state_rejects_transitions() {
        assert!(PlanState::Empty.approve().is_err());
        assert!(PlanState::Empty.cancel().is_err());
        assert!(PlanState::Empty.consume().is_err());
        assert!(PlanState::Empty.edit(0, "k", "v", false).is_err());
    }
}
