//! The form lifecycle shared by every editable view.

/// idle → editing → submitting → idle (success) | editing with error (failure)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Editing {
        error: Option<String>,
    },
    Submitting,
}

impl FormPhase {
    /// The operator changed a field. Keeps any error until the next submit.
    pub fn edit(&mut self) {
        if matches!(self, FormPhase::Idle) {
            *self = FormPhase::Editing { error: None };
        }
    }

    /// Enter the submitting state. Returns false if a submit is already
    /// running.
    pub fn submit(&mut self) -> bool {
        if matches!(self, FormPhase::Submitting) {
            return false;
        }
        *self = FormPhase::Submitting;
        true
    }

    pub fn succeed(&mut self) {
        *self = FormPhase::Idle;
    }

    /// Back to editing with the error shown. Entered values are untouched.
    pub fn fail(&mut self, error: impl Into<String>) {
        *self = FormPhase::Editing {
            error: Some(error.into()),
        };
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FormPhase::Editing { error } => error.as_deref(),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, FormPhase::Submitting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_path() {
        let mut phase = FormPhase::default();
        phase.edit();
        assert_eq!(phase, FormPhase::Editing { error: None });
        assert!(phase.submit());
        assert!(phase.is_submitting());
        assert!(!phase.submit());
        phase.succeed();
        assert_eq!(phase, FormPhase::Idle);
    }

    #[test]
    fn test_failure_returns_to_editing() {
        let mut phase = FormPhase::default();
        phase.edit();
        phase.submit();
        phase.fail("backend down");
        assert_eq!(phase.error(), Some("backend down"));

        // Editing again keeps the message visible.
        phase.edit();
        assert_eq!(phase.error(), Some("backend down"));
        assert!(phase.submit());
        assert_eq!(phase.error(), None);
    }
}
