use lumina_core::{AppError, AppResult};
use serde::Serialize;

/// Lifecycle status of one form instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    /// Mounted, untouched.
    Idle,
    /// At least one field changed, or a submission came back.
    Editing,
    /// Schema and refinements are running.
    Validating,
    /// Remote action in flight.
    Submitting,
    /// Remote action succeeded. Terminal.
    Success,
    /// Remote action failed. Transient, resumes to `Editing`.
    Failed,
}

/// Input to the status machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTransition {
    /// A field value changed.
    Edit,
    /// The user asked to submit.
    Submit,
    /// Validation reported field errors.
    ValidationFailed,
    /// Validation passed.
    ValidationPassed,
    /// The remote action succeeded.
    Succeeded,
    /// The remote action failed.
    Failed,
    /// Failure was reported; the form is editable again.
    Resume,
    /// Draft restored to its defaults.
    Reset,
}

impl FormStatus {
    /// Applies one transition. Transitions with no edge from the current
    /// status are conflicts.
    pub fn next(self, transition: FormTransition) -> AppResult<Self> {
        use FormStatus as S;
        use FormTransition as T;

        match (self, transition) {
            (S::Idle | S::Editing, T::Edit) => Ok(S::Editing),
            (S::Editing, T::Submit) => Ok(S::Validating),
            (S::Validating, T::ValidationFailed) => Ok(S::Editing),
            (S::Validating, T::ValidationPassed) => Ok(S::Submitting),
            (S::Submitting, T::Succeeded) => Ok(S::Success),
            (S::Submitting, T::Failed) => Ok(S::Failed),
            (S::Failed, T::Resume) => Ok(S::Editing),
            (S::Idle | S::Editing, T::Reset) => Ok(S::Idle),
            (status, transition) => Err(AppError::Conflict(format!(
                "form cannot apply {transition:?} while {status:?}"
            ))),
        }
    }

    /// Returns the wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Editing => "editing",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Whether a new submission may start from this status.
    #[must_use]
    pub fn accepts_submit(self) -> bool {
        matches!(self, Self::Idle | Self::Editing)
    }
}
