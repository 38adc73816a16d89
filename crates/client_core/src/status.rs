use shared::domain::LessonStatus;

/// Display label and color for one status. `color` is a semantic token the
/// presentation layer maps to its own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub label: &'static str,
    pub color: &'static str,
}

/// Static style table. Callers with a legacy record that never got a status
/// pass `None` and get the `Scheduled` entry.
pub fn status_style(status: Option<LessonStatus>) -> StatusStyle {
    match status.unwrap_or(LessonStatus::Scheduled) {
        LessonStatus::Scheduled => StatusStyle {
            label: "Scheduled",
            color: "blue",
        },
        LessonStatus::Confirmed => StatusStyle {
            label: "Confirmed",
            color: "indigo",
        },
        LessonStatus::Completed => StatusStyle {
            label: "Taught",
            color: "green",
        },
        LessonStatus::PendingPayment => StatusStyle {
            label: "Awaiting payment",
            color: "orange",
        },
        LessonStatus::Paid => StatusStyle {
            label: "Paid",
            color: "emerald",
        },
        LessonStatus::CancelledByStudent => StatusStyle {
            label: "Cancelled by student",
            color: "red",
        },
        LessonStatus::CancelledByTutor => StatusStyle {
            label: "Cancelled by tutor",
            color: "red",
        },
    }
}

/// Which quick actions a context menu may offer for a session in the given
/// status. Classification only; the server still has the final word on any
/// transition it is asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickActions {
    pub mark_taught: bool,
    pub confirm_payment: bool,
    pub cancel: bool,
    pub restore: bool,
}

impl QuickActions {
    pub fn for_status(status: LessonStatus) -> Self {
        Self {
            mark_taught: matches!(status, LessonStatus::Scheduled | LessonStatus::Confirmed),
            confirm_payment: matches!(
                status,
                LessonStatus::Completed | LessonStatus::PendingPayment
            ),
            cancel: !status.is_cancelled(),
            restore: status.is_cancelled(),
        }
    }

    pub fn none_offered(&self) -> bool {
        !(self.mark_taught || self.confirm_payment || self.cancel || self.restore)
    }
}

#[cfg(test)]
#[path = "tests/status_tests.rs"]
mod tests;
