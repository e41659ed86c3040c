//! Form rules for subjects and tasks. A failed rule blocks submission and its
//! message is shown next to the field.

use chrono::{Local, NaiveTime, TimeZone};

pub const SUBJECT_NAME_MIN: usize = 2;
pub const SUBJECT_NAME_MAX: usize = 19;
pub const GOAL_HOURS_MIN: f32 = 1.0;
pub const GOAL_HOURS_MAX: f32 = 1000.0;
pub const TASK_TITLE_MIN: usize = 4;
pub const TASK_TITLE_MAX: usize = 19;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter subject name")]
    SubjectNameBlank,
    #[error("Subject name is too short")]
    SubjectNameTooShort,
    #[error("Subject name is too long")]
    SubjectNameTooLong,
    #[error("Please enter goal study hours")]
    GoalHoursBlank,
    #[error("Invalid number")]
    GoalHoursInvalid,
    #[error("Please set at least 1 hour")]
    GoalHoursTooLow,
    #[error("Please set a maximum of 1000 hours")]
    GoalHoursTooHigh,
    #[error("Title can't be blank")]
    TitleBlank,
    #[error("Title is too short")]
    TitleTooShort,
    #[error("Title is too long")]
    TitleTooLong,
    #[error("Due date can't be before today")]
    DueDateInPast,
    #[error("Please select subject related to the task.")]
    MissingSubject,
}

/// Returns the trimmed name; the length rules apply to what gets stored.
pub fn validate_subject_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::SubjectNameBlank);
    }
    match name.chars().count() {
        len if len < SUBJECT_NAME_MIN => Err(ValidationError::SubjectNameTooShort),
        len if len > SUBJECT_NAME_MAX => Err(ValidationError::SubjectNameTooLong),
        _ => Ok(name.to_string()),
    }
}

/// Parses the goal-hours field and checks its range.
pub fn validate_goal_hours(raw: &str) -> Result<f32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::GoalHoursBlank);
    }
    let hours: f32 = raw
        .parse()
        .map_err(|_| ValidationError::GoalHoursInvalid)?;
    if !hours.is_finite() {
        return Err(ValidationError::GoalHoursInvalid);
    }
    if hours < GOAL_HOURS_MIN {
        return Err(ValidationError::GoalHoursTooLow);
    }
    if hours > GOAL_HOURS_MAX {
        return Err(ValidationError::GoalHoursTooHigh);
    }
    Ok(hours)
}

/// Returns the trimmed title.
pub fn validate_task_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleBlank);
    }
    match title.chars().count() {
        len if len < TASK_TITLE_MIN => Err(ValidationError::TitleTooShort),
        len if len > TASK_TITLE_MAX => Err(ValidationError::TitleTooLong),
        _ => Ok(title.to_string()),
    }
}

pub fn validate_due_date(due_date: i64, today_start: i64) -> Result<(), ValidationError> {
    if due_date < today_start {
        Err(ValidationError::DueDateInPast)
    } else {
        Ok(())
    }
}

/// Local midnight at the start of today, in epoch milliseconds.
pub fn start_of_today_millis() -> i64 {
    let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| Local::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_name_bounds() {
        assert_eq!(validate_subject_name(""), Err(ValidationError::SubjectNameBlank));
        assert_eq!(validate_subject_name("   "), Err(ValidationError::SubjectNameBlank));
        assert_eq!(validate_subject_name("M"), Err(ValidationError::SubjectNameTooShort));
        assert_eq!(validate_subject_name("Ma"), Ok("Ma".into()));
        assert_eq!(validate_subject_name(&"x".repeat(19)), Ok("x".repeat(19)));
        assert_eq!(
            validate_subject_name(&"x".repeat(20)),
            Err(ValidationError::SubjectNameTooLong)
        );
    }

    #[test]
    fn subject_name_counts_characters_not_bytes() {
        assert_eq!(validate_subject_name(&"é".repeat(19)), Ok("é".repeat(19)));
    }

    #[test]
    fn lengths_are_measured_after_trimming() {
        assert_eq!(validate_subject_name("a "), Err(ValidationError::SubjectNameTooShort));
        assert_eq!(validate_subject_name("  Ma  "), Ok("Ma".into()));
        let padded = format!(" {} ", "x".repeat(19));
        assert_eq!(validate_subject_name(&padded), Ok("x".repeat(19)));

        assert_eq!(validate_task_title("ab  "), Err(ValidationError::TitleTooShort));
        assert_eq!(validate_task_title(" Read ch. 4 "), Ok("Read ch. 4".into()));
        let padded = format!("{}   ", "a".repeat(19));
        assert_eq!(validate_task_title(&padded), Ok("a".repeat(19)));
    }

    #[test]
    fn goal_hours_bounds() {
        assert_eq!(validate_goal_hours(""), Err(ValidationError::GoalHoursBlank));
        assert_eq!(validate_goal_hours("ten"), Err(ValidationError::GoalHoursInvalid));
        assert_eq!(validate_goal_hours("inf"), Err(ValidationError::GoalHoursInvalid));
        assert_eq!(validate_goal_hours("0.5"), Err(ValidationError::GoalHoursTooLow));
        assert_eq!(validate_goal_hours("1"), Ok(1.0));
        assert_eq!(validate_goal_hours(" 12.5 "), Ok(12.5));
        assert_eq!(validate_goal_hours("1000"), Ok(1000.0));
        assert_eq!(validate_goal_hours("1000.5"), Err(ValidationError::GoalHoursTooHigh));
    }

    #[test]
    fn task_title_bounds() {
        assert_eq!(validate_task_title(" "), Err(ValidationError::TitleBlank));
        assert_eq!(validate_task_title("abc"), Err(ValidationError::TitleTooShort));
        assert_eq!(validate_task_title("abcd"), Ok("abcd".into()));
        assert_eq!(validate_task_title(&"a".repeat(19)), Ok("a".repeat(19)));
        assert_eq!(validate_task_title(&"a".repeat(20)), Err(ValidationError::TitleTooLong));
    }

    #[test]
    fn due_date_must_not_be_in_the_past() {
        let today = start_of_today_millis();
        assert_eq!(validate_due_date(today, today), Ok(()));
        assert_eq!(validate_due_date(today + 1, today), Ok(()));
        assert_eq!(validate_due_date(today - 1, today), Err(ValidationError::DueDateInPast));
    }

    #[test]
    fn start_of_today_is_not_in_the_future() {
        let now = Local::now().timestamp_millis();
        let start = start_of_today_millis();
        assert!(start <= now);
        assert!(now - start <= 25 * 60 * 60 * 1000);
    }

    #[test]
    fn messages_match_form_copy() {
        assert_eq!(
            ValidationError::MissingSubject.to_string(),
            "Please select subject related to the task."
        );
        assert_eq!(
            ValidationError::GoalHoursTooHigh.to_string(),
            "Please set a maximum of 1000 hours"
        );
    }
}
