use crate::models::Submission;

/// Subject and plain-text body for the notification sent to the inbox.
pub fn render_notification(submission: &Submission) -> (String, String) {
    let subject = format!("New Form Submission from {}", submission.name());
    let body = format!(
        "Name: {}\nEmail: {}\nMessage:\n{}",
        submission.name(),
        submission.email(),
        submission.message()
    );
    (subject, body)
}
