use crate::core::models::window::MonthWindow;

/// Summaries depend on who is asking (their memberships bound the scope) as
/// well as on whose balance is shown.
pub fn summary_key(
    viewer_id: &str,
    person_id: &str,
    window: Option<&MonthWindow>,
    group_id: Option<&str>,
    environment_id: Option<&str>,
) -> String {
    let window = window
        .map(|w| format!("{}-{:02}", w.year, w.month))
        .unwrap_or_else(|| "all".to_string());
    format!(
        "summary:{}:{}:{}:{}:{}",
        viewer_id,
        person_id,
        window,
        group_id.unwrap_or("*"),
        environment_id.unwrap_or("*")
    )
}
