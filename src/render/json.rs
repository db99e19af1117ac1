use serde::Serialize;

/// Render a report (single run or scalability) as pretty-printed JSON.
pub fn render_json_report<T: Serialize>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}
