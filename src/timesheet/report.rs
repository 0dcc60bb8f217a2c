use super::dates::parse_server_date;
use crate::config::Context;
use crate::output::text;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

const PROJECT_NAME_WIDTH: usize = 60;

fn truncated(name: &str) -> String {
    name.chars().take(PROJECT_NAME_WIDTH).collect()
}

/// Maps project display names to the name of the context bound to that
/// project, so the listing shows the user's own shorthand.
pub fn context_names(projects: &[Value], contexts: &BTreeMap<String, Context>) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for project in projects {
        let id = text(&project["Id"]);
        for (name, ctx) in contexts {
            if ctx.project_id == id {
                names.insert(truncated(&text(&project["Display"])), name.clone());
            }
        }
    }
    names
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Columns {
    pub weekday: bool,
    pub id: bool,
}

impl Columns {
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = Vec::new();
        if self.weekday {
            headers.push("Weekday");
        }
        headers.extend(["Date", "Project", "Description", "Hrs"]);
        if self.id {
            headers.push("ID");
        }
        headers
    }
}

/// Renders server rows as table cells. Dates are shown in `date_format`.
pub fn entry_rows(
    rows: &[Value],
    columns: Columns,
    project_names: &HashMap<String, String>,
    date_format: &str,
) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let raw_date = text(&row["Date"]);
            let date = parse_server_date(&raw_date);
            let mut cells = Vec::new();

            if columns.weekday {
                cells.push(date.map(|d| d.format("%A").to_string()).unwrap_or_default());
            }
            cells.push(
                date.map(|d| d.format(date_format).to_string())
                    .unwrap_or(raw_date),
            );

            let project = text(&row["ProjectName"]);
            cells.push(
                project_names
                    .get(&truncated(&project))
                    .cloned()
                    .unwrap_or(project),
            );
            cells.push(text(&row["Description"]));
            cells.push(text(&row["Quantity"]));

            if columns.id {
                cells.push(text(&row["Id"]));
            }
            cells
        })
        .collect()
}

/// Hours per project in order of first appearance, followed by `TOTAL`.
pub fn totals(rows: &[Value]) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();

    for row in rows {
        let project = text(&row["ProjectName"]);
        let hours = row["Quantity"].as_f64().unwrap_or(0.0);
        match totals.iter_mut().find(|(name, _)| *name == project) {
            Some((_, sum)) => *sum += hours,
            None => totals.push((project, hours)),
        }
    }

    let total: f64 = totals.iter().map(|(_, hours)| hours).sum();
    totals.push(("TOTAL".to_string(), total));
    totals
}
