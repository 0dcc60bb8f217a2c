use super::DEFAULT_DATE_FORMAT;

/// Locale tokens the server may announce at login, paired with the chrono
/// pattern that formats dates the same way.
const DATE_FORMATS: [(&str, &str); 9] = [
    ("yyyy-MM-dd", "%Y-%m-%d"),
    ("yyyy/MM/dd", "%Y/%m/%d"),
    ("dd/MM/yyyy", "%d/%m/%Y"),
    ("MM/dd/yyyy", "%m/%d/%Y"),
    ("dd-MM-yyyy", "%d-%m-%Y"),
    ("MM-dd-yyyy", "%m-%d-%Y"),
    ("dd.MM.yyyy", "%d.%m.%Y"),
    ("M/d/yyyy", "%-m/%-d/%Y"),
    ("d/M/yyyy", "%-d/%-m/%Y"),
];

pub fn pattern_for(token: &str) -> Option<&'static str> {
    DATE_FORMATS
        .iter()
        .find(|(known, _)| *known == token.trim())
        .map(|(_, pattern)| *pattern)
}

/// Pattern for `token`, falling back to the previously stored pattern and
/// then to ISO dates.
pub fn resolve(token: Option<&str>, previous: Option<&str>) -> String {
    token
        .and_then(pattern_for)
        .or(previous)
        .unwrap_or(DEFAULT_DATE_FORMAT)
        .to_string()
}
