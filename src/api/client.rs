use super::error::{ApiError, ApiResult};
use super::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::datelit;
use crate::timesheet::{ApprovalRange, EntryRequest, ListQuery, delete_body};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const PAGE_SIZE: &str = "22";

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>(.*)</title>").expect("Could not parse Regex"));

/// The `<title>` of an HTML error page, which is the only detail Abak gives
/// about failed requests.
pub fn page_title(body: &str) -> Option<String> {
    TITLE
        .captures(body)
        .map(|captures| captures[1].trim().to_string())
        .filter(|title| !title.is_empty())
}

pub fn remote_error(response: &HttpResponse) -> ApiError {
    ApiError::Remote(
        page_title(&response.body).unwrap_or_else(|| format!("HTTP {}", response.status)),
    )
}

fn params(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// The `data` array most Abak endpoints wrap their rows in.
fn data_rows(value: Value) -> ApiResult<Vec<Value>> {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(rows)) => Ok(rows),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(ApiError::Unexpected(format!("data is not a list: {other}"))),
        },
        other => Err(ApiError::Unexpected(format!("expected an object, got {other}"))),
    }
}

/// Authenticated access to the Abak endpoints the CLI uses.
pub struct AbakClient<'a> {
    transport: &'a dyn Transport,
    endpoint: String,
    token: String,
}

impl<'a> AbakClient<'a> {
    pub fn new(transport: &'a dyn Transport, endpoint: &str, token: &str) -> Self {
        Self {
            transport,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{}", self.endpoint, path)).header("Cookie", &self.token)
    }

    fn execute(&self, request: HttpRequest) -> ApiResult<Value> {
        log::debug!("{} {}", request.method.as_str(), request.url);
        let response = self.transport.send(&request)?;

        if !response.is_success() {
            log::debug!("Abak answered {} for {}", response.status, request.url);
            return Err(remote_error(&response));
        }

        let body = datelit::decode(&response.body)?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn get(&self, path: &str, query: Vec<(String, String)>) -> ApiResult<Value> {
        self.execute(self.request(Method::Get, path).query(query))
    }

    pub fn post_form(&self, path: &str, form: Vec<(String, String)>) -> ApiResult<Value> {
        self.execute(
            self.request(Method::Post, path)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .form(form),
        )
    }

    pub fn post_json(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.execute(self.request(Method::Post, path).json(body))
    }

    /// Remote id of the logged-in employee. Doubles as the session probe.
    pub fn employee_id(&self) -> ApiResult<Value> {
        let employee = self.get("/Abak/Transact/GetEmployee_Optimized", Vec::new())?;
        data_rows(employee)?
            .into_iter()
            .next()
            .and_then(|row| row.get("Id").cloned())
            .ok_or_else(|| ApiError::Unexpected("employee record without an Id".into()))
    }

    pub fn clients(&self, user_id: &str, query_text: &str) -> ApiResult<Vec<Value>> {
        let query = params(&[
            ("queryText", query_text),
            ("start", "0"),
            ("limit", PAGE_SIZE),
            ("employeeId", user_id),
        ]);
        data_rows(self.get("/Abak/Common/GetTimesheetClientsPaginated", query)?)
    }

    pub fn projects(
        &self,
        user_id: &str,
        client_id: Option<&str>,
        query_text: &str,
    ) -> ApiResult<Vec<Value>> {
        let mut query = params(&[
            ("isInModif", "false"),
            ("queryText", query_text),
            ("start", "0"),
            ("limit", PAGE_SIZE),
            ("employeeId", user_id),
        ]);
        if let Some(client_id) = client_id {
            query.push(("clientId".into(), client_id.into()));
        }
        data_rows(self.get("/Abak/Common/GetTimesheetProjectsForPaginatedCombo", query)?)
    }

    pub fn entries(&self, query: &ListQuery, server_format: &str) -> ApiResult<Vec<Value>> {
        data_rows(self.post_form(
            "/Abak/Transact/GetGroupedTransacts",
            query.to_form(server_format),
        )?)
    }

    /// Creates an entry and returns its new id.
    pub fn create_entry(&self, entry: &EntryRequest, server_format: &str) -> ApiResult<String> {
        let result = self.post_form("/Abak/Timesheet/Edit", entry.to_form(server_format))?;
        let extra = &result["extraParams"];

        if result["success"].as_bool() != Some(true) {
            let message = extra["Message"]
                .as_str()
                .unwrap_or("there was an error with your request");
            return Err(ApiError::Remote(message.to_string()));
        }

        Ok(match &extra["newID"] {
            Value::String(id) => id.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub fn delete_entry(&self, id: &str) -> ApiResult<Value> {
        self.post_json("/Abak/Transact/DeleteTransacts", delete_body(id))
    }

    pub fn approvals(&self, range: &ApprovalRange, server_format: &str) -> ApiResult<Vec<Value>> {
        data_rows(self.post_json(
            "/Abak/Approval/GetApprovalsList",
            range.list_body(server_format),
        )?)
    }

    pub fn approve(&self, range: &ApprovalRange, server_format: &str) -> ApiResult<Value> {
        self.post_json(
            "/Abak/Approval/ApproveRangeFromApprobation",
            range.action_body(server_format),
        )
    }

    pub fn unapprove(&self, range: &ApprovalRange, server_format: &str) -> ApiResult<Value> {
        self.post_json("/Abak/Approval/UnapproveRange", range.action_body(server_format))
    }
}
