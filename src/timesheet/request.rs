use super::dates::QueryRange;
use super::error::{ValidationError, ValidationResult};
use chrono::NaiveDate;
use serde_json::{Value, json};

pub const MAX_DESCRIPTION: usize = 100;

pub fn validate_description(description: Option<&str>) -> ValidationResult<String> {
    match description.map(str::trim) {
        None | Some("") => Err(ValidationError::MissingDescription),
        Some(text) if text.chars().count() > MAX_DESCRIPTION => {
            Err(ValidationError::DescriptionTooLong(MAX_DESCRIPTION))
        }
        Some(text) => Ok(text.to_string()),
    }
}

pub fn require_id(name: &'static str, value: Option<&str>) -> ValidationResult<String> {
    value
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or(ValidationError::MissingId(name))
}

pub fn validate_hours(hours: f64) -> ValidationResult<f64> {
    if hours.is_finite() && hours > 0.0 {
        Ok(hours)
    } else {
        Err(ValidationError::InvalidHours(hours.to_string()))
    }
}

/// `8.0 hrs`, `7.5 hrs`
fn quantity(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.1} hrs")
    } else {
        format!("{hours} hrs")
    }
}

fn pairs(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Query for the entries around a reference date.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub user_id: String,
    pub date: NaiveDate,
    pub range: QueryRange,
}

impl ListQuery {
    pub fn to_form(&self, server_format: &str) -> Vec<(String, String)> {
        let date = format!("{}T00:00:00", self.date.format(server_format));
        pairs(&[
            ("groupBy", "TransactType"),
            ("groupDir", "ASC"),
            ("summaryFields", "Quantity"),
            ("summaryTypes", "sum"),
            ("sort", "Date"),
            ("dir", "ASC"),
            ("employe", self.user_id.as_str()),
            ("date", date.as_str()),
            ("range", self.range.as_str()),
        ])
    }
}

/// A new timesheet entry, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRequest {
    pub user_id: String,
    pub client_id: String,
    pub project_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub hours: f64,
}

impl EntryRequest {
    /// The form the timesheet editor of the web UI posts. Most fields are
    /// empty but the server rejects the request without them.
    pub fn to_form(&self, server_format: &str) -> Vec<(String, String)> {
        let date = self.date.format(server_format).to_string();
        let quantity = quantity(self.hours);

        pairs(&[
            ("MIME Type", "application/x-www-form-urlencoded; charset=UTF-8"),
            ("fieldDate", date.as_str()),
            ("typeTab", "timesheetDetail"),
            ("", "true"),
            ("rangeField", "Weekly"),
            ("defaultDate", date.as_str()),
            ("fieldId", ""),
            ("fieldIsDuplicatingTs", "False"),
            ("fieldEmployeeId", self.user_id.as_str()),
            ("isPhaseEmplAssigned", ""),
            ("isDefaultTaskAssignedOnEmp", ""),
            ("isDefaultPayCodeAssignedOnEmp", ""),
            ("defaultPayCodeAssignedOnEmp", ""),
            ("taskDefaultPayCode", ""),
            ("isDefaultTaskAssignedOnFun", ""),
            ("isDefaultPayCodeAssignedOnFun", ""),
            ("defaultPayCodeAssignedOnFun", ""),
            ("isPhaseFunctionAssigned", ""),
            ("taskDefaultTaskCode", ""),
            ("phaseDefaultPayCode", ""),
            ("functionDefaultTaskCode", ""),
            ("phaseDefaultDepartment", ""),
            ("phaseDefaultReference", ""),
            ("isPhaseBillable", ""),
            ("phaseDefaultExpenseType", ""),
            ("defaultDepartmentAssignedOnEmp", ""),
            ("defaultReferenceAssignedOnEmp", ""),
            ("defaultExpenseTypeAssignedOnEmp", ""),
            ("defaultDepartmentAssignedOnFun", ""),
            ("defaultReferenceAssignedOnFun", ""),
            ("defaultExpenseTypeAssignedOnFun", ""),
            ("defaultTaskAssignedOnEmp", ""),
            ("defaultTaskAssignedOnFun", ""),
            ("defaultPayCodeOnTaskAssignedOnEmp", ""),
            ("defaultPayCodeOnTaskAssignedOnFun", ""),
            ("phaseDescFr", ""),
            ("phaseDescEn", ""),
            ("phaseDesc", ""),
            ("queryTextField", "Consulting by Associate (CONS)"),
            ("fieldManualCost", ""),
            ("fieldManualDayCost", ""),
            ("fieldManualSelling", ""),
            ("fieldManualDaySelling", ""),
            ("fieldcheckPaySystem", "fieldcheckPaySystem"),
            ("fieldcheckPaySystemSate", "fieldcheckPaySystemSate"),
            ("payCodeIsInList", "true"),
            ("clientIsInList", "true"),
            ("projectIsInList", "true"),
            ("taskCodeIsInList", "true"),
            ("departmentIsInList", "true"),
            ("datebookId", ""),
            ("fieldClientId_Value", self.client_id.as_str()),
            ("fieldClientId_SelIndex", "-1"),
            ("fieldProjectId_Value", self.project_id.as_str()),
            ("fieldProjectId_SelIndex", "-1"),
            ("fieldTaskCode_Value", "CONS"),
            ("fieldTaskCode_SelIndex", "-1"),
            ("fieldPhaseId", ""),
            ("fieldPhaseId_current", ""),
            ("fieldPhaseIdReal", ""),
            ("fieldMSProjectCode", ""),
            ("fieldMsProject", ""),
            ("fieldDescription_Value", self.description.as_str()),
            ("fieldDescription", self.description.as_str()),
            ("fieldDescription_SelIndex", "-1"),
            ("fieldReference", ""),
            ("fieldIsPrintOnInvoice", "fieldIsPrintOnInvoice"),
            ("fieldDepartmentId_Value", ""),
            ("fieldDepartmentId", ""),
            ("fieldDepartmentId_SelIndex", "-1"),
            ("fieldPayCode_Value", "REG"),
            ("fieldPayCode", "Regular (REG)"),
            ("fieldPayCode_SelIndex", "-1"),
            ("fieldIsAffectingTimebank", "fieldIsAffectingTimebank"),
            ("fieldQuantity", quantity.as_str()),
            ("fieldTimeStart_Value", ""),
            ("fieldTimeStart", ""),
            ("fieldTimeStart_SelIndex", "-1"),
            ("fieldTimeEnd_Value", ""),
            ("fieldTimeEnd", ""),
            ("fieldTimeEnd_SelIndex", "-1"),
            ("fieldLunchTime", "0.00 hrs"),
            ("fieldIsBillable", "fieldIsBillable"),
            ("fieldBillableQuantity", quantity.as_str()),
            ("panelGroupInvoicableTimesheetDetailFieldUnitCost", "0.0000 $"),
            ("TimesheetDetailFieldSubTotal", "0.00 $"),
            ("fieldEmployeeTimesheetDetail", ""),
            ("fieldNote", ""),
            ("billableDescriptionTimesheetDetail", ""),
            ("fieldBillableNoteTimesheetDetail", ""),
            ("tabPanel_ActiveTab", "tabDetail"),
        ])
    }
}

/// Inclusive date range for approval.
#[derive(Debug, Clone)]
pub struct ApprovalRange {
    pub user_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ApprovalRange {
    pub fn list_body(&self, server_format: &str) -> Value {
        json!({
            "MIME Type": "application/x-www-form-urlencoded; charset=UTF-8",
            "employeeId": self.user_id,
            "groupBy": "Date",
            "groupDir": "ASC",
            "summaryFields": "TotalExpense",
            "summaryTypes": "sum",
            "sort": "Date",
            "dir": "DESC",
            "startDate": format!("{}T00:00:00", self.start.format(server_format)),
            "endDate": format!("{}T00:00:00", self.end.format(server_format)),
            "approvalType": "Timesheet",
            "start": "0",
            "limit": "50",
        })
    }

    pub fn action_body(&self, server_format: &str) -> Value {
        json!({
            "MIME Type": "application/x-www-form-urlencoded; charset=UTF-8",
            "approvalType": "Timesheet",
            "employeeId": self.user_id,
            "startDate": self.start.format(server_format).to_string(),
            "endDate": self.end.format(server_format).to_string(),
        })
    }
}

pub fn delete_body(id: &str) -> Value {
    json!({ "transacts": [{ "key": id, "value": "T" }] })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(form: &'a [(String, String)], key: &str) -> &'a str {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn description_is_required_and_bounded() {
        assert!(matches!(
            validate_description(None),
            Err(ValidationError::MissingDescription)
        ));
        assert!(matches!(
            validate_description(Some("   ")),
            Err(ValidationError::MissingDescription)
        ));
        let long = "x".repeat(101);
        assert!(matches!(
            validate_description(Some(long.as_str())),
            Err(ValidationError::DescriptionTooLong(100))
        ));
        assert_eq!(
            validate_description(Some("y".repeat(100).as_str())).unwrap().len(),
            100
        );
    }

    #[test]
    fn ids_must_be_present() {
        assert!(matches!(
            require_id("client id", None),
            Err(ValidationError::MissingId("client id"))
        ));
        assert_eq!(require_id("client id", Some(" C-1 ")).unwrap(), "C-1");
    }

    #[test]
    fn hours_must_be_positive() {
        assert!(validate_hours(0.0).is_err());
        assert!(validate_hours(-2.0).is_err());
        assert_eq!(validate_hours(7.5).unwrap(), 7.5);
    }

    #[test]
    fn entry_form_uses_server_date_format_and_hour_quantities() {
        let entry = EntryRequest {
            user_id: "42".into(),
            client_id: "C-1".into(),
            project_id: "P-1".into(),
            date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            description: "Code review".into(),
            hours: 8.0,
        };
        let form = entry.to_form("%d/%m/%Y");

        assert_eq!(field(&form, "fieldDate"), "02/04/2024");
        assert_eq!(field(&form, "fieldQuantity"), "8.0 hrs");
        assert_eq!(field(&form, "fieldBillableQuantity"), "8.0 hrs");
        assert_eq!(field(&form, "fieldClientId_Value"), "C-1");
        assert_eq!(field(&form, "fieldProjectId_Value"), "P-1");
        assert_eq!(field(&form, "fieldEmployeeId"), "42");

        let half = EntryRequest { hours: 7.5, ..entry };
        assert_eq!(field(&half.to_form("%Y-%m-%d"), "fieldQuantity"), "7.5 hrs");
    }

    #[test]
    fn list_query_appends_midnight() {
        let query = ListQuery {
            user_id: "42".into(),
            date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            range: QueryRange::Monthly,
        };
        let form = query.to_form("%Y-%m-%d");
        assert_eq!(field(&form, "date"), "2024-04-02T00:00:00");
        assert_eq!(field(&form, "range"), "Monthly");
        assert_eq!(field(&form, "employe"), "42");
    }

    #[test]
    fn approval_bodies_carry_the_range() {
        let range = ApprovalRange {
            user_id: "42".into(),
            start: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(),
        };
        let list = range.list_body("%Y-%m-%d");
        assert_eq!(list["startDate"], "2024-04-01T00:00:00");
        assert_eq!(list["endDate"], "2024-04-05T00:00:00");

        let action = range.action_body("%Y-%m-%d");
        assert_eq!(action["startDate"], "2024-04-01");
        assert_eq!(action["employeeId"], "42");
    }
}
