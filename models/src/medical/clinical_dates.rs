// models/src/medical/clinical_dates.rs
use serde::{Deserialize, Serialize};

/// The six dates a report may carry, each an ISO `YYYY-MM-DD` string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalDates {
    pub visit_date: Option<String>,
    pub test_date: Option<String>,
    pub prescription_date: Option<String>,
    pub lab_date: Option<String>,
    pub discharge_date: Option<String>,
    pub report_date: Option<String>,
}

/// Field selector, declared in primary-date precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClinicalDateField {
    Visit,
    Test,
    Prescription,
    Lab,
    Discharge,
    Report,
}

impl ClinicalDateField {
    pub const PRECEDENCE: [ClinicalDateField; 6] = [
        ClinicalDateField::Visit,
        ClinicalDateField::Test,
        ClinicalDateField::Prescription,
        ClinicalDateField::Lab,
        ClinicalDateField::Discharge,
        ClinicalDateField::Report,
    ];

    /// Key used in structured metadata.
    pub fn key(&self) -> &'static str {
        match self {
            ClinicalDateField::Visit => "visitDate",
            ClinicalDateField::Test => "testDate",
            ClinicalDateField::Prescription => "prescriptionDate",
            ClinicalDateField::Lab => "labDate",
            ClinicalDateField::Discharge => "dischargeDate",
            ClinicalDateField::Report => "reportDate",
        }
    }
}

impl ClinicalDates {
    pub fn get(&self, field: ClinicalDateField) -> Option<&String> {
        match field {
            ClinicalDateField::Visit => self.visit_date.as_ref(),
            ClinicalDateField::Test => self.test_date.as_ref(),
            ClinicalDateField::Prescription => self.prescription_date.as_ref(),
            ClinicalDateField::Lab => self.lab_date.as_ref(),
            ClinicalDateField::Discharge => self.discharge_date.as_ref(),
            ClinicalDateField::Report => self.report_date.as_ref(),
        }
    }

    pub fn set(&mut self, field: ClinicalDateField, value: Option<String>) {
        let slot = match field {
            ClinicalDateField::Visit => &mut self.visit_date,
            ClinicalDateField::Test => &mut self.test_date,
            ClinicalDateField::Prescription => &mut self.prescription_date,
            ClinicalDateField::Lab => &mut self.lab_date,
            ClinicalDateField::Discharge => &mut self.discharge_date,
            ClinicalDateField::Report => &mut self.report_date,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        ClinicalDateField::PRECEDENCE.iter().all(|f| self.get(*f).is_none())
    }
}
