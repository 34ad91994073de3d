//! Patient registry models.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{impl_label_traits, label_key, now_rfc3339, Gender, UnknownVariant};
use crate::view::Listable;

/// Whether a file belongs to one person or heads a family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FileType {
    Individual,
    Family,
}

impl FileType {
    pub fn label(&self) -> &'static str {
        match self {
            FileType::Individual => "Individual",
            FileType::Family => "Family",
        }
    }
}

/// Inpatient (IPD) or outpatient (OPD).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PatientType {
    Inpatient,
    Outpatient,
}

impl PatientType {
    pub fn label(&self) -> &'static str {
        match self {
            PatientType::Inpatient => "Inpatient",
            PatientType::Outpatient => "Outpatient",
        }
    }

    /// Department code shown on wristbands and reports.
    pub fn code(&self) -> &'static str {
        match self {
            PatientType::Inpatient => "IPD",
            PatientType::Outpatient => "OPD",
        }
    }
}

/// Registration status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PatientStatus {
    Active,
    Admitted,
    Discharged,
    PendingPayment,
}

impl PatientStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PatientStatus::Active => "Active",
            PatientStatus::Admitted => "Admitted",
            PatientStatus::Discharged => "Discharged",
            PatientStatus::PendingPayment => "Pending Payment",
        }
    }
}

impl_label_traits!(FileType, "file type", {
    "individual" => FileType::Individual,
    "family" => FileType::Family,
});

impl_label_traits!(PatientType, "patient type", {
    "inpatient" => PatientType::Inpatient,
    "ipd" => PatientType::Inpatient,
    "outpatient" => PatientType::Outpatient,
    "opd" => PatientType::Outpatient,
});

impl_label_traits!(PatientStatus, "patient status", {
    "active" => PatientStatus::Active,
    "admitted" => PatientStatus::Admitted,
    "discharged" => PatientStatus::Discharged,
    "pendingpayment" => PatientStatus::PendingPayment,
});

/// A registered patient file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// File number, e.g. `GH-2025-00001`
    pub file_number: String,
    /// Full name
    pub name: String,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone: String,
    pub address: String,
    pub email: Option<String>,
    /// Next of kin name and contact
    pub next_of_kin: Option<String>,
    pub file_type: FileType,
    pub patient_type: PatientType,
    pub status: PatientStatus,
    pub is_dead: bool,
    pub date_of_death: Option<NaiveDate>,
    /// File number of the Family file this patient belongs to
    pub parent_file_id: Option<String>,
    /// Registration date (used for date-range filtering)
    pub registered_on: NaiveDate,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Patient {
    /// Build a patient record from a validated registration form.
    pub fn from_registration(file_number: String, form: NewPatient, registered_on: NaiveDate) -> Self {
        let now = now_rfc3339();
        Self {
            file_number,
            name: form.name.trim().to_string(),
            date_of_birth: form.date_of_birth,
            gender: form.gender,
            phone: form.phone.trim().to_string(),
            address: form.address.trim().to_string(),
            email: form.email,
            next_of_kin: form.next_of_kin,
            file_type: form.file_type,
            patient_type: form.patient_type,
            status: PatientStatus::Active,
            is_dead: false,
            date_of_death: None,
            parent_file_id: form.parent_file_id,
            registered_on,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Age in whole years on the given date.
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        date.years_since(self.date_of_birth).unwrap_or(0)
    }

    /// Whether this file heads a family.
    pub fn is_family_head(&self) -> bool {
        self.file_type == FileType::Family
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = now_rfc3339();
    }
}

/// Registration form input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone: String,
    pub address: String,
    pub email: Option<String>,
    pub next_of_kin: Option<String>,
    pub file_type: FileType,
    pub patient_type: PatientType,
    pub parent_file_id: Option<String>,
}

impl NewPatient {
    /// Create a registration form with required fields; optional fields empty.
    pub fn new(
        name: impl Into<String>,
        date_of_birth: NaiveDate,
        gender: Gender,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date_of_birth,
            gender,
            phone: phone.into(),
            address: String::new(),
            email: None,
            next_of_kin: None,
            file_type: FileType::Individual,
            patient_type: PatientType::Outpatient,
            parent_file_id: None,
        }
    }
}

/// Partial edit of a patient file. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub next_of_kin: Option<String>,
    pub file_type: Option<FileType>,
    pub patient_type: Option<PatientType>,
    pub status: Option<PatientStatus>,
    /// `Some(None)` unlinks the patient from its family file
    pub parent_file_id: Option<Option<String>>,
}

/// Fields of a patient that searches and filters can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientField {
    FileNumber,
    Name,
    Phone,
    Address,
    Email,
    Gender,
    FileType,
    PatientType,
    Status,
    ParentFile,
    Deceased,
}

impl FromStr for PatientField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "filenumber" | "fileno" | "id" => Ok(PatientField::FileNumber),
            "name" => Ok(PatientField::Name),
            "phone" => Ok(PatientField::Phone),
            "address" => Ok(PatientField::Address),
            "email" => Ok(PatientField::Email),
            "gender" => Ok(PatientField::Gender),
            "filetype" => Ok(PatientField::FileType),
            "patienttype" => Ok(PatientField::PatientType),
            "status" => Ok(PatientField::Status),
            "parentfileid" | "parentfile" => Ok(PatientField::ParentFile),
            "deceased" | "isdead" => Ok(PatientField::Deceased),
            _ => Err(UnknownVariant::new("patient field", s)),
        }
    }
}

impl Listable for Patient {
    type Field = PatientField;

    const SEARCH_FIELDS: &'static [PatientField] = &[
        PatientField::FileNumber,
        PatientField::Name,
        PatientField::Phone,
        PatientField::Email,
    ];
    const EMPTY_MESSAGE: &'static str = "No patients found";

    fn id(&self) -> &str {
        &self.file_number
    }

    fn text(&self, field: PatientField) -> Option<Cow<'_, str>> {
        match field {
            PatientField::FileNumber => Some(Cow::Borrowed(&self.file_number)),
            PatientField::Name => Some(Cow::Borrowed(&self.name)),
            PatientField::Phone => Some(Cow::Borrowed(&self.phone)),
            PatientField::Address => Some(Cow::Borrowed(&self.address)),
            PatientField::Email => self.email.as_deref().map(Cow::Borrowed),
            PatientField::Gender => Some(Cow::Borrowed(self.gender.label())),
            PatientField::FileType => Some(Cow::Borrowed(self.file_type.label())),
            PatientField::PatientType => Some(Cow::Borrowed(self.patient_type.label())),
            PatientField::Status => Some(Cow::Borrowed(self.status.label())),
            PatientField::ParentFile => self.parent_file_id.as_deref().map(Cow::Borrowed),
            PatientField::Deceased => Some(Cow::Borrowed(if self.is_dead { "Yes" } else { "No" })),
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.registered_on)
    }
}
