//! Staff roster models.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{impl_label_traits, label_key, now_rfc3339, Gender, UnknownVariant};
use crate::view::Listable;

/// Employment status on the roster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StaffStatus {
    Active,
    OnLeave,
    Suspended,
    Resigned,
}

impl StaffStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StaffStatus::Active => "Active",
            StaffStatus::OnLeave => "On Leave",
            StaffStatus::Suspended => "Suspended",
            StaffStatus::Resigned => "Resigned",
        }
    }

    /// Whether the roster allows moving from `self` to `next`.
    ///
    /// Active and Suspended toggle (deactivate/reactivate), Active and
    /// On Leave toggle, and every non-terminal status may resign.
    /// Resigned is terminal.
    pub fn can_transition_to(&self, next: StaffStatus) -> bool {
        use StaffStatus::*;
        matches!(
            (self, next),
            (Active, Suspended)
                | (Suspended, Active)
                | (Active, OnLeave)
                | (OnLeave, Active)
                | (Active, Resigned)
                | (Suspended, Resigned)
                | (OnLeave, Resigned)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StaffStatus::Resigned)
    }
}

/// Contract type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
}

impl EmploymentType {
    pub fn label(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::Contract => "Contract",
        }
    }
}

impl_label_traits!(StaffStatus, "staff status", {
    "active" => StaffStatus::Active,
    "onleave" => StaffStatus::OnLeave,
    "suspended" => StaffStatus::Suspended,
    "resigned" => StaffStatus::Resigned,
});

impl_label_traits!(EmploymentType, "employment type", {
    "fulltime" => EmploymentType::FullTime,
    "parttime" => EmploymentType::PartTime,
    "contract" => EmploymentType::Contract,
});

/// A member of staff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Staff {
    /// Staff ID, e.g. `STF-0001`
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,
    pub department: String,
    pub role: String,
    pub employment_type: EmploymentType,
    pub date_joined: NaiveDate,
    pub status: StaffStatus,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Staff {
    /// Build a staff record from a validated form. New staff start Active.
    pub fn from_form(id: String, form: NewStaff) -> Self {
        let now = now_rfc3339();
        Self {
            id,
            name: form.name.trim().to_string(),
            gender: form.gender,
            phone: form.phone.trim().to_string(),
            email: form.email,
            department: form.department.trim().to_string(),
            role: form.role.trim().to_string(),
            employment_type: form.employment_type,
            date_joined: form.date_joined,
            status: StaffStatus::Active,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == StaffStatus::Active
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = now_rfc3339();
    }
}

/// Add-staff form input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewStaff {
    pub name: String,
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,
    pub department: String,
    pub role: String,
    pub employment_type: EmploymentType,
    pub date_joined: NaiveDate,
}

impl NewStaff {
    pub fn new(
        name: impl Into<String>,
        department: impl Into<String>,
        role: impl Into<String>,
        date_joined: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            gender: Gender::Other,
            phone: String::new(),
            email: None,
            department: department.into(),
            role: role.into(),
            employment_type: EmploymentType::FullTime,
            date_joined,
        }
    }
}

/// Partial edit of a staff record. Status changes go through the
/// dedicated transitions instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub date_joined: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaffField {
    Id,
    Name,
    Phone,
    Email,
    Gender,
    Department,
    Role,
    EmploymentType,
    Status,
}

impl FromStr for StaffField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "id" | "staffid" => Ok(StaffField::Id),
            "name" => Ok(StaffField::Name),
            "phone" => Ok(StaffField::Phone),
            "email" => Ok(StaffField::Email),
            "gender" => Ok(StaffField::Gender),
            "department" => Ok(StaffField::Department),
            "role" => Ok(StaffField::Role),
            "employmenttype" => Ok(StaffField::EmploymentType),
            "status" => Ok(StaffField::Status),
            _ => Err(UnknownVariant::new("staff field", s)),
        }
    }
}

impl Listable for Staff {
    type Field = StaffField;

    const SEARCH_FIELDS: &'static [StaffField] = &[
        StaffField::Id,
        StaffField::Name,
        StaffField::Department,
        StaffField::Role,
    ];
    const EMPTY_MESSAGE: &'static str = "No staff members found";

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self, field: StaffField) -> Option<Cow<'_, str>> {
        match field {
            StaffField::Id => Some(Cow::Borrowed(&self.id)),
            StaffField::Name => Some(Cow::Borrowed(&self.name)),
            StaffField::Phone => Some(Cow::Borrowed(&self.phone)),
            StaffField::Email => self.email.as_deref().map(Cow::Borrowed),
            StaffField::Gender => Some(Cow::Borrowed(self.gender.label())),
            StaffField::Department => Some(Cow::Borrowed(&self.department)),
            StaffField::Role => Some(Cow::Borrowed(&self.role)),
            StaffField::EmploymentType => Some(Cow::Borrowed(self.employment_type.label())),
            StaffField::Status => Some(Cow::Borrowed(self.status.label())),
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date_joined)
    }
}
