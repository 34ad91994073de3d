//! Staff attendance models.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::common::{format_clock_time, impl_label_traits, label_key, UnknownVariant};
use super::staff::Staff;
use crate::view::Listable;

/// Attendance outcome for one staff member on one day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    OnLeave,
}

impl AttendanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::OnLeave => "On Leave",
        }
    }

    /// Present or late both count as having turned up.
    pub fn is_attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

impl_label_traits!(AttendanceStatus, "attendance status", {
    "present" => AttendanceStatus::Present,
    "late" => AttendanceStatus::Late,
    "absent" => AttendanceStatus::Absent,
    "onleave" => AttendanceStatus::OnLeave,
});

/// One login/logout pair on a multi-session day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttendanceSession {
    pub login: NaiveTime,
    /// Open sessions have no logout yet
    pub logout: Option<NaiveTime>,
}

impl AttendanceSession {
    pub fn is_open(&self) -> bool {
        self.logout.is_none()
    }

    /// Worked minutes for a closed session.
    pub fn minutes(&self) -> Option<i64> {
        self.logout.map(|out| (out - self.login).num_minutes())
    }
}

/// Attendance for one staff member on one day.
///
/// Stored records are created by check-in or explicit marking. Synthetic
/// records are Absent placeholders projected at read time for active staff
/// with nothing stored that day; they are never written to the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffAttendance {
    /// `ATT-000001` for stored records, `ABS-<staff id>-<date>` for synthetic
    pub id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub department: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// First login of the day
    pub check_in: Option<NaiveTime>,
    /// Last logout of the day
    pub check_out: Option<NaiveTime>,
    /// Minutes after shift start at first check-in
    pub late_minutes: u32,
    pub sessions: Vec<AttendanceSession>,
    pub notes: Option<String>,
    /// True for read-time Absent placeholders
    pub synthetic: bool,
}

impl StaffAttendance {
    /// Deterministic id for a synthetic Absent record.
    pub fn synthetic_id(staff_id: &str, date: NaiveDate) -> String {
        format!("ABS-{}-{}", staff_id, date.format("%Y%m%d"))
    }

    /// Absent placeholder for a staff member with no stored record on `date`.
    pub fn absent_placeholder(staff: &Staff, date: NaiveDate) -> Self {
        Self {
            id: Self::synthetic_id(&staff.id, date),
            staff_id: staff.id.clone(),
            staff_name: staff.name.clone(),
            department: staff.department.clone(),
            date,
            status: AttendanceStatus::Absent,
            check_in: None,
            check_out: None,
            late_minutes: 0,
            sessions: Vec::new(),
            notes: None,
            synthetic: true,
        }
    }

    /// A stored record with no sessions yet.
    pub fn stored(id: String, staff: &Staff, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            id,
            staff_id: staff.id.clone(),
            staff_name: staff.name.clone(),
            department: staff.department.clone(),
            date,
            status,
            check_in: None,
            check_out: None,
            late_minutes: 0,
            sessions: Vec::new(),
            notes: None,
            synthetic: false,
        }
    }

    /// The currently open session, if any.
    pub fn open_session(&self) -> Option<&AttendanceSession> {
        self.sessions.iter().rev().find(|s| s.is_open())
    }

    /// Total minutes across closed sessions.
    pub fn worked_minutes(&self) -> i64 {
        self.sessions.iter().filter_map(|s| s.minutes()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceField {
    StaffId,
    StaffName,
    Department,
    Status,
    CheckIn,
}

impl FromStr for AttendanceField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "staffid" | "id" => Ok(AttendanceField::StaffId),
            "staffname" | "name" => Ok(AttendanceField::StaffName),
            "department" => Ok(AttendanceField::Department),
            "status" => Ok(AttendanceField::Status),
            "checkin" | "checkintime" => Ok(AttendanceField::CheckIn),
            _ => Err(UnknownVariant::new("attendance field", s)),
        }
    }
}

impl Listable for StaffAttendance {
    type Field = AttendanceField;

    const SEARCH_FIELDS: &'static [AttendanceField] = &[
        AttendanceField::StaffId,
        AttendanceField::StaffName,
        AttendanceField::Department,
    ];
    const EMPTY_MESSAGE: &'static str = "No attendance records for this period";

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self, field: AttendanceField) -> Option<Cow<'_, str>> {
        match field {
            AttendanceField::StaffId => Some(Cow::Borrowed(&self.staff_id)),
            AttendanceField::StaffName => Some(Cow::Borrowed(&self.staff_name)),
            AttendanceField::Department => Some(Cow::Borrowed(&self.department)),
            AttendanceField::Status => Some(Cow::Borrowed(self.status.label())),
            AttendanceField::CheckIn => self.check_in.map(|t| Cow::Owned(format_clock_time(t))),
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewStaff;

    fn make_staff() -> Staff {
        Staff::from_form(
            "STF-0007".into(),
            NewStaff::new(
                "Esi Owusu",
                "Nursing",
                "Nurse",
                NaiveDate::from_ymd_opt(2022, 4, 1).unwrap(),
            ),
        )
    }

    #[test]
    fn test_synthetic_id_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let staff = make_staff();
        let a = StaffAttendance::absent_placeholder(&staff, date);
        let b = StaffAttendance::absent_placeholder(&staff, date);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, "ABS-STF-0007-20250502");
        assert!(a.synthetic);
        assert_eq!(a.status, AttendanceStatus::Absent);
    }

    #[test]
    fn test_worked_minutes() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let mut record =
            StaffAttendance::stored("ATT-000001".into(), &make_staff(), date, AttendanceStatus::Present);
        record.sessions = vec![
            AttendanceSession {
                login: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                logout: NaiveTime::from_hms_opt(12, 0, 0),
            },
            AttendanceSession {
                login: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                logout: None,
            },
        ];
        assert_eq!(record.worked_minutes(), 240);
        assert!(record.open_session().is_some());
    }
}
