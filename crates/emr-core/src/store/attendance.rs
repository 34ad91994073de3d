//! Attendance operations and the daily roster projection.

use chrono::{NaiveDate, NaiveTime};

use super::{normalize_optional, not_found, Hospital, StoreError, StoreResult};
use crate::models::{parse_clock_time, AttendanceSession, AttendanceStatus, StaffAttendance, StaffStatus};

impl Hospital {
    /// Stored attendance records in creation order (no synthetic entries).
    pub fn attendance_records(&self) -> &[StaffAttendance] {
        &self.attendance
    }

    /// Stored history of one staff member.
    pub fn attendance_for_staff(&self, staff_id: &str) -> Vec<&StaffAttendance> {
        self.attendance
            .iter()
            .filter(|r| r.staff_id == staff_id)
            .collect()
    }

    /// The roster for one day: every stored record for `date`, plus a
    /// synthetic Absent entry for each Active staff member with nothing
    /// stored. Active staff appear in roster order; stored records of
    /// staff who are no longer active follow in creation order.
    ///
    /// Recomputed on every call; synthetic entries are never stored.
    pub fn attendance_for_day(&self, date: NaiveDate) -> Vec<StaffAttendance> {
        let mut day = Vec::with_capacity(self.staff.len());
        for staff in self.staff.iter().filter(|s| s.is_active()) {
            match self.stored_attendance(&staff.id, date) {
                Some(record) => day.push(record.clone()),
                None => day.push(StaffAttendance::absent_placeholder(staff, date)),
            }
        }
        for record in self.attendance.iter().filter(|r| r.date == date) {
            let listed = self
                .get_staff(&record.staff_id)
                .is_some_and(|staff| staff.is_active());
            if !listed {
                day.push(record.clone());
            }
        }
        day
    }

    /// Check a staff member in at `time` (`HH:MM`).
    ///
    /// The first check-in of the day creates the record and decides
    /// Present or Late against the shift start plus grace period. Later
    /// check-ins open another session on the same record.
    pub fn check_in(&mut self, staff_id: &str, date: NaiveDate, time: &str) -> StoreResult<StaffAttendance> {
        let time = parse_time("check_in", time)?;
        let staff_index = self.staff_index(staff_id)?;
        let staff = &self.staff[staff_index];
        if staff.status != StaffStatus::Active {
            tracing::warn!(staff_id, status = staff.status.label(), "rejected check-in");
            return Err(StoreError::InvalidTransition(format!(
                "staff {} is {} and cannot check in",
                staff_id,
                staff.status.label()
            )));
        }

        if let Some(index) = self.stored_attendance_index(staff_id, date) {
            let record = &mut self.attendance[index];
            if !record.status.is_attended() {
                return Err(StoreError::InvalidTransition(format!(
                    "{} is marked {} on {}",
                    staff_id,
                    record.status.label(),
                    date
                )));
            }
            if record.open_session().is_some() {
                return Err(StoreError::InvalidTransition(format!(
                    "{} is already checked in",
                    staff_id
                )));
            }
            if record.check_out.is_some_and(|out| time < out) {
                return Err(StoreError::invalid("check_in", "earlier than the last check-out"));
            }
            record.sessions.push(AttendanceSession { login: time, logout: None });
            tracing::info!(staff_id, %date, sessions = record.sessions.len(), "opened attendance session");
            return Ok(record.clone());
        }

        let late_minutes = self.late_minutes(time);
        let status = if late_minutes > 0 {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        };
        let id = self.sequences.attendance.next_id();
        let mut record = StaffAttendance::stored(id, &self.staff[staff_index], date, status);
        record.check_in = Some(time);
        record.sessions.push(AttendanceSession { login: time, logout: None });
        if status == AttendanceStatus::Late {
            record.late_minutes = late_minutes;
        }

        tracing::info!(staff_id, %date, status = status.label(), "checked in");
        self.attendance.push(record.clone());
        Ok(record)
    }

    /// Close the open session at `time` (`HH:MM`).
    pub fn check_out(&mut self, staff_id: &str, date: NaiveDate, time: &str) -> StoreResult<StaffAttendance> {
        let time = parse_time("check_out", time)?;
        let index = self
            .stored_attendance_index(staff_id, date)
            .ok_or_else(|| not_found("attendance", &format!("{} on {}", staff_id, date)))?;
        let record = &mut self.attendance[index];

        let Some(session) = record.sessions.iter_mut().rev().find(|s| s.is_open()) else {
            tracing::warn!(staff_id, %date, "check-out without open session");
            return Err(StoreError::InvalidTransition(format!(
                "{} is not checked in",
                staff_id
            )));
        };
        if time <= session.login {
            return Err(StoreError::invalid("check_out", "must be later than check-in"));
        }
        session.logout = Some(time);
        record.check_out = Some(time);

        tracing::info!(staff_id, %date, worked_minutes = record.worked_minutes(), "checked out");
        Ok(record.clone())
    }

    /// Explicitly mark a day as Absent or On Leave, with optional notes.
    ///
    /// Days with check-ins cannot be overridden; an existing mark is replaced.
    pub fn mark_attendance(
        &mut self,
        staff_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
        notes: Option<String>,
    ) -> StoreResult<StaffAttendance> {
        if status.is_attended() {
            return Err(StoreError::invalid("status", "present and late come from check-in"));
        }
        let staff_index = self.staff_index(staff_id)?;
        let staff_status = self.staff[staff_index].status;
        if status == AttendanceStatus::OnLeave && staff_status != StaffStatus::OnLeave {
            return Err(StoreError::InvalidTransition(format!(
                "staff {} is not on leave",
                staff_id
            )));
        }
        let notes = normalize_optional(notes);

        if let Some(index) = self.stored_attendance_index(staff_id, date) {
            let record = &mut self.attendance[index];
            if !record.sessions.is_empty() {
                return Err(StoreError::Constraint(format!(
                    "{} already checked in on {}",
                    staff_id, date
                )));
            }
            record.status = status;
            record.notes = notes;
            tracing::info!(staff_id, %date, status = status.label(), "re-marked attendance");
            return Ok(record.clone());
        }

        let id = self.sequences.attendance.next_id();
        let mut record = StaffAttendance::stored(id, &self.staff[staff_index], date, status);
        record.notes = notes;
        tracing::info!(staff_id, %date, status = status.label(), "marked attendance");
        self.attendance.push(record.clone());
        Ok(record)
    }

    fn stored_attendance(&self, staff_id: &str, date: NaiveDate) -> Option<&StaffAttendance> {
        self.attendance
            .iter()
            .find(|r| r.staff_id == staff_id && r.date == date)
    }

    fn stored_attendance_index(&self, staff_id: &str, date: NaiveDate) -> Option<usize> {
        self.attendance
            .iter()
            .position(|r| r.staff_id == staff_id && r.date == date)
    }

    /// Minutes past shift start, or 0 when within the grace period.
    fn late_minutes(&self, time: NaiveTime) -> u32 {
        let start = self.config.shift_start_time();
        let minutes = (time - start).num_minutes();
        if minutes <= i64::from(self.config.late_grace_minutes) {
            return 0;
        }
        u32::try_from(minutes).unwrap_or(u32::MAX)
    }
}

fn parse_time(field: &'static str, value: &str) -> StoreResult<NaiveTime> {
    if value.trim().is_empty() {
        return Err(StoreError::MissingField { field });
    }
    parse_clock_time(value).ok_or_else(|| StoreError::invalid(field, format!("expected HH:MM, got {:?}", value)))
}
