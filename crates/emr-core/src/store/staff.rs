//! Staff roster operations.

use super::{normalize_optional, not_found, require, Hospital, StoreError, StoreResult};
use crate::models::{NewStaff, Staff, StaffStatus, StaffUpdate};

impl Hospital {
    /// All staff in roster order.
    pub fn staff(&self) -> &[Staff] {
        &self.staff
    }

    pub fn get_staff(&self, id: &str) -> Option<&Staff> {
        self.staff.iter().find(|s| s.id == id)
    }

    /// Add a staff member. New staff start Active.
    pub fn add_staff(&mut self, mut form: NewStaff) -> StoreResult<Staff> {
        require("name", &form.name)?;
        require("department", &form.department)?;
        require("role", &form.role)?;
        form.email = normalize_optional(form.email);

        let id = self.sequences.staff.next_id();
        let staff = Staff::from_form(id, form);
        tracing::info!(staff_id = %staff.id, department = %staff.department, "added staff");
        self.staff.push(staff.clone());
        Ok(staff)
    }

    /// Edit non-status fields of a staff record.
    pub fn update_staff(&mut self, id: &str, update: StaffUpdate) -> StoreResult<Staff> {
        let index = self.staff_index(id)?;
        let mut staff = self.staff[index].clone();

        if let Some(name) = update.name {
            require("name", &name)?;
            staff.name = name.trim().to_string();
        }
        if let Some(department) = update.department {
            require("department", &department)?;
            staff.department = department.trim().to_string();
        }
        if let Some(role) = update.role {
            require("role", &role)?;
            staff.role = role.trim().to_string();
        }
        if let Some(gender) = update.gender {
            staff.gender = gender;
        }
        if let Some(phone) = update.phone {
            staff.phone = phone.trim().to_string();
        }
        if let Some(email) = update.email {
            staff.email = normalize_optional(Some(email));
        }
        if let Some(employment_type) = update.employment_type {
            staff.employment_type = employment_type;
        }
        if let Some(date_joined) = update.date_joined {
            staff.date_joined = date_joined;
        }

        staff.touch();
        self.staff[index] = staff.clone();
        tracing::info!(staff_id = id, "updated staff");
        Ok(staff)
    }

    /// Move a staff member to `next`, if the roster allows it.
    pub fn set_staff_status(&mut self, id: &str, next: StaffStatus) -> StoreResult<Staff> {
        let index = self.staff_index(id)?;
        let staff = &mut self.staff[index];

        if !staff.status.can_transition_to(next) {
            tracing::warn!(staff_id = id, from = staff.status.label(), to = next.label(), "rejected staff transition");
            return Err(StoreError::InvalidTransition(format!(
                "staff {} cannot go from {} to {}",
                id,
                staff.status.label(),
                next.label()
            )));
        }

        staff.status = next;
        staff.touch();
        tracing::info!(staff_id = id, status = next.label(), "changed staff status");
        Ok(staff.clone())
    }

    /// Active → Suspended.
    pub fn deactivate_staff(&mut self, id: &str) -> StoreResult<Staff> {
        self.require_status(id, StaffStatus::Active)?;
        self.set_staff_status(id, StaffStatus::Suspended)
    }

    /// Suspended → Active.
    pub fn reactivate_staff(&mut self, id: &str) -> StoreResult<Staff> {
        self.require_status(id, StaffStatus::Suspended)?;
        self.set_staff_status(id, StaffStatus::Active)
    }

    /// Active → On Leave.
    pub fn begin_leave(&mut self, id: &str) -> StoreResult<Staff> {
        self.require_status(id, StaffStatus::Active)?;
        self.set_staff_status(id, StaffStatus::OnLeave)
    }

    /// On Leave → Active.
    pub fn end_leave(&mut self, id: &str) -> StoreResult<Staff> {
        self.require_status(id, StaffStatus::OnLeave)?;
        self.set_staff_status(id, StaffStatus::Active)
    }

    /// Any non-terminal status → Resigned.
    pub fn resign_staff(&mut self, id: &str) -> StoreResult<Staff> {
        self.set_staff_status(id, StaffStatus::Resigned)
    }

    /// Remove a staff member. Past attendance records are kept.
    pub fn delete_staff(&mut self, id: &str) -> StoreResult<Staff> {
        let index = self.staff_index(id)?;
        let staff = self.staff.remove(index);
        tracing::info!(staff_id = id, "deleted staff");
        Ok(staff)
    }

    pub(super) fn staff_index(&self, id: &str) -> StoreResult<usize> {
        self.staff
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found("staff", id))
    }

    fn require_status(&self, id: &str, expected: StaffStatus) -> StoreResult<()> {
        let index = self.staff_index(id)?;
        let current = self.staff[index].status;
        if current != expected {
            tracing::warn!(staff_id = id, status = current.label(), "rejected staff transition");
            return Err(StoreError::InvalidTransition(format!(
                "staff {} is {}, expected {}",
                id,
                current.label(),
                expected.label()
            )));
        }
        Ok(())
    }
}
