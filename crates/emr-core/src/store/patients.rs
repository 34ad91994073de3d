//! Patient registry operations.

use chrono::{Datelike, NaiveDate};

use super::{normalize_optional, not_found, require, Hospital, StoreError, StoreResult};
use crate::models::{FileType, NewPatient, Patient, PatientUpdate};

impl Hospital {
    /// All patients in registration order.
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// Get a patient by file number.
    pub fn get_patient(&self, file_number: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.file_number == file_number)
    }

    /// Members linked to a Family file, in registration order.
    pub fn family_members(&self, family_file: &str) -> Vec<&Patient> {
        self.patients
            .iter()
            .filter(|p| p.parent_file_id.as_deref() == Some(family_file))
            .collect()
    }

    /// Register a new patient file.
    pub fn register_patient(&mut self, mut form: NewPatient) -> StoreResult<Patient> {
        form.parent_file_id = normalize_optional(form.parent_file_id);
        form.email = normalize_optional(form.email);
        form.next_of_kin = normalize_optional(form.next_of_kin);

        require("name", &form.name)?;
        require("phone", &form.phone)?;
        let today = self.today();
        check_birth_date(form.date_of_birth, today)?;
        self.check_family_link(None, form.file_type, form.parent_file_id.as_deref())?;

        let file_number = self.sequences.patient.next_id_for_year(today.year());
        let patient = Patient::from_registration(file_number, form, today);
        tracing::info!(file_number = %patient.file_number, "registered patient");
        self.patients.push(patient.clone());
        Ok(patient)
    }

    /// Apply a partial edit to a patient file.
    pub fn update_patient(&mut self, file_number: &str, update: PatientUpdate) -> StoreResult<Patient> {
        let index = self.patient_index(file_number)?;
        let mut patient = self.patients[index].clone();

        if let Some(name) = update.name {
            require("name", &name)?;
            patient.name = name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            require("phone", &phone)?;
            patient.phone = phone.trim().to_string();
        }
        if let Some(date_of_birth) = update.date_of_birth {
            check_birth_date(date_of_birth, self.today())?;
            patient.date_of_birth = date_of_birth;
        }
        if let Some(gender) = update.gender {
            patient.gender = gender;
        }
        if let Some(address) = update.address {
            patient.address = address.trim().to_string();
        }
        if let Some(email) = update.email {
            patient.email = normalize_optional(Some(email));
        }
        if let Some(next_of_kin) = update.next_of_kin {
            patient.next_of_kin = normalize_optional(Some(next_of_kin));
        }
        if let Some(patient_type) = update.patient_type {
            patient.patient_type = patient_type;
        }
        if let Some(status) = update.status {
            patient.status = status;
        }
        if let Some(parent) = update.parent_file_id {
            patient.parent_file_id = normalize_optional(parent);
        }
        if let Some(file_type) = update.file_type {
            if patient.file_type == FileType::Family
                && file_type == FileType::Individual
                && !self.family_members(file_number).is_empty()
            {
                tracing::warn!(file_number, "refused to convert family file with members");
                return Err(StoreError::Constraint(format!(
                    "family file {} still has members",
                    file_number
                )));
            }
            patient.file_type = file_type;
        }
        self.check_family_link(
            Some(file_number),
            patient.file_type,
            patient.parent_file_id.as_deref(),
        )?;

        patient.touch();
        self.patients[index] = patient.clone();
        tracing::info!(file_number, "updated patient");
        Ok(patient)
    }

    /// Record a patient's death. The file stays in the registry.
    pub fn mark_patient_deceased(&mut self, file_number: &str, date_of_death: NaiveDate) -> StoreResult<Patient> {
        let index = self.patient_index(file_number)?;
        let today = self.today();
        let patient = &mut self.patients[index];

        if patient.is_dead {
            tracing::warn!(file_number, "patient already marked deceased");
            return Err(StoreError::InvalidTransition(format!(
                "patient {} is already marked deceased",
                file_number
            )));
        }
        if date_of_death < patient.date_of_birth || date_of_death > today {
            return Err(StoreError::invalid(
                "date_of_death",
                "must be between date of birth and today",
            ));
        }

        patient.is_dead = true;
        patient.date_of_death = Some(date_of_death);
        patient.touch();
        tracing::info!(file_number, %date_of_death, "marked patient deceased");
        Ok(patient.clone())
    }

    /// Delete a patient file. Family files with members cannot be deleted.
    pub fn delete_patient(&mut self, file_number: &str) -> StoreResult<Patient> {
        let index = self.patient_index(file_number)?;
        let members = self.family_members(file_number).len();
        if members > 0 {
            tracing::warn!(file_number, members, "refused to delete family file with members");
            return Err(StoreError::Constraint(format!(
                "family file {} still has {} member(s)",
                file_number, members
            )));
        }
        let patient = self.patients.remove(index);
        tracing::info!(file_number, "deleted patient");
        Ok(patient)
    }

    fn patient_index(&self, file_number: &str) -> StoreResult<usize> {
        self.patients
            .iter()
            .position(|p| p.file_number == file_number)
            .ok_or_else(|| not_found("patient", file_number))
    }

    /// A parent link must point at another existing Family file, and only
    /// Individual files may carry one.
    fn check_family_link(&self, own: Option<&str>, file_type: FileType, parent: Option<&str>) -> StoreResult<()> {
        let Some(parent) = parent else {
            return Ok(());
        };
        if file_type != FileType::Individual {
            return Err(StoreError::invalid(
                "parent_file_id",
                "only individual files can belong to a family",
            ));
        }
        if own == Some(parent) {
            return Err(StoreError::invalid("parent_file_id", "a file cannot be its own family"));
        }
        match self.get_patient(parent) {
            Some(head) if head.is_family_head() => Ok(()),
            Some(_) => Err(StoreError::invalid(
                "parent_file_id",
                format!("{} is not a family file", parent),
            )),
            None => Err(StoreError::invalid(
                "parent_file_id",
                format!("family file {} does not exist", parent),
            )),
        }
    }
}

fn check_birth_date(date_of_birth: NaiveDate, today: NaiveDate) -> StoreResult<()> {
    if date_of_birth > today {
        return Err(StoreError::invalid("date_of_birth", "cannot be in the future"));
    }
    Ok(())
}
