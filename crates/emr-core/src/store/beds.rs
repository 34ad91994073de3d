//! Bed category operations.

use rust_decimal::Decimal;

use super::{normalize_optional, not_found, require, Hospital, StoreError, StoreResult};
use crate::models::{now_rfc3339, BedCategory, BedCategoryUpdate, NewBedCategory};

impl Hospital {
    pub fn bed_categories(&self) -> &[BedCategory] {
        &self.beds
    }

    pub fn get_bed_category(&self, id: &str) -> Option<&BedCategory> {
        self.beds.iter().find(|b| b.id == id)
    }

    /// Add a bed category. Counts must satisfy `0 <= occupied <= total`.
    pub fn add_bed_category(&mut self, form: NewBedCategory) -> StoreResult<BedCategory> {
        require("category_name", &form.category_name)?;
        let (total_beds, occupied_beds) = check_counts(form.total_beds, form.occupied_beds)?;
        check_price(form.price_per_day)?;

        let now = now_rfc3339();
        let category = BedCategory {
            id: self.sequences.bed.next_id(),
            category_name: form.category_name.trim().to_string(),
            total_beds,
            occupied_beds,
            price_per_day: form.price_per_day,
            description: normalize_optional(form.description),
            created_on: self.today(),
            created_at: now.clone(),
            updated_at: now,
        };
        tracing::info!(bed_id = %category.id, total_beds, occupied_beds, "added bed category");
        self.beds.push(category.clone());
        Ok(category)
    }

    /// Edit a bed category; availability is rederived from the new counts.
    pub fn update_bed_category(&mut self, id: &str, update: BedCategoryUpdate) -> StoreResult<BedCategory> {
        let index = self.bed_index(id)?;
        let mut category = self.beds[index].clone();

        if let Some(name) = update.category_name {
            require("category_name", &name)?;
            category.category_name = name.trim().to_string();
        }
        let total = update.total_beds.unwrap_or(i64::from(category.total_beds));
        let occupied = update.occupied_beds.unwrap_or(i64::from(category.occupied_beds));
        let (total_beds, occupied_beds) = check_counts(total, occupied)?;
        category.total_beds = total_beds;
        category.occupied_beds = occupied_beds;
        if let Some(price) = update.price_per_day {
            check_price(price)?;
            category.price_per_day = price;
        }
        if let Some(description) = update.description {
            category.description = normalize_optional(Some(description));
        }

        category.touch();
        self.beds[index] = category.clone();
        tracing::info!(bed_id = id, total_beds, occupied_beds, "updated bed category");
        Ok(category)
    }

    /// Admit into one bed of the category.
    pub fn occupy_bed(&mut self, id: &str) -> StoreResult<BedCategory> {
        let index = self.bed_index(id)?;
        let category = &mut self.beds[index];
        if category.is_full() {
            tracing::warn!(bed_id = id, "no beds available");
            return Err(StoreError::Constraint(format!(
                "{} has no available beds",
                category.category_name
            )));
        }
        category.occupied_beds += 1;
        category.touch();
        tracing::info!(bed_id = id, occupied = category.occupied_beds, "occupied bed");
        Ok(category.clone())
    }

    /// Discharge from one bed of the category.
    pub fn release_bed(&mut self, id: &str) -> StoreResult<BedCategory> {
        let index = self.bed_index(id)?;
        let category = &mut self.beds[index];
        if category.occupied_beds == 0 {
            tracing::warn!(bed_id = id, "no occupied beds to release");
            return Err(StoreError::Constraint(format!(
                "{} has no occupied beds",
                category.category_name
            )));
        }
        category.occupied_beds -= 1;
        category.touch();
        tracing::info!(bed_id = id, occupied = category.occupied_beds, "released bed");
        Ok(category.clone())
    }

    /// Delete a bed category. Categories with occupied beds are kept.
    pub fn delete_bed_category(&mut self, id: &str) -> StoreResult<BedCategory> {
        let index = self.bed_index(id)?;
        let occupied = self.beds[index].occupied_beds;
        if occupied > 0 {
            tracing::warn!(bed_id = id, occupied, "refused to delete occupied bed category");
            return Err(StoreError::Constraint(format!(
                "{} still has {} occupied bed(s)",
                id, occupied
            )));
        }
        let category = self.beds.remove(index);
        tracing::info!(bed_id = id, "deleted bed category");
        Ok(category)
    }

    fn bed_index(&self, id: &str) -> StoreResult<usize> {
        self.beds
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| not_found("bed category", id))
    }
}

fn check_counts(total: i64, occupied: i64) -> StoreResult<(u32, u32)> {
    let total = u32::try_from(total)
        .map_err(|_| StoreError::invalid("total_beds", "must be between 0 and 4294967295"))?;
    if occupied < 0 {
        return Err(StoreError::invalid("occupied_beds", "cannot be negative"));
    }
    if occupied > i64::from(total) {
        return Err(StoreError::invalid(
            "occupied_beds",
            format!("cannot exceed total beds ({})", total),
        ));
    }
    // occupied is within 0..=total, so it fits
    let occupied = u32::try_from(occupied).unwrap_or(total);
    Ok((total, occupied))
}

fn check_price(price: Decimal) -> StoreResult<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(StoreError::invalid("price_per_day", "cannot be negative"));
    }
    Ok(())
}
