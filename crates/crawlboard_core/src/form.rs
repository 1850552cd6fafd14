use std::fmt;

use crate::NewJob;

/// Editable fields of the create-job form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    StartDate,
    EndDate,
    ProvinceId,
    TownshipId,
    ProvinceName,
    TownshipName,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Name,
        FormField::StartDate,
        FormField::EndDate,
        FormField::ProvinceId,
        FormField::TownshipId,
        FormField::ProvinceName,
        FormField::TownshipName,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::StartDate => "start",
            FormField::EndDate => "end",
            FormField::ProvinceId => "province_id",
            FormField::TownshipId => "township_id",
            FormField::ProvinceName => "province_name",
            FormField::TownshipName => "township_name",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    InvalidId { field: FormField, value: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::InvalidId { field, value } => {
                write!(f, "{} must be a number, got {value:?}", field.key())
            }
        }
    }
}

/// Draft state of the create-job form. Values are raw text as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobForm {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub province_id: String,
    pub township_id: String,
    pub province_name: String,
    pub township_name: String,
}

impl JobForm {
    pub fn set(&mut self, field: FormField, value: String) {
        *self.slot(field) = value;
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::StartDate => &self.start_date,
            FormField::EndDate => &self.end_date,
            FormField::ProvinceId => &self.province_id,
            FormField::TownshipId => &self.township_id,
            FormField::ProvinceName => &self.province_name,
            FormField::TownshipName => &self.township_name,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Builds the request body. Blank optional fields become `None`.
    pub fn to_new_job(&self) -> Result<NewJob, FormError> {
        Ok(NewJob {
            name: self.name.trim().to_string(),
            start_date: self.start_date.trim().to_string(),
            end_date: self.end_date.trim().to_string(),
            province_id: parse_id(FormField::ProvinceId, &self.province_id)?,
            township_id: parse_id(FormField::TownshipId, &self.township_id)?,
            province_name: non_blank(&self.province_name),
            township_name: non_blank(&self.township_name),
        })
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::StartDate => &mut self.start_date,
            FormField::EndDate => &mut self.end_date,
            FormField::ProvinceId => &mut self.province_id,
            FormField::TownshipId => &mut self.township_id,
            FormField::ProvinceName => &mut self.province_name,
            FormField::TownshipName => &mut self.township_name,
        }
    }
}

fn parse_id(field: FormField, raw: &str) -> Result<Option<i64>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| FormError::InvalidId {
            field,
            value: trimmed.to_string(),
        })
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
