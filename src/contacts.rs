//! Contact list helpers and the edit-person save flow.

use phonenumber::country;
use tracing::debug;

use crate::api::{Company, Person, PersonUpdate};
use crate::error::{BizError, Result};

/// One page of a filtered list. Pages are 1-based.
#[derive(Debug)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page);
    let start = page.saturating_sub(1).saturating_mul(per_page);

    let slice = if page == 0 || start >= items.len() {
        &items[0..0]
    } else {
        &items[start..(start + per_page).min(items.len())]
    };

    Page {
        items: slice,
        page,
        total_pages,
        total_items: items.len(),
    }
}

/// True when a record's `createdBy` matches the current user
pub fn owned_by(created_by: Option<&str>, user_id: &str) -> bool {
    created_by == Some(user_id)
}

pub fn company_name<'a>(companies: &'a [Company], id: Option<&str>) -> Option<&'a str> {
    let id = id?;
    companies
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
}

/// Case-insensitive substring match over the visible person columns
pub fn search<'a>(people: &'a [Person], companies: &[Company], query: &str) -> Vec<&'a Person> {
    let needle = query.to_lowercase();
    people
        .iter()
        .filter(|p| {
            if needle.is_empty() {
                return true;
            }
            let company = company_name(companies, p.company.as_deref()).unwrap_or("");
            [
                p.first_name.as_str(),
                p.last_name.as_str(),
                company,
                p.country.as_str(),
                p.phone.as_str(),
                p.email.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Country labels as stored in a person's `pays` field
const COUNTRY_LABELS: &[(&str, country::Id)] = &[
    ("Algeria", country::Id::DZ),
    ("Australia", country::Id::AU),
    ("Belgium", country::Id::BE),
    ("Brazil", country::Id::BR),
    ("Cameroon", country::Id::CM),
    ("Canada", country::Id::CA),
    ("China", country::Id::CN),
    ("Côte d'Ivoire", country::Id::CI),
    ("France", country::Id::FR),
    ("Germany", country::Id::DE),
    ("India", country::Id::IN),
    ("Ireland", country::Id::IE),
    ("Italy", country::Id::IT),
    ("Japan", country::Id::JP),
    ("Luxembourg", country::Id::LU),
    ("Mexico", country::Id::MX),
    ("Morocco", country::Id::MA),
    ("Netherlands", country::Id::NL),
    ("Portugal", country::Id::PT),
    ("Senegal", country::Id::SN),
    ("Spain", country::Id::ES),
    ("Switzerland", country::Id::CH),
    ("Tunisia", country::Id::TN),
    ("United Kingdom", country::Id::GB),
    ("United States", country::Id::US),
];

/// Region for a country label, or for a bare ISO code such as `FR`
pub fn country_id(label: &str) -> Option<country::Id> {
    let label = label.trim();
    COUNTRY_LABELS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(label))
        .map(|(_, id)| *id)
        .or_else(|| label.to_uppercase().parse().ok())
}

/// Whether `phone` is a valid number for `country`.
///
/// National numbers are read in that country's format. Numbers written with
/// an international prefix must also belong to it. An unrecognized country
/// only accepts valid international numbers.
pub fn is_valid_phone(phone: &str, country: &str) -> bool {
    let region = country_id(country);
    let Ok(number) = phonenumber::parse(region, phone) else {
        return false;
    };
    if !phonenumber::is_valid(&number) {
        return false;
    }
    match region {
        Some(expected) => number.country().id() == Some(expected),
        None => true,
    }
}

/// Fields supplied on the command line; `None` keeps the stored value
#[derive(Debug, Default, Clone)]
pub struct PersonChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PersonChanges {
    pub fn apply(self, person: &Person) -> PersonUpdate {
        let country = self.country.unwrap_or_else(|| person.country.clone());
        PersonUpdate {
            first_name: self.first_name.unwrap_or_else(|| person.first_name.clone()),
            last_name: self.last_name.unwrap_or_else(|| person.last_name.clone()),
            company: self.company.or_else(|| person.company.clone()),
            country: (!country.is_empty()).then_some(country),
            phone: self.phone.unwrap_or_else(|| person.phone.clone()),
            email: self.email.unwrap_or_else(|| person.email.clone()),
        }
    }
}

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BizError::MissingField(field));
    }
    Ok(())
}

/// Build and validate the update for `person`.
///
/// Phone format is checked only when a country is set and the phone or
/// country changed. Uniqueness against the user's other contacts is checked
/// only when the email or phone changed; `contacts` is called lazily.
pub fn prepare_update<F>(person: &Person, changes: PersonChanges, contacts: F) -> Result<PersonUpdate>
where
    F: FnOnce() -> Result<Vec<Person>>,
{
    let update = changes.apply(person);

    require(&update.first_name, "first name")?;
    require(&update.last_name, "last name")?;
    require(&update.phone, "phone")?;
    require(&update.email, "email")?;

    let phone_changed = update.phone != person.phone;
    let email_changed = update.email != person.email;
    let country_changed = update.country.as_deref().unwrap_or("") != person.country;

    if let Some(country) = &update.country {
        if (phone_changed || country_changed) && !is_valid_phone(&update.phone, country) {
            return Err(BizError::InvalidPhone {
                phone: update.phone.clone(),
                country: country.clone(),
            });
        }
    }

    if email_changed || phone_changed {
        debug!(person = %person.id, "checking email/phone uniqueness");
        let others = contacts()?;
        let others = others.iter().filter(|p| p.id != person.id);
        let mut email_taken = false;
        let mut phone_taken = false;
        for other in others {
            email_taken |= other.email == update.email;
            phone_taken |= other.phone == update.phone;
        }
        if email_taken {
            return Err(BizError::DuplicateEmail);
        }
        if phone_taken {
            return Err(BizError::DuplicatePhone);
        }
    }

    Ok(update)
}
