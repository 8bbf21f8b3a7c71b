use rust_decimal::Decimal;
use std::str::FromStr;

use crate::api::{Category, NewProduct};
use crate::error::{BizError, Result};

/// Raw add-product form input
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub currency: String,
    pub price: String,
    pub description: String,
    pub reference: String,
}

pub fn parse_price(input: &str) -> Result<Decimal> {
    let price = Decimal::from_str(input.trim())
        .map_err(|_| BizError::InvalidPrice(input.to_string()))?;
    if price.is_sign_negative() {
        return Err(BizError::InvalidPrice(input.to_string()));
    }
    Ok(price)
}

/// Validate the form and resolve the category by id or name.
///
/// `categories` is `None` when the list could not be fetched; the category
/// is then sent as given.
pub fn build_product(
    form: ProductForm,
    categories: Option<&[Category]>,
    created_by: &str,
) -> Result<NewProduct> {
    if form.name.trim().is_empty() {
        return Err(BizError::MissingField("name"));
    }
    let price = parse_price(&form.price)?;

    let product_category = match categories {
        Some(list) => list
            .iter()
            .find(|c| c.id == form.category || c.name.eq_ignore_ascii_case(&form.category))
            .map(|c| c.id.clone())
            .ok_or_else(|| BizError::CategoryNotFound(form.category.clone()))?,
        None => form.category.clone(),
    };

    Ok(NewProduct {
        name: form.name.trim().to_string(),
        product_category,
        currency: form.currency,
        price,
        description: form.description,
        reference: form.reference,
        created_by: created_by.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        vec![Category {
            id: "cat1".into(),
            name: "Services".into(),
            created_by: Some("u1".into()),
        }]
    }

    fn form(price: &str, category: &str) -> ProductForm {
        ProductForm {
            name: "Audit".into(),
            category: category.into(),
            currency: "eur".into(),
            price: price.into(),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_category_by_name() {
        let cats = categories();
        let product = build_product(form("99.90", "services"), Some(&cats), "u1").unwrap();
        assert_eq!(product.product_category, "cat1");
        assert_eq!(product.price, Decimal::new(9990, 2));
        assert_eq!(product.created_by, "u1");
    }

    #[test]
    fn rejects_bad_price_and_unknown_category() {
        let cats = categories();
        assert!(matches!(
            build_product(form("-1", "cat1"), Some(&cats), "u1"),
            Err(BizError::InvalidPrice(_))
        ));
        assert!(matches!(
            build_product(form("abc", "cat1"), Some(&cats), "u1"),
            Err(BizError::InvalidPrice(_))
        ));
        assert!(matches!(
            build_product(form("1", "hardware"), Some(&cats), "u1"),
            Err(BizError::CategoryNotFound(_))
        ));
        assert!(build_product(form("1", "hardware"), None, "u1").is_ok());
    }
}
