//! Utility functions and helpers.

pub mod http;
pub mod path;
pub mod table;

use chrono::{Local, NaiveDate};
use rand::Rng;
use rand::distr::Alphanumeric;

/// Random pseudonym for rows that do not name one, like `8GW7FEDQ`.
pub fn generate_pseudonym() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .map(|b| (b as char).to_ascii_uppercase())
        .take(8)
        .collect()
}

/// Description for generated rows, like `generated_October_19_2026`.
pub fn generated_description() -> String {
    generated_description_for(Local::now().date_naive())
}

fn generated_description_for(date: NaiveDate) -> String {
    format!("generated_{}", date.format("%B_%d_%Y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_pseudonym() {
        let name = generate_pseudonym();
        assert_eq!(name.len(), 8);
        assert!(name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_generated_description() {
        let date = NaiveDate::from_ymd_opt(2020, 2, 23).unwrap();
        assert_eq!(generated_description_for(date), "generated_February_23_2020");
    }
}
