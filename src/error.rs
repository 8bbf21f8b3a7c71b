use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BizError {
    #[error("Config directory not found at {0}. Run 'bizdesk init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Not logged in. Run 'bizdesk login --token <TOKEN>' first.")]
    NotLoggedIn,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Person '{0}' not found")]
    PersonNotFound(String),

    #[error("Company '{0}' not found among your companies")]
    CompanyNotFound(String),

    #[error("Currency '{0}' not found among active currencies")]
    CurrencyNotFound(String),

    #[error("Field '{0}' is required")]
    MissingField(&'static str),

    #[error("Invalid phone number '{phone}' for {country}. Please check the number format.")]
    InvalidPhone { phone: String, country: String },

    #[error("Email already exists among your contacts. Please use a different email.")]
    DuplicateEmail,

    #[error("Telephone number already exists among your contacts. Please use a different telephone number.")]
    DuplicatePhone,

    #[error("Invalid price '{0}'. Expected a non-negative amount (e.g., 12.50)")]
    InvalidPrice(String),

    #[error("Category '{0}' not found. Use 'bizdesk categories' to list yours.")]
    CategoryNotFound(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BizError>;
