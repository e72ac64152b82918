//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use std::fs;
use std::path::PathBuf;

use crate::cache::Number;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read configuration file '{}': {}", path_str, e)),
    }
}

/// Validate a timeout in seconds (positive, fractions allowed)
pub fn validate_timeout(timeout_str: &str) -> Result<f64, String> {
    let seconds: f64 = timeout_str
        .parse()
        .map_err(|_| format!("Timeout must be a number of seconds, got: '{}'", timeout_str))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("Timeout must be greater than 0, got: '{}'", timeout_str));
    }

    Ok(seconds)
}

/// Validate an arithmetic amount; integers stay integers
pub fn validate_amount(amount_str: &str) -> Result<Number, String> {
    let amount = amount_str.trim();
    if let Ok(int) = amount.parse::<i64>() {
        return Ok(Number::Int(int));
    }
    match amount.parse::<f64>() {
        Ok(float) if float.is_finite() => Ok(Number::Float(float)),
        _ => Err(format!("Amount must be a finite number, got: '{}'", amount_str)),
    }
}

/// Validate a namespace domain
pub fn validate_domain(domain_str: &str) -> Result<String, String> {
    let domain = domain_str.trim();

    if domain.is_empty() {
        return Err("Domain cannot be empty".to_string());
    }

    if domain.contains(char::is_whitespace) {
        return Err("Domain cannot contain whitespace".to_string());
    }

    if domain.len() > 253 {
        return Err("Domain is too long (maximum 253 characters)".to_string());
    }

    Ok(domain.to_string())
}
