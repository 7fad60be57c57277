use rand::Rng;
use rand::seq::SliceRandom;
use rollcall_directory::Secret;
use serde::{Deserialize, Serialize};

use crate::error::ProvisionerError;

// No look-alike characters (I, O, l, 0, 1): generated passwords are read
// off a terminal by the operator.
const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!@#$%^&*-_=+?";

const CLASSES: [&[u8]; 4] = [UPPER, LOWER, DIGITS, SYMBOLS];

/// Minimum shape of a generated password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub length: usize,
    /// Distinct character classes (upper, lower, digit, symbol) required.
    pub min_classes: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: 14,
            min_classes: 3,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self) -> Result<(), ProvisionerError> {
        if !(1..=CLASSES.len()).contains(&self.min_classes) {
            return Err(ProvisionerError::InvalidPolicy(format!(
                "min_classes must be between 1 and {}, got {}",
                CLASSES.len(),
                self.min_classes
            )));
        }
        if self.length < self.min_classes {
            return Err(ProvisionerError::InvalidPolicy(format!(
                "length {} is shorter than min_classes {}",
                self.length, self.min_classes
            )));
        }
        Ok(())
    }

    /// Whether `password` is at least as long and as varied as this policy
    /// requires of generated ones.
    pub fn is_satisfied_by(&self, password: &str) -> bool {
        password.chars().count() >= self.length && character_classes(password) >= self.min_classes
    }
}

/// Number of distinct character classes present in `password`.
///
/// Letters are classed by Unicode case, so `é` is lowercase. Anything that is
/// neither a letter nor a digit counts as a symbol.
pub fn character_classes(password: &str) -> usize {
    let has = |pred: fn(char) -> bool| password.chars().any(pred);
    [
        has(char::is_uppercase),
        has(char::is_lowercase),
        has(char::is_numeric),
        has(|c| !c.is_alphanumeric()),
    ]
    .into_iter()
    .filter(|present| *present)
    .count()
}

/// Generate a random password that satisfies `policy`.
///
/// One character is drawn from each of `min_classes` randomly chosen
/// classes, the rest from all classes, and the result is shuffled.
pub fn generate_password(policy: &PasswordPolicy) -> Result<Secret, ProvisionerError> {
    policy.validate()?;

    let mut rng = rand::thread_rng();
    let mut classes = CLASSES;
    classes.shuffle(&mut rng);

    let mut chars: Vec<u8> = classes[..policy.min_classes]
        .iter()
        .map(|set| set[rng.gen_range(0..set.len())])
        .collect();

    let all = CLASSES.concat();
    while chars.len() < policy.length {
        chars.push(all[rng.gen_range(0..all.len())]);
    }
    chars.shuffle(&mut rng);

    Ok(Secret::new(
        chars.into_iter().map(char::from).collect::<String>(),
    ))
}

/// Where a draft's initial password came from.
#[derive(Debug, Clone)]
pub enum Credential {
    Generated(Secret),
    Supplied(Secret),
}

impl Credential {
    pub fn secret(&self) -> &Secret {
        match self {
            Self::Generated(secret) | Self::Supplied(secret) => secret,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Generated(_) => "generated",
            Self::Supplied(_) => "supplied by operator",
        }
    }
}
