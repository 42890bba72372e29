//! One-time code generation.

use rand::Rng;

/// Smallest code handed out; codes are always six digits.
pub const OTP_MIN: u32 = 100_000;
/// Largest code handed out.
pub const OTP_MAX: u32 = 999_999;

/// Source of fresh verification codes.
///
/// Swappable so tests can pin the code that ends up in the outgoing email.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform codes in `OTP_MIN..=OTP_MAX` from the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        rand::rng().random_range(OTP_MIN..=OTP_MAX).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_codes_are_six_digits() {
        let generator = RandomCodeGenerator;
        for _ in 0..1_000 {
            let code = generator.generate();
            assert_eq!(code.len(), 6, "code {code} must have six digits");
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(!code.starts_with('0'));
        }
    }
}
