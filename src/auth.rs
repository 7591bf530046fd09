//! Mobile number + OTP sign-in
//!
//! The form logic (input sanitising, validation, step transitions) is real.
//! Code verification sits behind [`OtpVerifier`]; the only implementation is
//! [`MockOtpVerifier`], which accepts a fixed code and issues no credential.
//! It is a placeholder, not a security mechanism. A production build needs a
//! verifier backed by a credential-issuing service.

use thiserror::Error;
use tracing::info;

/// Required length of a mobile number
pub const MOBILE_NUMBER_LEN: usize = 10;

/// Required length of a one-time code
pub const OTP_LEN: usize = 6;

/// Code accepted by [`MockOtpVerifier`]
pub const MOCK_OTP: &str = "123456";

/// Validation failures shown under the form fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Mobile number is required")]
    MobileRequired,

    #[error("Please enter a valid 10-digit mobile number")]
    MobileInvalid,

    #[error("OTP is required")]
    OtpRequired,

    #[error("OTP must be 6 digits")]
    OtpLength,

    #[error("Invalid OTP. Try 123456")]
    OtpRejected,
}

/// Checks a one-time code for a mobile number
pub trait OtpVerifier: Send + Sync {
    fn verify(&self, mobile_number: &str, otp: &str) -> bool;
}

/// Accepts [`MOCK_OTP`] for any number
#[derive(Debug, Clone, Copy, Default)]
pub struct MockOtpVerifier;

impl OtpVerifier for MockOtpVerifier {
    fn verify(&self, _mobile_number: &str, otp: &str) -> bool {
        otp == MOCK_OTP
    }
}

/// Which field the form is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    MobileNumber,
    Otp,
}

/// Outcome of submitting the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Form moved from the number step to the code step
    OtpSent,
    /// Code accepted
    SignedIn,
    /// Validation failed; the error is also stored on the form
    Rejected(LoginError),
}

/// State of the sign-in form
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub mobile_number: String,
    pub otp: String,
    pub step: LoginStep,
    pub error: Option<LoginError>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            mobile_number: String::new(),
            otp: String::new(),
            step: LoginStep::MobileNumber,
            error: None,
        }
    }

    /// Appends a typed character to the active field
    ///
    /// Non-digits are dropped and each field stops at its maximum length.
    pub fn push_char(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        let (field, max) = match self.step {
            LoginStep::MobileNumber => (&mut self.mobile_number, MOBILE_NUMBER_LEN),
            LoginStep::Otp => (&mut self.otp, OTP_LEN),
        };
        if field.len() < max {
            field.push(c);
        }
        self.error = None;
    }

    /// Deletes the last character of the active field
    pub fn backspace(&mut self) {
        match self.step {
            LoginStep::MobileNumber => self.mobile_number.pop(),
            LoginStep::Otp => self.otp.pop(),
        };
        self.error = None;
    }

    /// Returns from the code step to edit the number
    pub fn back_to_number(&mut self) {
        self.step = LoginStep::MobileNumber;
        self.otp.clear();
        self.error = None;
    }

    /// Validates the active step and advances
    pub fn submit(&mut self, verifier: &dyn OtpVerifier) -> SubmitOutcome {
        let result = match self.step {
            LoginStep::MobileNumber => validate_mobile_number(&self.mobile_number).map(|()| {
                info!("OTP requested");
                self.step = LoginStep::Otp;
                SubmitOutcome::OtpSent
            }),
            LoginStep::Otp => validate_otp(&self.otp).and_then(|()| {
                if verifier.verify(&self.mobile_number, &self.otp) {
                    info!("Signed in");
                    Ok(SubmitOutcome::SignedIn)
                } else {
                    Err(LoginError::OtpRejected)
                }
            }),
        };

        match result {
            Ok(outcome) => {
                self.error = None;
                outcome
            }
            Err(e) => {
                self.error = Some(e.clone());
                SubmitOutcome::Rejected(e)
            }
        }
    }
}

/// Checks that `number` is exactly ten digits
pub fn validate_mobile_number(number: &str) -> Result<(), LoginError> {
    let number = number.trim();
    if number.is_empty() {
        return Err(LoginError::MobileRequired);
    }
    if number.len() != MOBILE_NUMBER_LEN || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(LoginError::MobileInvalid);
    }
    Ok(())
}

/// Checks that `otp` is present and six characters long
pub fn validate_otp(otp: &str) -> Result<(), LoginError> {
    if otp.trim().is_empty() {
        return Err(LoginError::OtpRequired);
    }
    if otp.len() != OTP_LEN {
        return Err(LoginError::OtpLength);
    }
    Ok(())
}
