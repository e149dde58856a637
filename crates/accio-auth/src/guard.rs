//! Form-level protection around an [`AuthService`].
//!
//! Every flow runs the same checks in the same order: the single-use CSRF
//! token is consumed, the input is validated, the attempt is throttled by
//! normalized email, and only then is the service called. Each outcome is
//! recorded as a security event through `tracing`.

use crate::service::{AuthService, AuthSession, User, normalize_email};
use crate::AuthFlowError;
use accio_conf::{SecuritySettings, SettingsError};
use accio_security::{
	CsrfToken, CsrfTokenManager, MemorySessionStorage, SecurityResult, SessionStorage,
	sanitize_log_input,
};
use accio_throttling::{
	RateLimiter, SystemTimeProvider, ThrottleConfig, TimeProvider, scoped_key,
};
use accio_validators::{
	EmailValidator, PasswordValidator, ValidationError, ValidationResult, Validator,
};
use serde::Deserialize;

/// Longest identifier written to a log line
const LOG_FIELD_MAX: usize = 128;

pub const SIGN_IN_SCOPE: &str = "login";
pub const SIGN_UP_SCOPE: &str = "signup";
pub const PASSWORD_RESET_SCOPE: &str = "reset";

/// Submitted sign-in form
#[derive(Debug, Clone, Deserialize)]
pub struct SignInForm {
	pub email: String,
	pub password: String,
	pub csrf_token: String,
}

/// Submitted sign-up form
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpForm {
	pub email: String,
	pub password: String,
	pub csrf_token: String,
	#[serde(default)]
	pub metadata: Option<serde_json::Value>,
}

/// Submitted password reset form
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetForm {
	pub email: String,
	pub csrf_token: String,
}

fn log_value(value: &str) -> String {
	sanitize_log_input(value, LOG_FIELD_MAX)
}

/// Guards the authentication forms of one session.
pub struct AuthGuard<S, St = MemorySessionStorage, T = SystemTimeProvider>
where
	S: AuthService,
	St: SessionStorage,
	T: TimeProvider,
{
	service: S,
	limiter: RateLimiter<T>,
	csrf: CsrfTokenManager<St>,
	email_validator: EmailValidator,
	password_validator: PasswordValidator,
}

impl<S: AuthService, St: SessionStorage> AuthGuard<S, St, SystemTimeProvider> {
	/// Guard with the built-in auth throttle preset and default validators
	pub fn new(service: S, storage: St) -> Self {
		Self {
			service,
			limiter: RateLimiter::new(ThrottleConfig::auth()),
			csrf: CsrfTokenManager::new(storage),
			email_validator: EmailValidator::enhanced(),
			password_validator: PasswordValidator::new(),
		}
	}

	/// Guard configured from validated settings
	pub fn from_settings(
		service: S,
		storage: St,
		settings: &SecuritySettings,
	) -> Result<Self, SettingsError> {
		settings.validate()?;
		Ok(Self {
			service,
			limiter: RateLimiter::new(settings.throttle.auth.to_config()),
			csrf: CsrfTokenManager::new(storage).with_session_key(settings.csrf.session_key.clone()),
			email_validator: EmailValidator::enhanced(),
			password_validator: settings.password.to_validator(),
		})
	}
}

impl<S, St, T> AuthGuard<S, St, T>
where
	S: AuthService,
	St: SessionStorage,
	T: TimeProvider,
{
	/// Replaces the rate limiter, e.g. with one driven by a mock clock.
	pub fn with_limiter<T2: TimeProvider>(self, limiter: RateLimiter<T2>) -> AuthGuard<S, St, T2> {
		AuthGuard {
			service: self.service,
			limiter,
			csrf: self.csrf,
			email_validator: self.email_validator,
			password_validator: self.password_validator,
		}
	}

	pub fn service(&self) -> &S {
		&self.service
	}

	pub fn limiter(&self) -> &RateLimiter<T> {
		&self.limiter
	}

	pub fn csrf(&self) -> &CsrfTokenManager<St> {
		&self.csrf
	}

	/// Issues the token to embed in the next form.
	pub fn issue_csrf_token(&self) -> SecurityResult<CsrfToken> {
		self.csrf.generate()
	}

	fn consume_csrf(&self, token: &str, form: &'static str) -> Result<(), AuthFlowError> {
		if self.csrf.consume(token) {
			return Ok(());
		}
		tracing::warn!(form, "CSRF token mismatch");
		Err(AuthFlowError::Csrf)
	}

	fn check(result: ValidationResult) -> Result<(), AuthFlowError> {
		if result.is_valid() {
			Ok(())
		} else {
			Err(AuthFlowError::Validation(result))
		}
	}

	fn throttle(&self, scope: &str, email: &str) -> Result<String, AuthFlowError> {
		let key = scoped_key(scope, &normalize_email(email)).map_err(|_| {
			AuthFlowError::Validation(ValidationResult::invalid(ValidationError::InvalidEmail))
		})?;

		let decision = self.limiter.attempt(&key);
		if decision.allowed {
			return Ok(key);
		}

		let retry_after = decision.retry_after();
		tracing::warn!(
			scope,
			email = %log_value(email),
			retry_after_secs = retry_after.map(|d| d.as_secs()),
			"attempt throttled"
		);
		Err(AuthFlowError::RateLimited { retry_after })
	}

	/// Signs in through the guarded flow.
	///
	/// A successful sign-in clears the throttle record of the email.
	pub async fn sign_in(&self, form: &SignInForm) -> Result<AuthSession, AuthFlowError> {
		self.consume_csrf(&form.csrf_token, "sign_in")?;

		let email = form.email.trim();
		Self::check(EmailValidator::new().validate(email))?;
		if form.password.is_empty() {
			return Err(AuthFlowError::Validation(ValidationResult::invalid(
				ValidationError::Required,
			)));
		}

		let key = self.throttle(SIGN_IN_SCOPE, email)?;

		match self.service.sign_in(email, &form.password).await {
			Ok(session) => {
				self.limiter.reset(&key);
				tracing::info!(email = %log_value(email), session_id = %session.id, "sign-in succeeded");
				Ok(session)
			}
			Err(error) => {
				tracing::warn!(
					email = %log_value(email),
					remaining = self.limiter.remaining_attempts(&key),
					error = %error,
					"sign-in failed"
				);
				Err(error.into())
			}
		}
	}

	/// Registers through the guarded flow, enforcing password strength.
	pub async fn sign_up(&self, form: &SignUpForm) -> Result<User, AuthFlowError> {
		self.consume_csrf(&form.csrf_token, "sign_up")?;

		let email = form.email.trim();
		let mut result = self.email_validator.validate(email);
		result.merge(self.password_validator.validate(&form.password));
		Self::check(result)?;

		self.throttle(SIGN_UP_SCOPE, email)?;

		let user = self
			.service
			.sign_up(email, &form.password, form.metadata.clone())
			.await
			.inspect_err(|error| {
				tracing::warn!(email = %log_value(email), error = %error, "sign-up failed");
			})?;
		tracing::info!(user_id = %user.id, "sign-up succeeded");
		Ok(user)
	}

	/// Requests a password reset, throttled separately from sign-in.
	pub async fn request_password_reset(
		&self,
		form: &PasswordResetForm,
	) -> Result<(), AuthFlowError> {
		self.consume_csrf(&form.csrf_token, "password_reset")?;

		let email = form.email.trim();
		Self::check(EmailValidator::new().validate(email))?;
		self.throttle(PASSWORD_RESET_SCOPE, email)?;

		self.service.reset_password(email).await?;
		tracing::info!(email = %log_value(email), "password reset requested");
		Ok(())
	}

	/// Ends `session` and forgets the current CSRF token.
	pub async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthFlowError> {
		self.service.sign_out(session).await?;
		if let Err(error) = self.csrf.clear() {
			tracing::warn!(error = %error, "failed to clear CSRF token on sign-out");
		}
		tracing::info!(session_id = %session.id, "signed out");
		Ok(())
	}
}

impl<S, St, T> std::fmt::Debug for AuthGuard<S, St, T>
where
	S: AuthService,
	St: SessionStorage,
	T: TimeProvider,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthGuard")
			.field("throttle", self.limiter.config())
			.field("csrf", &self.csrf)
			.finish_non_exhaustive()
	}
}
