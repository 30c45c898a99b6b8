//! Authentication service: passwords, JWTs and password resets.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::entities::{NewUser, Role, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::infrastructure::mailer::{Email, Mailer};
use crate::utils::reset_token::{generate_reset_token, hash_reset_token};

/// JWT payload. `sub` is the user ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Tunables for token issuing and password hashing.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub password_reset_ttl: Duration,
    pub bcrypt_cost: u32,
    /// Base URL used to build password reset links.
    pub public_url: String,
}

/// Credentials and profile for a new account. `password` is in clear text.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<String>,
}

/// Service for authenticating users and managing their credentials.
///
/// Passwords are hashed with bcrypt on the blocking thread pool. Sessions are
/// stateless HS256 JWTs; a token is rejected once the password changes after
/// it was issued.
pub struct AuthService<U: UserRepository + ?Sized, M: Mailer + ?Sized> {
    users: Arc<U>,
    mailer: Arc<M>,
    settings: AuthSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl<U: UserRepository + ?Sized, M: Mailer + ?Sized> AuthService<U, M> {
    pub fn new(users: Arc<U>, mailer: Arc<M>, settings: AuthSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.jwt_secret.as_bytes());
        Self {
            users,
            mailer,
            settings,
            encoding_key,
            decoding_key,
        }
    }

    /// Creates an account with the `user` role and signs the user in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the email is already registered.
    pub async fn signup(&self, registration: Registration) -> Result<(User, String), AppError> {
        let user = self.register(registration, Role::User).await?;
        let token = self.issue_token(user.id)?;

        metrics::counter!("tours_auth_signups_total").increment(1);
        tracing::info!(user_id = user.id, "User signed up");
        Ok((user, token))
    }

    /// Creates an account with the given role without signing in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the email is already registered.
    pub async fn register(&self, registration: Registration, role: Role) -> Result<User, AppError> {
        let password = self.hash_password(registration.password).await?;

        self.users
            .create(NewUser {
                name: registration.name,
                email: registration.email.to_lowercase(),
                avatar: registration.avatar,
                password,
                role,
            })
            .await
    }

    /// Verifies credentials and issues a token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown email or wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let user = match self.users.find_by_email(&email.to_lowercase()).await? {
            Some(user) if self.verify_password(password, &user.password).await? => user,
            _ => {
                metrics::counter!("tours_auth_logins_total", "outcome" => "failure").increment(1);
                return Err(AppError::unauthorized(
                    "Incorrect email or password",
                    json!({ "email": email }),
                ));
            }
        };

        metrics::counter!("tours_auth_logins_total", "outcome" => "success").increment(1);
        let token = self.issue_token(user.id)?;
        Ok((user, token))
    }

    /// Resolves a bearer token to the active user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is invalid or expired,
    /// the user no longer exists, or the password changed after issue.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = self.verify_token(token)?;

        let user_id: i64 = claims.sub.parse().map_err(|_| {
            AppError::unauthorized(
                "Invalid token. Please log in again!",
                json!({ "reason": "malformed subject" }),
            )
        })?;

        let user = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            AppError::unauthorized(
                "The user belonging to this token no longer exists.",
                json!({ "user_id": user_id }),
            )
        })?;

        if user.changed_password_after(claims.iat) {
            return Err(AppError::unauthorized(
                "User recently changed password! Please log in again.",
                json!({ "user_id": user_id }),
            ));
        }

        Ok(user)
    }

    /// Starts a password reset: stores a hashed one-time token and mails the
    /// raw token to the user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown email.
    /// Returns [`AppError::Internal`] if the email could not be sent; the
    /// stored token is cleared in that case.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let user = self
            .users
            .find_by_email(&email.to_lowercase())
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "There is no user with that email address.",
                    json!({ "email": email }),
                )
            })?;

        let reset_token = generate_reset_token().map_err(|e| {
            AppError::internal("Failed to generate reset token", json!({ "reason": e.to_string() }))
        })?;
        let expires_at = Utc::now() + self.settings.password_reset_ttl;

        self.users
            .set_reset_token(user.id, Some(hash_reset_token(&reset_token)), Some(expires_at))
            .await?;

        let reset_url = format!(
            "{}/api/v1/users/resetPassword/{}",
            self.settings.public_url.trim_end_matches('/'),
            reset_token
        );
        let email = Email {
            to: user.email.clone(),
            subject: format!(
                "Your password reset token (valid for {} min)",
                self.settings.password_reset_ttl.num_minutes()
            ),
            text: format!(
                "Forgot your password? Submit a PATCH request with your new password and \
                 passwordConfirm to: {}\nIf you didn't forget your password, please ignore this email!",
                reset_url
            ),
        };

        if let Err(e) = self.mailer.send(email).await {
            tracing::error!(user_id = user.id, error = %e, "Failed to send reset email");
            self.users.set_reset_token(user.id, None, None).await?;
            return Err(AppError::internal(
                "There was an error sending the email. Try again later!",
                json!({ "reason": e.to_string() }),
            ));
        }

        metrics::counter!("tours_auth_password_resets_total", "stage" => "requested").increment(1);
        Ok(())
    }

    /// Completes a password reset and signs the user in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the token is unknown or expired.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: String,
    ) -> Result<(User, String), AppError> {
        let now = Utc::now();
        let user = self
            .users
            .find_by_reset_token(&hash_reset_token(reset_token), now)
            .await?
            .ok_or_else(|| AppError::bad_request("Token is invalid or has expired", json!({})))?;

        let user = self.store_password(user.id, password, now).await?;
        let token = self.issue_token(user.id)?;

        metrics::counter!("tours_auth_password_resets_total", "stage" => "completed").increment(1);
        tracing::info!(user_id = user.id, "Password reset");
        Ok((user, token))
    }

    /// Changes the password of a signed-in user after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if `current_password` is wrong.
    pub async fn update_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: String,
    ) -> Result<(User, String), AppError> {
        if !self.verify_password(current_password, &user.password).await? {
            return Err(AppError::unauthorized(
                "Your current password is wrong.",
                json!({ "user_id": user.id }),
            ));
        }

        let user = self.store_password(user.id, new_password, Utc::now()).await?;
        let token = self.issue_token(user.id)?;
        Ok((user, token))
    }

    /// Signs a token for `user_id` valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if signing fails.
    pub fn issue_token(&self, user_id: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.settings.jwt_expires_in).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::internal("Failed to sign token", json!({ "reason": e.to_string() }))
        })
    }

    /// Decodes and validates a token (signature and expiry).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for expired or invalid tokens.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::unauthorized(
                    "Your token has expired! Please log in again.",
                    json!({ "reason": "expired" }),
                ),
                _ => AppError::unauthorized(
                    "Invalid token. Please log in again!",
                    json!({ "reason": e.to_string() }),
                ),
            })
    }

    /// Hashes and stores a new password.
    ///
    /// `passwordChangedAt` is stamped one second in the past so a token issued
    /// right after the change is not rejected.
    async fn store_password(
        &self,
        user_id: i64,
        password: String,
        now: DateTime<Utc>,
    ) -> Result<User, AppError> {
        let hash = self.hash_password(password).await?;
        self.users
            .set_password(user_id, &hash, now - Duration::seconds(1))
            .await
    }

    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let cost = self.settings.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| {
                AppError::internal("Password hashing task failed", json!({ "reason": e.to_string() }))
            })?
            .map_err(|e| {
                AppError::internal("Failed to hash password", json!({ "reason": e.to_string() }))
            })
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let hash = hash.to_string();

        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| {
                AppError::internal(
                    "Password verification task failed",
                    json!({ "reason": e.to_string() }),
                )
            })?;

        // A malformed stored hash never matches.
        Ok(verified.unwrap_or(false))
    }
}
