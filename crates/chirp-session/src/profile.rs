//! Client-side checks for profile edits and avatar uploads.
//!
//! Both run before anything is sent, so a bad form never costs a round
//! trip. Failures are [`ApiError::Validation`] with a message that can be
//! shown as-is.

use std::path::Path;

use chirp_pipeline::ApiError;
use chirp_protocol::{UpdateProfilePayload, User};
use chirp_transport::MultipartFile;

/// Largest avatar the client will upload.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Multipart field the backend reads the avatar from.
pub const AVATAR_FIELD: &str = "avatar";

const MIN_USERNAME_CHARS: usize = 3;

/// A validated profile edit carrying only the fields that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    payload: UpdateProfilePayload,
}

impl ProfileUpdate {
    /// Compares the submitted values against `current` and keeps the
    /// ones that differ.
    ///
    /// `None` means the field was not submitted. Submitted values are
    /// trimmed and validated even when unchanged.
    ///
    /// # Errors
    /// [`ApiError::Validation`] if a value is malformed or nothing changed.
    pub fn diff(
        current: &User,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Self, ApiError> {
        let username = username.map(str::trim);
        let email = email.map(str::trim);

        if let Some(name) = username {
            if name.chars().count() < MIN_USERNAME_CHARS {
                return Err(ApiError::Validation(
                    "Username must be at least 3 characters".into(),
                ));
            }
        }
        if let Some(address) = email {
            if !looks_like_email(address) {
                return Err(ApiError::Validation("Invalid email address".into()));
            }
        }

        let payload = UpdateProfilePayload {
            username: username
                .filter(|name| *name != current.username)
                .map(str::to_owned),
            email: email
                .filter(|address| *address != current.email)
                .map(str::to_owned),
        };

        if payload.is_empty() {
            return Err(ApiError::Validation("Nothing to update".into()));
        }
        Ok(Self { payload })
    }

    pub fn payload(&self) -> &UpdateProfilePayload {
        &self.payload
    }
}

// One '@', something before it, and a dot inside the domain.
fn looks_like_email(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !address.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Image types the backend accepts for avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Png,
    Jpeg,
    Webp,
}

impl ImageType {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Guesses the type from a file extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// An avatar image that passed the client-side checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    file_name: String,
    image_type: ImageType,
    bytes: Vec<u8>,
}

impl AvatarUpload {
    /// Validates an image with an explicit content type.
    ///
    /// # Errors
    /// [`ApiError::Validation`] for an unsupported type, an empty file,
    /// or one larger than [`MAX_AVATAR_BYTES`].
    pub fn new(
        file_name: impl Into<String>,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, ApiError> {
        let image_type = ImageType::from_mime(content_type).ok_or_else(invalid_type)?;
        Self::checked(file_name.into(), image_type, bytes)
    }

    /// Validates an image, taking its type from the file extension.
    ///
    /// # Errors
    /// Same as [`new`](Self::new).
    pub fn from_file_name(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ApiError> {
        let file_name = file_name.into();
        let image_type = ImageType::from_file_name(&file_name).ok_or_else(invalid_type)?;
        Self::checked(file_name, image_type, bytes)
    }

    fn checked(file_name: String, image_type: ImageType, bytes: Vec<u8>) -> Result<Self, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::Validation("File is empty.".into()));
        }
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(ApiError::Validation("File is too large (max 5MB).".into()));
        }
        Ok(Self {
            file_name,
            image_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The multipart part sent to the avatar endpoint.
    pub fn to_multipart(&self) -> MultipartFile {
        MultipartFile {
            field: AVATAR_FIELD.into(),
            file_name: self.file_name.clone(),
            content_type: self.image_type.mime().into(),
            bytes: self.bytes.clone(),
        }
    }
}

fn invalid_type() -> ApiError {
    ApiError::Validation("Invalid file type. Only images are supported.".into())
}
