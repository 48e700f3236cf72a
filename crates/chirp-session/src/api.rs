//! Typed wrappers over the auth endpoints.
//!
//! Each method builds a [`RequestDescriptor`], runs it through the
//! pipeline (so session expiry is handled for it) and decodes the
//! backend's envelope into a domain value.

use chirp_pipeline::{ApiError, Refresher, RequestPipeline};
use chirp_protocol::{
    AuthSuccess, Codec, JsonCodec, LoginPayload, PublicProfile, RegisterPayload, User, UserId,
    endpoints,
};
use chirp_transport::{RequestDescriptor, Transport};
use serde::Serialize;

use crate::{AvatarUpload, ProfileUpdate};

/// The auth REST surface, one method per endpoint.
pub struct AuthApi<T, R> {
    pipeline: RequestPipeline<T, R>,
    codec: JsonCodec,
}

impl<T, R> Clone for AuthApi<T, R> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            codec: self.codec,
        }
    }
}

impl<T: Transport, R: Refresher> AuthApi<T, R> {
    pub fn new(pipeline: RequestPipeline<T, R>) -> Self {
        Self {
            pipeline,
            codec: JsonCodec,
        }
    }

    /// `POST /auth/register`.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<User, ApiError> {
        let request = RequestDescriptor::post(endpoints::REGISTER).with_json(self.encode(payload)?);
        self.fetch_user(request).await
    }

    /// `POST /auth/login`.
    pub async fn login(&self, payload: &LoginPayload) -> Result<User, ApiError> {
        let request = RequestDescriptor::post(endpoints::LOGIN).with_json(self.encode(payload)?);
        self.fetch_user(request).await
    }

    /// `GET /auth/refresh`, through the pipeline.
    ///
    /// A 401 here is terminal: the pipeline hard-resets the session
    /// instead of trying to refresh its own refresh call.
    pub async fn refresh(&self) -> Result<User, ApiError> {
        self.fetch_user(RequestDescriptor::get(endpoints::REFRESH)).await
    }

    /// `POST /auth/logout`. The response body is ignored.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.pipeline
            .execute(RequestDescriptor::post(endpoints::LOGOUT))
            .await
            .map(|_| ())
    }

    /// `PUT /auth/profile` with only the changed fields.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let request =
            RequestDescriptor::put(endpoints::PROFILE).with_json(self.encode(update.payload())?);
        self.fetch_user(request).await
    }

    /// `PUT /auth/avatar` as `multipart/form-data`.
    pub async fn upload_avatar(&self, upload: &AvatarUpload) -> Result<User, ApiError> {
        let request = RequestDescriptor::put(endpoints::AVATAR).with_multipart(upload.to_multipart());
        self.fetch_user(request).await
    }

    /// `GET /users/:id`. An id that isn't a single path segment fails
    /// before anything is sent.
    pub async fn public_profile(&self, id: &UserId) -> Result<User, ApiError> {
        let path = endpoints::users_profile(id)?;
        let response = self.pipeline.execute(RequestDescriptor::get(path)).await?;
        let profile: PublicProfile = self.codec.decode(&response.body)?;
        Ok(profile.user)
    }

    pub fn pipeline(&self) -> &RequestPipeline<T, R> {
        &self.pipeline
    }

    async fn fetch_user(&self, request: RequestDescriptor) -> Result<User, ApiError> {
        let response = self.pipeline.execute(request).await?;
        let envelope: AuthSuccess = self.codec.decode(&response.body)?;
        Ok(envelope.into_user()?)
    }

    fn encode<B: Serialize>(&self, body: &B) -> Result<Vec<u8>, ApiError> {
        Ok(self.codec.encode(body)?)
    }
}
