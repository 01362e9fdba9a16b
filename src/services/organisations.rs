use uuid::Uuid;

use crate::{
    dto::{
        CreateOrganisationRequest, OrganisationDto, OrganisationFilter, OrganisationListDto,
        UpdateOrganisationRequest, UserDto,
    },
    error::AppError,
    models::Organisation,
    repository::RepositoryState,
    storage::StorageState,
};

const ORGANISATION_NOT_FOUND: &str = "Organisation not found";

/// How many random logo ids are drawn before giving up on finding an unused one.
pub const LOGO_ID_ATTEMPTS: usize = 8;

/// An uploaded file as received from the multipart body.
#[derive(Debug, Clone)]
pub struct LogoUpload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl LogoUpload {
    /// JPEG check: the declared type must mention `jpeg` and the payload must carry the
    /// JPEG SOI marker.
    pub fn is_jpeg(&self) -> bool {
        let declared = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("jpeg"));
        declared && self.bytes.starts_with(&[0xFF, 0xD8, 0xFF])
    }
}

/// derive_logo_id
///
/// Logo ids are the first four hex digits of a random token read as a 16-bit number.
pub fn derive_logo_id(token: Uuid) -> i32 {
    let bytes = token.as_bytes();
    i32::from(u16::from_be_bytes([bytes[0], bytes[1]]))
}

pub fn logo_file_name(logo_id: i32) -> String {
    format!("logo{logo_id}.jpeg")
}

/// OrganisationService
///
/// Organisation CRUD, employee membership and logo assignment.
#[derive(Clone)]
pub struct OrganisationService {
    repo: RepositoryState,
    storage: StorageState,
    token_source: fn() -> Uuid,
}

impl OrganisationService {
    pub fn new(repo: RepositoryState, storage: StorageState) -> Self {
        Self {
            repo,
            storage,
            token_source: Uuid::new_v4,
        }
    }

    /// Replaces the random token generator used for logo ids.
    pub fn with_token_source(mut self, token_source: fn() -> Uuid) -> Self {
        self.token_source = token_source;
        self
    }

    async fn require(&self, id: i32) -> Result<Organisation, AppError> {
        self.repo
            .get_organisation(id)
            .await?
            .ok_or_else(|| AppError::not_found(ORGANISATION_NOT_FOUND))
    }

    pub async fn create(&self, req: CreateOrganisationRequest) -> Result<OrganisationDto, AppError> {
        let organisation = self.repo.create_organisation(req.into()).await?;
        tracing::info!(organisation_id = organisation.id, "organisation created");
        Ok(OrganisationDto::from(organisation))
    }

    pub async fn find_all(
        &self,
        filter: OrganisationFilter,
    ) -> Result<Vec<OrganisationListDto>, AppError> {
        let prefix = filter.name.filter(|name| !name.is_empty());
        let organisations = self.repo.get_organisations(prefix).await?;
        Ok(organisations
            .into_iter()
            .map(OrganisationListDto::from)
            .collect())
    }

    /// Single organisation with its full employee list.
    pub async fn find_one(&self, id: i32) -> Result<OrganisationDto, AppError> {
        let organisation = self.require(id).await?;
        let employees = self.repo.get_employees(organisation.id).await?;
        Ok(OrganisationDto::with_employees(organisation, employees))
    }

    pub async fn update(
        &self,
        id: i32,
        req: UpdateOrganisationRequest,
    ) -> Result<OrganisationDto, AppError> {
        self.require(id).await?;
        self.repo
            .update_organisation(id, req.into())
            .await?
            .map(OrganisationDto::from)
            .ok_or_else(|| AppError::not_found(ORGANISATION_NOT_FOUND))
    }

    pub async fn remove(&self, id: i32) -> Result<(), AppError> {
        self.require(id).await?;
        if !self.repo.delete_organisation(id).await? {
            return Err(AppError::not_found(ORGANISATION_NOT_FOUND));
        }
        tracing::info!(organisation_id = id, "organisation deleted");
        Ok(())
    }

    pub async fn find_employees(&self, id: i32) -> Result<Vec<UserDto>, AppError> {
        let organisation = self.require(id).await?;
        let employees = self.repo.get_employees(organisation.id).await?;
        Ok(employees.into_iter().map(UserDto::from).collect())
    }

    /// Adding a current employee again changes nothing.
    pub async fn add_employee(&self, organisation_id: i32, user_id: i32) -> Result<(), AppError> {
        self.require(organisation_id).await?;
        self.repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !self.repo.add_employee(organisation_id, user_id).await? {
            return Err(AppError::not_found("User not found"));
        }
        tracing::info!(organisation_id, user_id, "employee added");
        Ok(())
    }

    pub async fn delete_employee(&self, organisation_id: i32, user_id: i32) -> Result<(), AppError> {
        self.require(organisation_id).await?;
        if !self.repo.remove_employee(organisation_id, user_id).await? {
            return Err(AppError::not_found("Employee not found"));
        }
        tracing::info!(organisation_id, user_id, "employee removed");
        Ok(())
    }

    /// Draws logo ids until one is not held by any organisation.
    async fn allocate_logo_id(&self) -> Result<i32, AppError> {
        for attempt in 1..=LOGO_ID_ATTEMPTS {
            let candidate = derive_logo_id((self.token_source)());
            if !self.repo.logo_id_in_use(candidate).await? {
                return Ok(candidate);
            }
            tracing::debug!(candidate, attempt, "logo id already taken, drawing again");
        }
        Err(AppError::LogoIdExhausted(LOGO_ID_ATTEMPTS))
    }

    /// upload_logo
    ///
    /// Assigns a logo id on the first upload (kept for every later one), then writes the file
    /// as `logo<id>.jpeg` through the logo storage.
    pub async fn upload_logo(
        &self,
        id: i32,
        upload: LogoUpload,
    ) -> Result<OrganisationDto, AppError> {
        if !upload.is_jpeg() {
            return Err(AppError::UnprocessableEntity(
                "Validation failed (expected type is jpeg)".to_string(),
            ));
        }

        let mut organisation = self.require(id).await?;

        let logo_id = match organisation.logo_id {
            Some(logo_id) => logo_id,
            None => {
                let logo_id = self.allocate_logo_id().await?;
                organisation = self
                    .repo
                    .set_logo_id(id, logo_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(ORGANISATION_NOT_FOUND))?;
                tracing::info!(organisation_id = id, logo_id, "logo id assigned");
                logo_id
            }
        };

        let location = self
            .storage
            .save_logo(&logo_file_name(logo_id), &upload.bytes)
            .await?;
        tracing::info!(organisation_id = id, %location, "logo stored");

        Ok(OrganisationDto::from(organisation))
    }
}
