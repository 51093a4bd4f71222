use {
    crate::{
        api::RestError,
        kernel::{
            entities::{
                OrganizationId,
                Username,
                Version,
            },
            versioning::{
                RollbackPolicy,
                Versioned,
            },
        },
    },
    strum::Display,
};

pub type TenderId = i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum TenderStatus {
    Created,
    Published,
    Closed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tender {
    pub id:               TenderId,
    pub name:             String,
    pub description:      String,
    pub service_type:     String,
    pub status:           TenderStatus,
    pub organization_id:  OrganizationId,
    pub creator_username: Username,
    pub version:          Version,
}

/// A tender that is not stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct TenderCreate {
    pub name:             String,
    pub description:      String,
    pub service_type:     String,
    pub organization_id:  OrganizationId,
    pub creator_username: Username,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TenderChanges {
    pub name:         Option<String>,
    pub description:  Option<String>,
    pub service_type: Option<String>,
}

impl Versioned for Tender {
    type Id = TenderId;
    type Changes = TenderChanges;

    const ROLLBACK_POLICY: RollbackPolicy = RollbackPolicy::AppendHistory;

    fn id(&self) -> TenderId {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply_changes(&mut self, changes: TenderChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(service_type) = changes.service_type {
            self.service_type = service_type;
        }
    }

    fn not_found() -> RestError {
        RestError::TenderNotFound
    }
}
